//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{ExportService, ProcessService, SchemaService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, SchemaParser};
use crate::infrastructure::xsd::XsdSchemaParser;

/// Container holding the I/O boundaries every service is built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Schema document reader
    pub parser: Arc<dyn SchemaParser>,

    schema_service: SchemaService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(XsdSchemaParser))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, parser: Arc<dyn SchemaParser>) -> Self {
        let settings = Arc::new(settings);
        let schema_service = SchemaService::new(Arc::clone(&fs), Arc::clone(&parser));

        Self {
            settings,
            fs,
            parser,
            schema_service,
        }
    }

    pub fn schema_service(&self) -> &SchemaService {
        &self.schema_service
    }

    /// Export service writing to `output_dir`, or the configured directory.
    pub fn export_service(&self, output_dir: Option<&Path>) -> ExportService {
        let dir = output_dir.unwrap_or(self.settings.output_dir.as_path());
        ExportService::new(Arc::clone(&self.fs), dir)
    }

    /// Batch processing over the configured root categories.
    pub fn process_service<'a>(&'a self, export: &'a ExportService) -> ProcessService<'a> {
        ProcessService::new(&self.schema_service, export, &self.settings.root_categories)
    }
}
