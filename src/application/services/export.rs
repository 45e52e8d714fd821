//! Artifact export service
//!
//! Writes per-schema dumps, hierarchy insert statements and the aggregate
//! entity enumeration into the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::codegen::{
    render_aggregate_enum, render_catalog, render_schema_enum, AGGREGATE_ENUM_NAME,
};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{EntityNameAggregate, ObjectHierarchyRecord, SchemaEntityTree, TreeNodeConvert};
use crate::infrastructure::traits::FileSystem;

/// Service writing generated artifacts.
pub struct ExportService {
    fs: Arc<dyn FileSystem>,
    output_dir: PathBuf,
}

impl ExportService {
    /// Create a new export service writing below `output_dir`.
    pub fn new(fs: Arc<dyn FileSystem>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `entityTree<version>.txt`
    pub fn write_tree(&self, version: &str, tree: &SchemaEntityTree) -> ApplicationResult<PathBuf> {
        let content = format!("{}\n", tree.to_tree_string(version));
        self.write_file(&format!("entityTree{}.txt", version), &content)
    }

    /// `entityEnum<version>.cs`
    pub fn write_entity_enum(&self, version: &str, tree: &SchemaEntityTree) -> ApplicationResult<PathBuf> {
        let content = render_schema_enum(version, tree.names());
        self.write_file(&format!("entityEnum{}.cs", version), &content)
    }

    /// `entityCatalog<version>.json`
    pub fn write_catalog(&self, version: &str, tree: &SchemaEntityTree) -> ApplicationResult<PathBuf> {
        let content = render_catalog(version, tree).map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize entity catalog for {}", version),
            source: Box::new(e),
        })?;
        self.write_file(&format!("entityCatalog{}.json", version), &content)
    }

    /// `objectHierarchy<version>.sql`, one insert statement per line.
    pub fn write_hierarchy(
        &self,
        version: &str,
        records: &[ObjectHierarchyRecord],
    ) -> ApplicationResult<PathBuf> {
        let mut content = String::new();
        for record in records {
            content.push_str(&record.to_insert_statement());
            content.push('\n');
        }
        self.write_file(&format!("objectHierarchy{}.sql", version), &content)
    }

    /// `IFCEntityType.cs`; nothing is written for an empty aggregate.
    pub fn write_aggregate(&self, aggregate: &EntityNameAggregate) -> ApplicationResult<Option<PathBuf>> {
        if aggregate.is_empty() {
            debug!("aggregate is empty, skipping {}", AGGREGATE_ENUM_NAME);
            return Ok(None);
        }
        let content = render_aggregate_enum(aggregate.iter());
        self.write_file(&format!("{}.cs", AGGREGATE_ENUM_NAME), &content)
            .map(Some)
    }

    fn write_file(&self, file_name: &str, content: &str) -> ApplicationResult<PathBuf> {
        let path = self.output_dir.join(file_name);
        self.fs
            .ensure_parent(&path)
            .with_path_context("create output directory", &path)?;
        self.fs.write(&path, content).with_path_context("write", &path)?;
        info!("wrote {}", path.display());
        Ok(path)
    }
}
