//! Batch processing of several schema files
//!
//! Schemas are handled strictly one after another in a single tree that is
//! reset before each load; the aggregate collects names as each one passes.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::application::services::{ExportService, SchemaService};
use crate::application::ApplicationResult;
use crate::domain::{derive_hierarchy, EntityNameAggregate, RootCategory, SchemaEntityTree};

/// Which per-schema artifacts to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub tree: bool,
    pub entity_enum: bool,
    pub hierarchy: bool,
    pub catalog: bool,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    /// Schema versions in processing order
    pub versions: Vec<String>,
    pub written: Vec<PathBuf>,
    pub hierarchy_records: usize,
    /// Soft warnings from hierarchy derivation, rendered
    pub anomalies: Vec<String>,
    pub aggregate_size: usize,
}

/// Service driving load, derive and export for a list of schemas.
pub struct ProcessService<'a> {
    schemas: &'a SchemaService,
    export: &'a ExportService,
    root_categories: &'a [RootCategory],
}

impl<'a> ProcessService<'a> {
    pub fn new(
        schemas: &'a SchemaService,
        export: &'a ExportService,
        root_categories: &'a [RootCategory],
    ) -> Self {
        Self {
            schemas,
            export,
            root_categories,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(&self, paths: &[PathBuf], options: ExportOptions) -> ApplicationResult<ProcessSummary> {
        let mut summary = ProcessSummary::default();
        let mut aggregate = EntityNameAggregate::new();
        let mut tree = SchemaEntityTree::new();

        for path in paths {
            let version = self.process_one(&mut tree, path, options, &mut summary)?;
            aggregate.add_tree(&tree);
            summary.versions.push(version);
        }

        summary.aggregate_size = aggregate.len();
        if let Some(path) = self.export.write_aggregate(&aggregate)? {
            summary.written.push(path);
        }
        info!(
            "processed {} schemas, {} entities in aggregate",
            summary.versions.len(),
            summary.aggregate_size
        );
        Ok(summary)
    }

    fn process_one(
        &self,
        tree: &mut SchemaEntityTree,
        path: &Path,
        options: ExportOptions,
        summary: &mut ProcessSummary,
    ) -> ApplicationResult<String> {
        let version = self.schemas.load_into(tree, path)?;

        if options.tree {
            summary.written.push(self.export.write_tree(&version, tree)?);
        }
        if options.entity_enum {
            summary
                .written
                .push(self.export.write_entity_enum(&version, tree)?);
        }
        if options.catalog {
            summary.written.push(self.export.write_catalog(&version, tree)?);
        }
        if options.hierarchy {
            let report = derive_hierarchy(tree, &version, self.root_categories)?;
            summary.hierarchy_records += report.records.len();
            summary
                .anomalies
                .extend(report.anomalies.iter().map(|a| format!("{}: {}", version, a)));
            summary
                .written
                .push(self.export.write_hierarchy(&version, &report.records)?);
        }
        Ok(version)
    }
}
