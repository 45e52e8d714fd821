//! Schema loading service
//!
//! Reads a schema file through the filesystem abstraction, parses it and
//! wires the result into a tree. Every load starts from an empty tree.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{SchemaEntityTree, SchemaTreeBuilder};
use crate::infrastructure::traits::{FileSystem, SchemaParser};
use crate::util::path::schema_version;

/// A schema file loaded into its own tree.
#[derive(Debug)]
pub struct LoadedSchema {
    /// File stem, e.g. `IFC4` for `IFC4.xsd`
    pub version: String,
    pub path: PathBuf,
    pub tree: SchemaEntityTree,
}

/// Service for turning schema files into entity trees.
pub struct SchemaService {
    fs: Arc<dyn FileSystem>,
    parser: Arc<dyn SchemaParser>,
}

impl SchemaService {
    /// Create a new schema service.
    pub fn new(fs: Arc<dyn FileSystem>, parser: Arc<dyn SchemaParser>) -> Self {
        Self { fs, parser }
    }

    /// Load `path` into a fresh tree.
    pub fn load(&self, path: &Path) -> ApplicationResult<LoadedSchema> {
        let mut tree = SchemaEntityTree::new();
        let version = self.load_into(&mut tree, path)?;
        Ok(LoadedSchema {
            version,
            path: path.to_path_buf(),
            tree,
        })
    }

    /// Reset `tree` and load `path` into it; returns the schema version.
    ///
    /// The tree is empty afterwards if loading fails.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn load_into(&self, tree: &mut SchemaEntityTree, path: &Path) -> ApplicationResult<String> {
        tree.reset();
        if !self.fs.is_file(path) {
            return Err(ApplicationError::SchemaNotFound(path.to_path_buf()));
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read schema", path)?;
        let parsed = self
            .parser
            .parse(&content)
            .map_err(|e| ApplicationError::SchemaParse {
                path: path.to_path_buf(),
                message: e.message,
            })?;
        SchemaTreeBuilder::new().build_into(tree, &parsed)?;

        let version = schema_version(path);
        info!("loaded {}: {} entities", version, tree.len());
        Ok(version)
    }

    /// Schema files directly inside `dir` whose file name matches `pattern`.
    pub fn list_schemas(&self, dir: &Path, pattern: &Regex) -> ApplicationResult<Vec<PathBuf>> {
        if !self.fs.is_dir(dir) {
            return Err(ApplicationError::SchemaNotFound(dir.to_path_buf()));
        }
        let files = self
            .fs
            .list_files(dir)
            .with_path_context("list schema folder", dir)?;
        let schemas: Vec<PathBuf> = files
            .into_iter()
            .filter(|f| {
                f.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| pattern.is_match(n))
            })
            .collect();
        debug!("found {} schema files in {}", schemas.len(), dir.display());
        Ok(schemas)
    }
}
