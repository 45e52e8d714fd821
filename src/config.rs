//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ifc-schema-tree/ifc-schema-tree.toml`
//! 3. Local config: `--config <file>`, else `./.ifc-schema-tree.toml`
//! 4. Environment variables: `IFC_SCHEMA_TREE_*` prefix
//!
//! Every layer replaces what it specifies, arrays included.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{default_root_categories, RootCategory};

const APP_NAME: &str = "ifc-schema-tree";
const LOCAL_CONFIG_FILE: &str = ".ifc-schema-tree.toml";
const ENV_PREFIX: &str = "IFC_SCHEMA_TREE";

/// Unified configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where generated artifacts go (default: system temp directory)
    pub output_dir: PathBuf,
    /// Regex for schema file names when listing a folder (case-insensitive)
    pub schema_pattern: String,
    /// Root categories bounding hierarchy derivation
    pub root_categories: Vec<RootCategory>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: std::env::temp_dir(),
            schema_pattern: r"^IFC.*\.xsd$".to_string(),
            root_categories: default_root_categories(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_dir: Option<PathBuf>,
    pub schema_pattern: Option<String>,
    pub root_categories: Option<Vec<RootCategory>>,
}

/// Get the XDG config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(format!("{}.toml", APP_NAME)))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Explicit local config file; must exist when given
    pub fn load(local_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        let local_path = match local_config {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .map(|cwd| local_config_path(&cwd))
                .filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            schema_pattern: overlay
                .schema_pattern
                .clone()
                .unwrap_or_else(|| self.schema_pattern.clone()),
            root_categories: overlay
                .root_categories
                .clone()
                .unwrap_or_else(|| self.root_categories.clone()),
        }
    }

    /// Apply IFC_SCHEMA_TREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("schema_pattern") {
            settings.schema_pattern = val;
        }
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the output directory.
    fn expand_paths(&mut self) {
        let raw = self.output_dir.to_string_lossy().into_owned();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.output_dir = PathBuf::from(expanded.into_owned());
        }
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        self.schema_regex()?;
        if self.root_categories.iter().any(|r| r.name.is_empty()) {
            return Err(ApplicationError::Config {
                message: "root category name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Compiled `schema_pattern`.
    pub fn schema_regex(&self) -> Result<Regex, ApplicationError> {
        RegexBuilder::new(&self.schema_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ApplicationError::Config {
                message: format!("invalid schema_pattern {:?}: {}", self.schema_pattern, e),
            })
    }

    /// Merged settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented template for `config init`.
    pub fn template() -> &'static str {
        r#"# ifc-schema-tree configuration

# Directory receiving generated files
# output_dir = "~/ifc-out"

# File names picked up by `list` (case-insensitive regex)
# schema_pattern = '^IFC.*\.xsd$'

# Root categories bounding object hierarchy derivation.
# match: "exact", "prefix" or "contains"
[[root_categories]]
name = "IfcProduct"
match = "contains"

[[root_categories]]
name = "IfcTypeProduct"
match = "contains"

[[root_categories]]
name = "IfcGroup"
match = "contains"
"#
    }
}
