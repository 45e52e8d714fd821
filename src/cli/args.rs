//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// IFC schema entity taxonomy: trees, object hierarchy and entity enumerations
#[derive(Parser, Debug)]
#[command(name = "ifc-schema-tree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: ./.ifc-schema-tree.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List schema files in a folder
    List {
        /// Schema folder
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },

    /// Process schemas and write artifacts
    Process {
        /// Schema files, processed in the given order
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        schemas: Vec<PathBuf>,

        /// Output directory (default: output_dir setting)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,

        #[command(flatten)]
        artifacts: ArtifactArgs,
    },

    /// Print object hierarchy insert statements
    Hierarchy {
        /// Schema file
        #[arg(value_hint = ValueHint::FilePath)]
        schema: PathBuf,
    },

    /// Is <a> a strict subtype of <b>?
    Subtype {
        /// Schema file
        #[arg(value_hint = ValueHint::FilePath)]
        schema: PathBuf,
        a: String,
        b: String,
    },

    /// Is <a> a strict supertype of <b>?
    Supertype {
        /// Schema file
        #[arg(value_hint = ValueHint::FilePath)]
        schema: PathBuf,
        a: String,
        b: String,
    },

    /// Show entity taxonomy as tree
    Tree {
        /// Schema file
        #[arg(value_hint = ValueHint::FilePath)]
        schema: PathBuf,
    },

    /// Print the sorted union of entity names
    Aggregate {
        /// Schema files
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        schemas: Vec<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Per-schema artifacts; none selected means all.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ArtifactArgs {
    /// Write entityTree<version>.txt
    #[arg(long)]
    pub tree: bool,

    /// Write entityEnum<version>.cs
    #[arg(long = "enum")]
    pub entity_enum: bool,

    /// Write objectHierarchy<version>.sql
    #[arg(long)]
    pub hierarchy: bool,

    /// Write entityCatalog<version>.json
    #[arg(long)]
    pub catalog: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
