//! Command dispatch
//!
//! Every command except `config` and `completion` loads the layered settings
//! first and works through the [`ServiceContainer`].

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::ExportOptions;
use crate::cli::args::{ArtifactArgs, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{derive_hierarchy, EntityNameAggregate, SchemaEntityTree, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see --help".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => return _completion(*shell),
        Commands::Config { command } => return _config(command, cli.config.as_deref()),
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match command {
        Commands::List { dir } => _list(&container, dir),
        Commands::Process {
            schemas,
            output,
            artifacts,
        } => _process(&container, schemas, output.as_deref(), *artifacts),
        Commands::Hierarchy { schema } => _hierarchy(&container, schema),
        Commands::Subtype { schema, a, b } => _subtype(&container, schema, a, b),
        Commands::Supertype { schema, a, b } => _supertype(&container, schema, a, b),
        Commands::Tree { schema } => _tree(&container, schema),
        Commands::Aggregate { schemas } => _aggregate(&container, schemas),
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

#[instrument(skip(container))]
fn _list(container: &ServiceContainer, dir: &Path) -> CliResult<()> {
    let pattern = container.settings.schema_regex()?;
    let schemas = container
        .schema_service()
        .list_schemas(&expand_path(dir), &pattern)?;
    if schemas.is_empty() {
        output::warning(&format!(
            "no files matching {} in {}",
            container.settings.schema_pattern,
            dir.display()
        ));
        return Ok(());
    }
    output::info(&schemas.iter().map(|p| p.display()).join("\n"));
    Ok(())
}

fn export_options(args: ArtifactArgs) -> ExportOptions {
    let any = args.tree || args.entity_enum || args.hierarchy || args.catalog;
    ExportOptions {
        tree: args.tree || !any,
        entity_enum: args.entity_enum || !any,
        hierarchy: args.hierarchy || !any,
        catalog: args.catalog || !any,
    }
}

#[instrument(skip(container))]
fn _process(
    container: &ServiceContainer,
    schemas: &[PathBuf],
    output_dir: Option<&Path>,
    artifacts: ArtifactArgs,
) -> CliResult<()> {
    let output_dir = output_dir.map(expand_path);
    if let Some(dir) = output_dir.as_deref().filter(|d| d.is_file()) {
        return Err(CliError::InvalidArgs(format!(
            "output is not a directory: {}",
            dir.display()
        )));
    }
    let schemas: Vec<PathBuf> = schemas.iter().map(|p| expand_path(p)).collect();
    let export = container.export_service(output_dir.as_deref());

    let summary = container
        .process_service(&export)
        .run(&schemas, export_options(artifacts))?;

    for anomaly in &summary.anomalies {
        output::warning(anomaly);
    }
    output::header(&format!("Output: {}", export.output_dir().display()));
    for path in &summary.written {
        output::success_detail(&path.display());
    }
    output::success(&format!(
        "processed {} ({} hierarchy records, {} entities in aggregate)",
        summary.versions.join(", "),
        summary.hierarchy_records,
        summary.aggregate_size
    ));
    Ok(())
}

#[instrument(skip(container))]
fn _hierarchy(container: &ServiceContainer, schema: &Path) -> CliResult<()> {
    let loaded = container.schema_service().load(&expand_path(schema))?;
    let report = derive_hierarchy(
        &loaded.tree,
        &loaded.version,
        &container.settings.root_categories,
    )?;
    for anomaly in &report.anomalies {
        output::warning(anomaly);
    }
    for record in &report.records {
        output::info(record);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _subtype(container: &ServiceContainer, schema: &Path, a: &str, b: &str) -> CliResult<()> {
    let loaded = container.schema_service().load(&expand_path(schema))?;
    output::info(&loaded.tree.is_subtype_of(a, b)?);
    Ok(())
}

#[instrument(skip(container))]
fn _supertype(container: &ServiceContainer, schema: &Path, a: &str, b: &str) -> CliResult<()> {
    let loaded = container.schema_service().load(&expand_path(schema))?;
    output::info(&loaded.tree.is_supertype_of(a, b)?);
    Ok(())
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer, schema: &Path) -> CliResult<()> {
    let loaded = container.schema_service().load(&expand_path(schema))?;
    output::info(&loaded.tree.to_tree_string(&loaded.version));
    Ok(())
}

#[instrument(skip(container))]
fn _aggregate(container: &ServiceContainer, schemas: &[PathBuf]) -> CliResult<()> {
    let mut tree = SchemaEntityTree::new();
    let mut aggregate = EntityNameAggregate::new();
    for schema in schemas {
        container
            .schema_service()
            .load_into(&mut tree, &expand_path(schema))?;
        aggregate.add_tree(&tree);
    }
    output::info(&aggregate.iter().join("\n"));
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, local_config: Option<&Path>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(local_config)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", "(no home directory)"),
            }
            let local = match local_config {
                Some(path) => path.to_path_buf(),
                None => local_config_path(&std::env::current_dir().unwrap_or_default()),
            };
            output::action("local", &local.display());
        }
        ConfigCommands::Init { global } => {
            let target = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                match local_config {
                    Some(path) => path.to_path_buf(),
                    None => local_config_path(&std::env::current_dir().unwrap_or_default()),
                }
            };
            if target.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    target.display()
                )));
            }
            let fs = RealFileSystem;
            fs.ensure_parent(&target)
                .and_then(|_| fs.write(&target, Settings::template()))
                .map_err(|e| InfraError::io(format!("write config {}", target.display()), e))?;
            output::success(&format!("created {}", target.display()));
        }
    }
    Ok(())
}

fn _completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
