//! Command line inspector for level material scripts
//!
//! Loads material sources in the given order and prints what the renderer
//! would resolve:
//!
//! ```text
//! material_tool --source levels/drivebuild/art lookup trafficlight --key "diffuseMap[0]"
//! material_tool --config registry.toml check --strict
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use material_registry::assets::materials::write_script;
use material_registry::foundation::logging;
use material_registry::prelude::*;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "material_tool", version, about = "Inspect the effective material set of a level")]
struct Cli {
    /// Registry configuration file (.toml or .ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script file or level directory; repeat to add sources, later ones win
    #[arg(short, long = "source")]
    sources: Vec<PathBuf>,

    /// Script file name matched inside directory sources
    #[arg(long)]
    file_name: Option<String>,

    /// Only scan the top level of directory sources
    #[arg(long)]
    no_recursive: bool,

    /// Treat any skipped block or unreadable source as a failure
    #[arg(long)]
    strict: bool,

    /// Debug level logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective definition of one material
    Lookup {
        /// Material name
        name: String,
        /// Print only this property (e.g. "diffuseMap[0]")
        #[arg(short, long)]
        key: Option<String>,
    },
    /// List every effective material with its annotation and origin
    List,
    /// Write the effective definitions back out as one script
    Dump {
        /// Only dump this material
        name: Option<String>,
    },
    /// Load everything and report problems
    Check,
}

#[derive(Debug, Error)]
enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no material sources given (use --source or --config)")]
    NoSources,

    #[error("material '{0}' not found")]
    MaterialNotFound(String),

    #[error("material '{name}' has no property '{key}'")]
    PropertyNotFound { name: String, key: String },

    #[error("{0} problem(s) while loading material sources")]
    LoadProblems(usize),
}

fn build_config(cli: &Cli) -> Result<RegistryConfig, ToolError> {
    let mut config = match &cli.config {
        Some(path) => RegistryConfig::load_from_file(path)?,
        None => RegistryConfig::default(),
    };

    config.sources.extend(cli.sources.iter().cloned());
    if let Some(file_name) = &cli.file_name {
        config.script_file_name.clone_from(file_name);
    }
    if cli.no_recursive {
        config.recursive = false;
    }

    if config.sources.is_empty() {
        return Err(ToolError::NoSources);
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), ToolError> {
    let config = build_config(cli)?;

    let mut registry = MaterialRegistry::new();
    let report = MaterialLoader::load_config(&mut registry, &config);
    let problems = report.parse_error_count() + report.failures.len();

    log::info!(
        "{} material(s) effective after {} source(s)",
        registry.len(),
        registry.loaded_sources().len()
    );

    match &cli.command {
        Command::Lookup { name, key } => {
            let record = registry
                .lookup(name)
                .ok_or_else(|| ToolError::MaterialNotFound(name.clone()))?;
            match key {
                Some(key) => {
                    let value = record.get(key).ok_or_else(|| ToolError::PropertyNotFound {
                        name: name.clone(),
                        key: key.clone(),
                    })?;
                    println!("{value}");
                }
                None => print!("{record}"),
            }
        }
        Command::List => {
            for record in registry.all() {
                let origin = record
                    .origin()
                    .map(|origin| format!("{}:{}", origin.source_name, origin.location))
                    .unwrap_or_default();
                println!("{}\t{}\t{}", record.name(), record.annotation().unwrap_or("-"), origin);
            }
        }
        Command::Dump { name } => match name {
            Some(name) => {
                let record = registry
                    .lookup(name)
                    .ok_or_else(|| ToolError::MaterialNotFound(name.clone()))?;
                print!("{record}");
            }
            None => print!("{}", write_script(registry.all())),
        },
        Command::Check => {
            for source in &report.reports {
                for error in &source.errors {
                    println!("{error}");
                }
            }
            for failure in &report.failures {
                println!("{failure}");
            }
            println!(
                "{} source(s), {} material(s), {} problem(s)",
                registry.loaded_sources().len(),
                registry.len(),
                problems
            );
        }
    }

    if cli.strict && problems > 0 {
        return Err(ToolError::LoadProblems(problems));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logging::init_with_level(level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
