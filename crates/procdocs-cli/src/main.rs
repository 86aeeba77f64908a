//! # procdocs CLI entry point
//!
//! Parses command-line arguments, loads the layered configuration,
//! installs tracing and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use procdocs_cli::config::Config;
use procdocs_cli::generate::{run_generate, GenerateArgs};
use procdocs_cli::schema::{run_schema, SchemaArgs};
use procdocs_cli::validate::{run_validate, ValidateArgs};

/// ProcDocs: schema-driven YAML procedure documents.
///
/// Validates YAML documents against JSON schema definitions, inspects the
/// schema registry, and generates fill-in document scaffolds.
#[derive(Parser, Debug)]
#[command(name = "procdocs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a configuration file, used instead of ./procdocs.json.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate YAML documents against the schema named by their document_type.
    Validate(ValidateArgs),

    /// Schema registry utilities (list, validate, show, doctor).
    Schema(SchemaArgs),

    /// Generate a YAML document scaffold from a schema.
    Generate(GenerateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref());
    let configured_level = config.as_ref().ok().and_then(|c| c.log_level.clone());
    let (filter, rejected_level) = build_filter(cli.verbose, configured_level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Some(level) = rejected_level {
        tracing::warn!(level = %level, "ignoring invalid configured log level");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(schema_paths = ?config.schema_paths, "configuration loaded");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Schema(args) => run_schema(&args, &config),
        Commands::Generate(args) => run_generate(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Tracing filter for the given `-v` count. A configured level replaces it
/// when it parses; otherwise it is handed back so it can be reported.
fn build_filter(verbose: u8, configured: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(level) = configured {
        match EnvFilter::try_new(level.to_lowercase()) {
            Ok(filter) => return (filter, None),
            Err(_) => return (verbosity_filter(verbose), Some(level.to_string())),
        }
    }
    (verbosity_filter(verbose), None)
}

fn verbosity_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}
