//! # Generate Subcommand
//!
//! Writes a fill-in YAML scaffold for a schema, to stdout or a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use procdocs_schema::scaffold::{render_yaml_template, write_yaml_template, DEFAULT_LIST_EXAMPLES};

use crate::config::Config;

/// Arguments for the `procdocs generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Schema name or path to a schema file; defaults to the configured
    /// default_schema.
    #[arg(value_name = "SCHEMA")]
    pub schema: Option<String>,

    /// Write the scaffold here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Example records rendered for each list field.
    #[arg(long, default_value_t = DEFAULT_LIST_EXAMPLES)]
    pub list_examples: usize,
}

/// Execute the generate subcommand.
pub fn run_generate(args: &GenerateArgs, config: &Config) -> Result<u8> {
    let target = crate::schema_argument(args.schema.as_deref(), config)?;
    let registry = crate::open_registry(config);
    let schema = crate::resolve_schema(&registry, target)?;

    match &args.output {
        Some(path) => {
            write_yaml_template(&schema, path, args.list_examples)
                .with_context(|| format!("failed to write template to {}", path.display()))?;
            tracing::info!(schema = %schema.name(), path = %path.display(), "template written");
            println!("Template generated at {}", path.display());
        }
        None => print!("{}", render_yaml_template(&schema, args.list_examples)),
    }
    Ok(0)
}
