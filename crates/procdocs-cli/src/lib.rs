//! # procdocs-cli — Command-Line Interface
//!
//! Provides the `procdocs` binary on top of `procdocs-schema`.
//!
//! ## Subcommands
//!
//! - `procdocs validate` — validate YAML documents against their schemas.
//! - `procdocs schema list|validate|show|doctor` — inspect the schema registry.
//! - `procdocs generate` — write a fill-in YAML scaffold for a schema.
//!
//! ```bash
//! procdocs validate docs/ --recursive
//! procdocs schema list --all
//! procdocs generate maintenance --output new-procedure.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers return `anyhow::Result<u8>`; the `u8` is the process exit code.
//!   Validation failures are reported on stdout and map to exit code 1,
//!   while operational errors propagate as `Err`.
//! - Settings come from [`config::Config`], never from ad-hoc environment reads.

pub mod config;
pub mod generate;
pub mod schema;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use procdocs_schema::{load, Schema, SchemaRegistry};

use crate::config::Config;

/// Load every schema under the configured roots.
pub fn open_registry(config: &Config) -> SchemaRegistry {
    let registry = SchemaRegistry::load(&config.schema_paths);
    tracing::info!(
        schemas = registry.len(),
        invalid = registry.invalid_entries().count(),
        "loaded schema registry"
    );
    registry
}

/// The schema named on the command line, or the configured default.
pub fn schema_argument<'a>(given: Option<&'a str>, config: &'a Config) -> Result<&'a str> {
    match given.or(config.default_schema.as_deref()) {
        Some(name) => Ok(name),
        None => bail!("no schema given and no default_schema configured"),
    }
}

/// Resolve `target` as a registered schema name, falling back to a schema
/// file path.
pub fn resolve_schema(registry: &SchemaRegistry, target: &str) -> Result<Arc<Schema>> {
    if let Some(schema) = registry.get(target) {
        return Ok(schema);
    }
    let path = Path::new(target);
    if path.exists() {
        let schema = load::load_schema(path)
            .with_context(|| format!("schema file '{}' is not usable", path.display()))?;
        return Ok(Arc::new(schema));
    }
    bail!("schema '{target}' not found by name or path")
}

/// Display form of `path` relative to the working directory when possible.
pub fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
