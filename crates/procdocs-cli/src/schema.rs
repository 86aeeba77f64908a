//! # Schema Subcommand
//!
//! Inspection of the schema registry:
//!
//! - `list` shows discovered schema files and their status,
//! - `validate` checks one schema by name or path,
//! - `show` prints a compiled schema as JSON,
//! - `doctor` reports every configured root and every file under it.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use procdocs_schema::load::load_schema;
use procdocs_schema::{RegistryEntry, SchemaRegistry};

use crate::config::Config;
use crate::display_path;

/// Arguments for the `procdocs schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    #[command(subcommand)]
    pub command: SchemaCommand,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommand {
    /// List discovered schemas (valid ones by default).
    List {
        /// Include invalid schema files.
        #[arg(long, conflicts_with = "invalid")]
        all: bool,

        /// Show only invalid schema files.
        #[arg(long)]
        invalid: bool,

        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate one schema, given by registered name or file path.
    Validate {
        /// Schema name or path to a schema file.
        #[arg(value_name = "NAME|PATH")]
        target: String,
    },

    /// Print a compiled schema as JSON.
    Show {
        /// Schema name; defaults to the configured default_schema.
        name: Option<String>,
    },

    /// Report configured schema roots and the status of every schema file.
    Doctor,
}

/// JSON form of a registry entry for `schema list --json`.
#[derive(Debug, Serialize)]
struct EntrySummary<'a> {
    name: Option<&'a str>,
    valid: bool,
    path: String,
    version: Option<&'a str>,
    reason: Option<&'a str>,
}

impl<'a> From<&'a RegistryEntry> for EntrySummary<'a> {
    fn from(entry: &'a RegistryEntry) -> Self {
        Self {
            name: entry.name.as_deref(),
            valid: entry.is_valid(),
            path: entry.path.display().to_string(),
            version: entry.version.as_deref(),
            reason: entry.reason(),
        }
    }
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &Config) -> Result<u8> {
    let registry = crate::open_registry(config);
    match &args.command {
        SchemaCommand::List { all, invalid, json } => {
            list_schemas(&registry, config, *all, *invalid, *json)
        }
        SchemaCommand::Validate { target } => validate_schema(&registry, target),
        SchemaCommand::Show { name } => {
            let name = crate::schema_argument(name.as_deref(), config)?;
            show_schema(&registry, name)
        }
        SchemaCommand::Doctor => doctor(&registry, config),
    }
}

fn list_schemas(
    registry: &SchemaRegistry,
    config: &Config,
    all: bool,
    invalid: bool,
    json: bool,
) -> Result<u8> {
    let mut entries: Vec<&RegistryEntry> = if invalid {
        registry.invalid_entries().collect()
    } else if all {
        registry.entries().iter().collect()
    } else {
        registry.valid_entries().collect()
    };

    if json {
        let payload: Vec<EntrySummary<'_>> = entries.iter().map(|e| EntrySummary::from(*e)).collect();
        let text = serde_json::to_string_pretty(&payload).context("failed to serialize listing")?;
        println!("{text}");
        return Ok(if payload.is_empty() { 1 } else { 0 });
    }

    let searched: Vec<String> = config
        .schema_paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!(
        "Searched schema_paths: {}",
        if searched.is_empty() { "<none>".to_string() } else { searched.join(", ") }
    );

    if entries.is_empty() {
        println!("No schemas found.");
        return Ok(1);
    }

    entries.sort_by_key(|e| (!e.is_valid(), display_name(e).to_lowercase()));
    println!();
    println!("Schemas found:");
    for entry in entries {
        let status = match entry.reason() {
            None => "valid".to_string(),
            Some(reason) => format!("invalid ({})", brief(reason)),
        };
        let version = entry
            .version
            .as_deref()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        println!(
            "  - {:24} {:35}  {}{version}",
            display_name(entry),
            status,
            display_path(&entry.path)
        );
    }
    Ok(0)
}

fn validate_schema(registry: &SchemaRegistry, target: &str) -> Result<u8> {
    if registry.get(target).is_some() {
        println!("Valid schema: {target}");
        return Ok(0);
    }

    let path = Path::new(target);
    if path.exists() {
        return match load_schema(path) {
            Ok(schema) => {
                println!("Valid schema file: {} (schema_name '{}')", path.display(), schema.name());
                Ok(0)
            }
            Err(e) => {
                println!("Schema file invalid: {}", path.display());
                match e.schema_error().and_then(|s| s.violations()) {
                    Some(violations) => println!("{violations}"),
                    None => println!("  {e}"),
                }
                Ok(1)
            }
        };
    }

    let known_invalid = registry.invalid_entries().find(|e| {
        e.name.as_deref() == Some(target)
            || e.path.file_stem().and_then(|s| s.to_str()) == Some(target)
    });
    if let Some(entry) = known_invalid {
        println!("Invalid schema: {target} ({})", display_path(&entry.path));
        println!("{}", entry.reason().unwrap_or_default());
        return Ok(1);
    }

    println!("Schema '{target}' not found by name or path.");
    Ok(1)
}

fn show_schema(registry: &SchemaRegistry, name: &str) -> Result<u8> {
    let Some(schema) = registry.get(name) else {
        println!("Schema '{name}' not found.");
        return Ok(1);
    };
    let text = serde_json::to_string_pretty(&schema.to_definition())
        .context("failed to serialize schema")?;
    println!("{text}");
    Ok(0)
}

fn doctor(registry: &SchemaRegistry, config: &Config) -> Result<u8> {
    println!("Schema roots:");
    for root in &config.schema_paths {
        let shown = std::fs::canonicalize(root).unwrap_or_else(|_| root.clone());
        let state = if root.is_dir() { "exists" } else { "missing" };
        println!("  * {}  ({state})", shown.display());
    }

    if registry.entries().is_empty() {
        println!("No *.json files found under configured roots.");
        return Ok(1);
    }

    let mut problems = 0usize;
    for entry in registry.entries() {
        match entry.reason() {
            None => println!(
                "  ok    {}  -> schema_name='{}'",
                display_path(&entry.path),
                display_name(entry)
            ),
            Some(reason) => {
                problems += 1;
                println!("  FAIL  {}  -> INVALID: {}", display_path(&entry.path), brief(reason));
            }
        }
    }
    println!();
    println!(
        "{} schema file(s), {problems} invalid.",
        registry.entries().len()
    );
    Ok(if problems == 0 { 0 } else { 1 })
}

/// Registered name, or the file stem when none could be read.
fn display_name(entry: &RegistryEntry) -> String {
    entry.name.clone().unwrap_or_else(|| {
        entry
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    })
}

/// First line of a rejection reason.
fn brief(reason: &str) -> &str {
    reason.lines().next().unwrap_or(reason).trim_end_matches(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID: &str = r#"{
        "metadata": {"schema_name": "maintenance", "format_version": "0.0.1", "schema_version": "1.2"},
        "structure": [{"name": "title"}]
    }"#;

    const INVALID: &str = r#"{
        "metadata": {"schema_name": "broken", "format_version": "0.0.1"},
        "structure": [{"name": "status", "type": "enum"}]
    }"#;

    fn setup() -> (tempfile::TempDir, Config, SchemaRegistry) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("maintenance.json"), VALID).unwrap();
        std::fs::write(dir.path().join("broken.json"), INVALID).unwrap();
        let config = Config {
            schema_paths: vec![dir.path().to_path_buf()],
            ..Config::default()
        };
        let registry = crate::open_registry(&config);
        (dir, config, registry)
    }

    #[test]
    fn list_variants_report_success_when_non_empty() {
        let (_dir, config, registry) = setup();
        assert_eq!(list_schemas(&registry, &config, false, false, false).unwrap(), 0);
        assert_eq!(list_schemas(&registry, &config, true, false, true).unwrap(), 0);
        assert_eq!(list_schemas(&registry, &config, false, true, false).unwrap(), 0);
    }

    #[test]
    fn list_of_empty_registry_exits_one() {
        let config = Config {
            schema_paths: vec![PathBuf::from("/no/such/root")],
            ..Config::default()
        };
        let registry = crate::open_registry(&config);
        assert_eq!(list_schemas(&registry, &config, true, false, false).unwrap(), 1);
        assert_eq!(list_schemas(&registry, &config, false, false, true).unwrap(), 1);
    }

    #[test]
    fn entry_summary_serializes_status() {
        let (_dir, _config, registry) = setup();
        let summaries: Vec<serde_json::Value> = registry
            .entries()
            .iter()
            .map(|e| serde_json::to_value(EntrySummary::from(e)).unwrap())
            .collect();
        let broken = summaries.iter().find(|s| s["name"] == "broken").unwrap();
        assert_eq!(broken["valid"], false);
        assert!(broken["reason"].is_string());
        let valid = summaries.iter().find(|s| s["name"] == "maintenance").unwrap();
        assert_eq!(valid["valid"], true);
        assert_eq!(valid["version"], "1.2");
        assert!(valid["reason"].is_null());
    }

    #[test]
    fn validate_by_name_path_and_invalid_name() {
        let (dir, _config, registry) = setup();
        assert_eq!(validate_schema(&registry, "Maintenance").unwrap(), 0);
        let path = dir.path().join("maintenance.json");
        let empty = SchemaRegistry::new();
        assert_eq!(validate_schema(&empty, path.to_str().unwrap()).unwrap(), 0);
        assert_eq!(validate_schema(&registry, "broken").unwrap(), 1);
        assert_eq!(validate_schema(&registry, "nothing").unwrap(), 1);
    }

    #[test]
    fn validate_invalid_file_path_exits_one() {
        let (dir, _config, _registry) = setup();
        let path = dir.path().join("broken.json");
        assert_eq!(
            validate_schema(&SchemaRegistry::new(), path.to_str().unwrap()).unwrap(),
            1
        );
    }

    #[test]
    fn show_known_and_unknown() {
        let (_dir, _config, registry) = setup();
        assert_eq!(show_schema(&registry, "maintenance").unwrap(), 0);
        assert_eq!(show_schema(&registry, "broken").unwrap(), 1);
    }

    #[test]
    fn doctor_flags_invalid_files() {
        let (_dir, config, registry) = setup();
        assert_eq!(doctor(&registry, &config).unwrap(), 1);
    }

    #[test]
    fn doctor_passes_on_clean_roots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("maintenance.json"), VALID).unwrap();
        let config = Config {
            schema_paths: vec![dir.path().to_path_buf(), PathBuf::from("/no/such/root")],
            ..Config::default()
        };
        let registry = crate::open_registry(&config);
        assert_eq!(doctor(&registry, &config).unwrap(), 0);
    }

    #[test]
    fn brief_takes_first_line() {
        assert_eq!(brief("invalid schema 'x':\n  details"), "invalid schema 'x'");
        assert_eq!(brief("duplicate schema name"), "duplicate schema name");
    }
}
