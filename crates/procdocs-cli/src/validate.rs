//! # Validate Subcommand
//!
//! Validates YAML documents against the schema named by each document's
//! `metadata.document_type`. Every failing file is listed with all of its
//! violations, followed by a one-line summary.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use procdocs_schema::load::{is_yaml_path, read_document};
use procdocs_schema::SchemaRegistry;

use crate::config::Config;
use crate::display_path;

/// Arguments for the `procdocs validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document files or directories to validate.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Treat schemas as closed: undeclared content keys are violations.
    #[arg(long)]
    pub closed: bool,
}

/// Outcome for one document.
#[derive(Debug)]
enum FileOutcome {
    Valid { schema: String },
    Invalid { headline: String, details: Vec<String> },
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: &Config) -> Result<u8> {
    let files = collect_documents(&args.files, args.recursive);
    if files.is_empty() {
        println!("No YAML files found.");
        return Ok(1);
    }

    let registry = crate::open_registry(config);
    let mut passed = 0usize;

    for file in &files {
        match validate_file(&registry, file, args.closed) {
            FileOutcome::Valid { schema } => {
                tracing::info!(file = %display_path(file), schema = %schema, "document is valid");
                passed += 1;
            }
            FileOutcome::Invalid { headline, details } => {
                println!("  FAIL: {}: {headline}", display_path(file));
                for line in details {
                    println!("    {line}");
                }
            }
        }
    }

    println!();
    println!("Validation complete: {passed}/{} passed.", files.len());
    Ok(if passed == files.len() { 0 } else { 1 })
}

fn validate_file(registry: &SchemaRegistry, path: &Path, closed: bool) -> FileOutcome {
    let document = match read_document(path) {
        Ok(document) => document,
        Err(e) => {
            return FileOutcome::Invalid {
                headline: e.to_string(),
                details: Vec::new(),
            }
        }
    };
    let schema = match registry.resolve(&document) {
        Ok(schema) => schema,
        Err(e) => {
            return FileOutcome::Invalid {
                headline: e.to_string(),
                details: Vec::new(),
            }
        }
    };

    match schema.validator().deny_unknown_fields(closed).validate(&document) {
        Ok(_) => FileOutcome::Valid {
            schema: schema.name().to_string(),
        },
        Err(violations) => FileOutcome::Invalid {
            headline: format!(
                "{} violation(s) against schema '{}'",
                violations.len(),
                schema.name()
            ),
            details: violations.iter().map(ToString::to_string).collect(),
        },
    }
}

/// Expand the command-line paths into a sorted, de-duplicated list of
/// YAML files. Directories contribute their `*.yaml`/`*.yml` entries,
/// recursively when `recursive` is set.
pub fn collect_documents(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            collect_from_dir(path, recursive, &mut files);
        } else if path.is_file() && is_yaml_path(path) {
            files.push(path.clone());
        } else if path.is_file() {
            tracing::warn!(path = %path.display(), "not a YAML file, skipping");
        } else {
            tracing::warn!(path = %path.display(), "path does not exist, skipping");
        }
    }
    files.sort();
    files.dedup();
    files
}

fn collect_from_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot read directory, skipping");
        return;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            if recursive {
                collect_from_dir(&path, recursive, files);
            }
        } else if is_yaml_path(&path) {
            files.push(path);
        }
    }
}
