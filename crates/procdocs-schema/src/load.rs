//! # File Loading
//!
//! Reads schema definitions (JSON) and documents (YAML or JSON) from disk
//! into the raw value model, and compiles schema files.

use std::path::{Path, PathBuf};

use procdocs_core::value::yaml_to_json;
use serde_json::Value;
use thiserror::Error;

use crate::error::SchemaError;
use crate::schema::Schema;

/// Failure to turn a file into a raw tree or a compiled schema.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The extension is not one this loader reads.
    #[error("unsupported file extension for '{}' (expected {expected})", path.display())]
    UnsupportedExtension {
        /// Offending path.
        path: PathBuf,
        /// Human-readable list of accepted extensions.
        expected: &'static str,
    },

    /// The file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed JSON or YAML.
    #[error("cannot parse '{}': {reason}", path.display())]
    Parse {
        /// Path being parsed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The file parsed but is not a valid schema definition.
    #[error("invalid schema '{}': {source}", path.display())]
    Schema {
        /// Schema file path.
        path: PathBuf,
        /// Compilation outcome.
        #[source]
        source: SchemaError,
    },
}

impl LoadError {
    /// The compilation error, when the file was read but failed
    /// meta-schema validation.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            LoadError::Schema { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Returns true for `.yaml` and `.yml` paths.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("yaml" | "yml"))
}

/// Returns true for `.json` paths.
pub fn is_json_path(path: &Path) -> bool {
    extension(path).as_deref() == Some("json")
}

/// Read a JSON schema definition into the raw value model.
pub fn read_schema_definition(path: &Path) -> Result<Value, LoadError> {
    if !is_json_path(path) {
        return Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
            expected: ".json",
        });
    }
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Read a YAML or JSON document into the raw value model.
pub fn read_document(path: &Path) -> Result<Value, LoadError> {
    if is_yaml_path(path) {
        let text = read_text(path)?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            reason: format!("invalid YAML: {e}"),
        })?;
        yaml_to_json(&yaml).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            reason: format!("YAML-to-JSON conversion failed: {e}"),
        })
    } else if is_json_path(path) {
        let text = read_text(path)?;
        serde_json::from_str(&text).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            reason: format!("invalid JSON: {e}"),
        })
    } else {
        Err(LoadError::UnsupportedExtension {
            path: path.to_path_buf(),
            expected: ".yaml, .yml or .json",
        })
    }
}

/// Read and compile a schema file.
pub fn load_schema(path: &Path) -> Result<Schema, LoadError> {
    let definition = read_schema_definition(path)?;
    Schema::from_definition(&definition).map_err(|source| LoadError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
