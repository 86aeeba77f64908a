//! # Schema and Document Metadata
//!
//! Both schemas and documents open with a `metadata` mapping. The keys this
//! crate understands are typed fields; every other key is kept verbatim in
//! `extra` and never interpreted.
//!
//! | owner    | required                          | optional           |
//! |----------|-----------------------------------|--------------------|
//! | schema   | `schema_name`, `format_version`   | `schema_version`   |
//! | document | `document_type`, `format_version` | `document_version` |
//!
//! `schema_name` and `document_type` are normalised (trimmed, lowercased)
//! so that a document's declared type compares equal to the schema name
//! regardless of case. `format_version` must be present as a non-empty
//! string; its value is not interpreted.

use procdocs_core::constants::{
    normalize_name, DOCUMENT_TYPE_KEY, DOCUMENT_VERSION_KEY, FORMAT_VERSION_KEY, METADATA_KEY,
    SCHEMA_NAME_KEY, SCHEMA_VERSION_KEY,
};
use procdocs_core::value::{non_blank_str, type_name};
use procdocs_core::{FieldPath, ViolationKind, Violations};
use serde::Serialize;
use serde_json::{Map, Value};

/// Parsed `metadata` of a schema definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMetadata {
    /// Identifying name, normalised.
    pub schema_name: String,
    /// Format version string, as written.
    pub format_version: String,
    /// Free-form version label, trimmed; blank labels are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Every other metadata key, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaMetadata {
    /// Parse a raw `metadata` value. Violations are reported under the
    /// `metadata` path.
    pub fn from_value(value: &Value) -> Result<Self, Violations> {
        let mut violations = Violations::new();
        let parsed = Self::parse(value, &FieldPath::root().key(METADATA_KEY), &mut violations);
        match parsed {
            Some(metadata) if violations.is_empty() => Ok(metadata),
            _ => Err(violations),
        }
    }

    pub(crate) fn parse(value: &Value, path: &FieldPath, out: &mut Violations) -> Option<Self> {
        let map = expect_mapping(value, path, out)?;
        let schema_name = required_string(map, SCHEMA_NAME_KEY, path, out);
        let format_version = required_string(map, FORMAT_VERSION_KEY, path, out);
        let schema_version = optional_label(map, SCHEMA_VERSION_KEY, path, out);
        Some(Self {
            schema_name: normalize_name(&schema_name?),
            format_version: format_version?,
            schema_version,
            extra: extras(map, &[SCHEMA_NAME_KEY, FORMAT_VERSION_KEY, SCHEMA_VERSION_KEY]),
        })
    }

    /// Render back into a raw `metadata` mapping.
    pub fn to_value(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert(SCHEMA_NAME_KEY.into(), Value::String(self.schema_name.clone()));
        out.insert(FORMAT_VERSION_KEY.into(), Value::String(self.format_version.clone()));
        if let Some(version) = &self.schema_version {
            out.insert(SCHEMA_VERSION_KEY.into(), Value::String(version.clone()));
        }
        Value::Object(out)
    }
}

/// Parsed `metadata` of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    /// Name of the schema the document claims to follow, normalised.
    pub document_type: String,
    /// Format version string, as written.
    pub format_version: String,
    /// Free-form version label, trimmed; blank labels are dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_version: Option<String>,
    /// Every other metadata key, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    /// Parse a raw `metadata` value. Violations are reported under the
    /// `metadata` path.
    pub fn from_value(value: &Value) -> Result<Self, Violations> {
        let mut violations = Violations::new();
        let parsed = Self::parse(value, &FieldPath::root().key(METADATA_KEY), &mut violations);
        match parsed {
            Some(metadata) if violations.is_empty() => Ok(metadata),
            _ => Err(violations),
        }
    }

    pub(crate) fn parse(value: &Value, path: &FieldPath, out: &mut Violations) -> Option<Self> {
        let map = expect_mapping(value, path, out)?;
        let document_type = required_string(map, DOCUMENT_TYPE_KEY, path, out);
        let format_version = required_string(map, FORMAT_VERSION_KEY, path, out);
        let document_version = optional_label(map, DOCUMENT_VERSION_KEY, path, out);
        Some(Self {
            document_type: normalize_name(&document_type?),
            format_version: format_version?,
            document_version,
            extra: extras(map, &[DOCUMENT_TYPE_KEY, FORMAT_VERSION_KEY, DOCUMENT_VERSION_KEY]),
        })
    }

    /// Render back into a raw `metadata` mapping.
    pub fn to_value(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert(DOCUMENT_TYPE_KEY.into(), Value::String(self.document_type.clone()));
        out.insert(FORMAT_VERSION_KEY.into(), Value::String(self.format_version.clone()));
        if let Some(version) = &self.document_version {
            out.insert(DOCUMENT_VERSION_KEY.into(), Value::String(version.clone()));
        }
        Value::Object(out)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn expect_mapping<'v>(
    value: &'v Value,
    path: &FieldPath,
    out: &mut Violations,
) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            out.report(
                ViolationKind::TypeMismatch,
                path.clone(),
                format!("expected dict, got {}", type_name(other)),
            );
            None
        }
    }
}

/// A required key holding a non-blank string. Null counts as absent.
pub(crate) fn required_string(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    out: &mut Violations,
) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => {
            out.report(
                ViolationKind::MissingMetadataKey,
                path.key(key),
                format!("missing required metadata key '{key}'"),
            );
            None
        }
        Some(value) => match non_blank_str(value) {
            Some(s) => Some(s.trim().to_string()),
            None => {
                out.report(
                    ViolationKind::TypeMismatch,
                    path.key(key),
                    format!("expected non-empty string, got {}", type_name(value)),
                );
                None
            }
        },
    }
}

/// An optional free-form label. Numbers are accepted and rendered as text.
fn optional_label(
    map: &Map<String, Value>,
    key: &str,
    path: &FieldPath,
    out: &mut Violations,
) -> Option<String> {
    match map.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            out.report(
                ViolationKind::TypeMismatch,
                path.key(key),
                format!("expected string, got {}", type_name(other)),
            );
            None
        }
    }
}

fn extras(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !known.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
