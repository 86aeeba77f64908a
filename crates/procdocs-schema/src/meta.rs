//! # Meta-Schema Validator
//!
//! Decides whether a raw schema definition is a legal schema and, when it
//! is, compiles it into a [`Schema`]. Validation and compilation are one
//! pass over the raw tree: each descriptor is checked, and only descriptors
//! without violations are compiled.
//!
//! ## Aggregation
//!
//! Every problem found anywhere in the definition is collected. Within a
//! single descriptor the checks run in a fixed order and the descriptor is
//! dropped from the compiled output once it has a violation, but sibling
//! and child descriptors are still checked, so one call reports every
//! broken descriptor in the tree.
//!
//! ## Paths
//!
//! Descriptor violations are reported at the descriptor's own path:
//! `structure`, then the names of the enclosing descriptors
//! (`structure.steps.step-number`). A descriptor without a usable name is
//! addressed by its index (`structure[2]`).
//!
//! ## Null
//!
//! A `null` attribute value is treated as absent throughout.

use std::collections::HashSet;

use procdocs_core::constants::{is_reserved_name, METADATA_KEY, STRUCTURE_KEY};
use procdocs_core::value::{non_blank_str, render, type_name};
use procdocs_core::{FieldPath, ViolationKind, Violations};
use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, FieldKind, Pattern};
use crate::error::SchemaError;
use crate::field_type::{
    self, is_known_attribute, types_allowing, FieldType, TYPE_SPECIFIC_ATTRIBUTES,
};
use crate::metadata::SchemaMetadata;
use crate::schema::Schema;

/// Checks raw schema definitions against the fixed meta-schema.
///
/// Stateless; one instance may be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSchemaValidator;

impl MetaSchemaValidator {
    /// Create a validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate `definition` and compile it.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Invalid`] with every violation found, or
    /// [`SchemaError::Internal`] if a definition without violations still
    /// failed to compile.
    pub fn compile(&self, definition: &Value) -> Result<Schema, SchemaError> {
        let mut violations = Violations::new();
        let compiled = self.compile_root(definition, &mut violations);
        if !violations.is_empty() {
            tracing::debug!(violations = violations.len(), "schema definition rejected");
            return Err(SchemaError::Invalid(violations));
        }
        match compiled {
            Some((metadata, structure)) => {
                tracing::debug!(schema = %metadata.schema_name, fields = structure.len(), "schema compiled");
                Ok(Schema::new(metadata, structure))
            }
            None => Err(SchemaError::Internal(
                "definition produced no violations but did not compile".into(),
            )),
        }
    }

    /// Collect the violations of `definition` without keeping the compiled
    /// schema. An empty result means the definition is valid.
    pub fn check(&self, definition: &Value) -> Violations {
        let mut violations = Violations::new();
        self.compile_root(definition, &mut violations);
        violations
    }

    fn compile_root(
        &self,
        definition: &Value,
        out: &mut Violations,
    ) -> Option<(SchemaMetadata, Vec<FieldDescriptor>)> {
        let root = match definition {
            Value::Object(map) => map,
            other => {
                out.report(
                    ViolationKind::TypeMismatch,
                    FieldPath::root(),
                    format!("schema definition must be a dict, got {}", type_name(other)),
                );
                return None;
            }
        };

        let metadata_path = FieldPath::root().key(METADATA_KEY);
        let metadata = match attribute(root, METADATA_KEY) {
            None => {
                out.report(
                    ViolationKind::MissingMetadataKey,
                    metadata_path,
                    "schema definition has no 'metadata'",
                );
                None
            }
            Some(value) => SchemaMetadata::parse(value, &metadata_path, out),
        };

        let structure_path = FieldPath::root().key(STRUCTURE_KEY);
        let structure = match attribute(root, STRUCTURE_KEY) {
            None => {
                out.report(
                    ViolationKind::MissingField,
                    structure_path,
                    "schema definition has no 'structure'",
                );
                None
            }
            Some(Value::Array(items)) => Some(self.compile_level(items, &structure_path, out)),
            Some(other) => {
                out.report(
                    ViolationKind::TypeMismatch,
                    structure_path,
                    format!("'structure' must be a list, got {}", type_name(other)),
                );
                None
            }
        };

        for key in root.keys() {
            if key != METADATA_KEY && key != STRUCTURE_KEY {
                tracing::debug!(key = %key, "ignoring unrecognised top-level schema key");
            }
        }

        Some((metadata?, structure?))
    }

    /// Check one sibling sequence of descriptors. Names are tracked per
    /// level; the same name may appear at different levels.
    fn compile_level(
        &self,
        items: &[Value],
        path: &FieldPath,
        out: &mut Violations,
    ) -> Vec<FieldDescriptor> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut compiled = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let name = item.get(field_type::NAME).and_then(non_blank_str);
            let descriptor_path = match name {
                Some(name) => path.key(name),
                None => path.index(index),
            };

            if let Some(name) = name {
                if is_reserved_name(name) {
                    out.report(
                        ViolationKind::ReservedFieldName,
                        descriptor_path.clone(),
                        format!("field name '{name}' is reserved"),
                    );
                } else if !seen.insert(name) {
                    out.report(
                        ViolationKind::DuplicateFieldName,
                        descriptor_path.clone(),
                        format!("duplicate field name '{name}' at this level"),
                    );
                }
            }

            if let Some(descriptor) = self.compile_descriptor(item, &descriptor_path, out) {
                compiled.push(descriptor);
            }
        }
        compiled
    }

    fn compile_descriptor(
        &self,
        item: &Value,
        path: &FieldPath,
        out: &mut Violations,
    ) -> Option<FieldDescriptor> {
        let map = match item {
            Value::Object(map) => map,
            other => {
                out.report(
                    ViolationKind::TypeMismatch,
                    path.clone(),
                    format!("field descriptor must be a dict, got {}", type_name(other)),
                );
                return None;
            }
        };
        let before = out.len();

        let name = match attribute(map, field_type::NAME) {
            None => {
                report_attribute(out, path, "field descriptor is missing 'name'");
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                report_attribute(out, path, "'name' must not be blank");
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                report_shape(out, path, field_type::NAME, "string", other);
                None
            }
        };

        let declared_type = match attribute(map, field_type::TYPE) {
            None => Some(FieldType::DEFAULT),
            Some(Value::String(s)) => match FieldType::parse(s) {
                Ok(t) => Some(t),
                Err(e) => {
                    out.report(ViolationKind::UnknownFieldType, path.clone(), e.to_string());
                    None
                }
            },
            Some(other) => {
                report_shape(out, path, field_type::TYPE, "string", other);
                None
            }
        };

        let required = match attribute(map, field_type::REQUIRED) {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                report_shape(out, path, field_type::REQUIRED, "boolean", other);
                true
            }
        };

        let description = match attribute(map, field_type::DESCRIPTION) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                report_shape(out, path, field_type::DESCRIPTION, "string", other);
                None
            }
        };

        let default = attribute(map, field_type::DEFAULT).cloned();
        if default.is_some() && required {
            tracing::debug!(field = %path, "default on a required field is ignored");
        }

        for key in map.keys() {
            if !is_known_attribute(key) {
                report_attribute(out, path, format!("unknown attribute '{key}'"));
            }
        }

        // Type-specific attributes can only be judged against a known type.
        let field_type = declared_type?;

        for attr in TYPE_SPECIFIC_ATTRIBUTES {
            if attribute(map, attr).is_some() && !field_type.allows_attribute(attr) {
                let owners: Vec<&str> = types_allowing(attr).iter().map(|t| t.as_str()).collect();
                report_attribute(
                    out,
                    path,
                    format!(
                        "attribute '{attr}' is not allowed for type '{field_type}' (only for: {})",
                        owners.join(", ")
                    ),
                );
            }
        }
        for attr in field_type.required_attributes() {
            if attribute(map, attr).is_none() {
                report_attribute(
                    out,
                    path,
                    format!("type '{field_type}' requires attribute '{attr}'"),
                );
            }
        }

        let kind = match field_type {
            FieldType::String => FieldKind::String {
                pattern: self.compile_pattern(map, path, out),
            },
            FieldType::Number => FieldKind::Number,
            FieldType::Boolean => FieldKind::Boolean,
            FieldType::Enum => FieldKind::Enum {
                options: self.compile_options(map, path, out).unwrap_or_default(),
            },
            FieldType::List => FieldKind::List {
                children: self.compile_children(map, path, out).unwrap_or_default(),
            },
            FieldType::Dict => FieldKind::Dict {
                children: self.compile_children(map, path, out).unwrap_or_default(),
            },
        };

        if out.len() > before {
            return None;
        }
        Some(
            FieldDescriptor::new(name?, kind)
                .with_required(required)
                .with_description(description)
                .with_default(default),
        )
    }

    fn compile_pattern(
        &self,
        map: &Map<String, Value>,
        path: &FieldPath,
        out: &mut Violations,
    ) -> Option<Pattern> {
        match attribute(map, field_type::PATTERN)? {
            Value::String(source) => match Pattern::new(source) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    out.report(
                        ViolationKind::InvalidPattern,
                        path.clone(),
                        format!("invalid regular expression '{source}': {}", error_reason(&e)),
                    );
                    None
                }
            },
            other => {
                report_shape(out, path, field_type::PATTERN, "string", other);
                None
            }
        }
    }

    fn compile_options(
        &self,
        map: &Map<String, Value>,
        path: &FieldPath,
        out: &mut Violations,
    ) -> Option<Vec<String>> {
        let items = match attribute(map, field_type::OPTIONS)? {
            Value::Array(items) => items,
            other => {
                report_shape(out, path, field_type::OPTIONS, "list of strings", other);
                return None;
            }
        };
        if items.is_empty() {
            report_attribute(out, path, "'options' must not be empty");
            return None;
        }

        let mut options: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) if s.trim().is_empty() => {
                    report_attribute(out, path, "'options' entries must not be blank");
                }
                Value::String(s) if options.contains(s) => {
                    report_attribute(out, path, format!("duplicate option '{s}'"));
                }
                Value::String(s) => options.push(s.clone()),
                other => {
                    out.report(
                        ViolationKind::TypeMismatch,
                        path.clone(),
                        format!(
                            "'options' entries must be strings, got {} {}",
                            type_name(other),
                            render(other)
                        ),
                    );
                }
            }
        }
        Some(options)
    }

    fn compile_children(
        &self,
        map: &Map<String, Value>,
        path: &FieldPath,
        out: &mut Violations,
    ) -> Option<Vec<FieldDescriptor>> {
        match attribute(map, field_type::CHILDREN)? {
            Value::Array(items) if items.is_empty() => {
                report_attribute(out, path, "'children' must not be empty");
                None
            }
            Value::Array(items) => Some(self.compile_level(items, path, out)),
            other => {
                report_shape(out, path, field_type::CHILDREN, "list of dicts", other);
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Attribute lookup with `null` treated as absent.
fn attribute<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn report_attribute(out: &mut Violations, path: &FieldPath, message: impl Into<String>) {
    out.report(ViolationKind::InvalidAttributeForType, path.clone(), message);
}

fn report_shape(out: &mut Violations, path: &FieldPath, attr: &str, expected: &str, got: &Value) {
    out.report(
        ViolationKind::TypeMismatch,
        path.clone(),
        format!("'{attr}' must be a {expected}, got {}", type_name(got)),
    );
}

/// Regex errors render as a multi-line diagram; the last line carries the
/// actual reason.
fn error_reason(error: &regex::Error) -> String {
    let text = error.to_string();
    let reason = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or(text.as_str());
    reason.trim().to_string()
}
