//! # Document Validator
//!
//! Checks a document against a compiled [`Schema`], substitutes declared
//! defaults for absent optional fields, and reports every violation in one
//! pass.
//!
//! ## Top-level checks
//!
//! The document's `metadata.document_type` must name the schema. A missing
//! type skips the structural walk; a type naming a different schema yields
//! a single [`ViolationKind::DocumentTypeMismatch`] and nothing else, since
//! structural findings against the wrong schema are noise.
//!
//! ## Structural walk
//!
//! Depth-first, in lock-step between a descriptor sequence and the content
//! mapping it describes. Content paths are rooted at `contents`, so a
//! missing step number reports at `steps[0].step-number`.
//!
//! - A missing (or `null`) required field is a `MissingField`; a missing
//!   optional field receives its `default`, if one is declared.
//! - A container whose own shape is wrong is reported once; nothing
//!   beneath it is checked.
//! - Each `list` element is one record described by the list's children.
//!   An empty list is valid.
//! - Undeclared keys pass through verbatim unless
//!   [`DocumentValidator::deny_unknown_fields`] is set. Reserved names are
//!   never legal content keys.
//!
//! The input is never modified; defaults are applied to a copy that is
//! returned only when validation succeeds.

use procdocs_core::constants::{
    is_reserved_name, normalize_name, CONTENTS_KEY, DOCUMENT_TYPE_KEY, METADATA_KEY,
};
use procdocs_core::value::{non_blank_str, render, type_name};
use procdocs_core::{FieldPath, ViolationKind, Violations};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, FieldKind};
use crate::metadata::DocumentMetadata;
use crate::schema::Schema;

/// A document that passed validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedDocument {
    /// Parsed document metadata.
    pub metadata: DocumentMetadata,
    /// Content tree with defaults substituted.
    pub contents: Map<String, Value>,
}

impl ValidatedDocument {
    /// Reassemble the raw `{metadata, contents}` document.
    pub fn into_value(self) -> Value {
        let mut out = Map::new();
        out.insert(METADATA_KEY.into(), self.metadata.to_value());
        out.insert(CONTENTS_KEY.into(), Value::Object(self.contents));
        Value::Object(out)
    }
}

/// Validates documents against one schema.
#[derive(Debug, Clone, Copy)]
pub struct DocumentValidator<'s> {
    schema: &'s Schema,
    deny_unknown_fields: bool,
}

impl<'s> DocumentValidator<'s> {
    /// An open-schema validator: undeclared content keys pass through.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            deny_unknown_fields: false,
        }
    }

    /// Report undeclared content keys as [`ViolationKind::UnknownField`].
    pub fn deny_unknown_fields(mut self, deny: bool) -> Self {
        self.deny_unknown_fields = deny;
        self
    }

    /// The schema this validator checks against.
    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Validate a raw `{metadata, contents}` document.
    ///
    /// # Errors
    ///
    /// Returns every violation found. The returned collection is never
    /// empty.
    pub fn validate(&self, document: &Value) -> Result<ValidatedDocument, Violations> {
        let mut violations = Violations::new();

        let root = match document {
            Value::Object(map) => map,
            other => {
                violations.report(
                    ViolationKind::TypeMismatch,
                    FieldPath::root(),
                    format!("document must be a dict, got {}", type_name(other)),
                );
                return Err(violations);
            }
        };

        let metadata_path = FieldPath::root().key(METADATA_KEY);
        let raw_metadata = match root.get(METADATA_KEY).filter(|v| !v.is_null()) {
            Some(value) => value,
            None => {
                violations.report(
                    ViolationKind::MissingMetadataKey,
                    metadata_path,
                    "document has no 'metadata'",
                );
                return Err(violations);
            }
        };

        let declared_type = raw_metadata
            .get(DOCUMENT_TYPE_KEY)
            .and_then(non_blank_str)
            .map(normalize_name);
        if let Some(declared) = &declared_type {
            if declared != self.schema.name() {
                let mut mismatch = Violations::new();
                mismatch.report(
                    ViolationKind::DocumentTypeMismatch,
                    metadata_path.key(DOCUMENT_TYPE_KEY),
                    format!(
                        "document type '{declared}' does not match schema '{}'",
                        self.schema.name()
                    ),
                );
                return Err(mismatch);
            }
        }

        let metadata = DocumentMetadata::parse(raw_metadata, &metadata_path, &mut violations);
        if declared_type.is_none() {
            return Err(violations);
        }

        let contents_path = FieldPath::root().key(CONTENTS_KEY);
        let contents = match root.get(CONTENTS_KEY).filter(|v| !v.is_null()) {
            None => {
                violations.report(
                    ViolationKind::MissingField,
                    contents_path,
                    "document has no 'contents'",
                );
                None
            }
            Some(Value::Object(map)) => {
                let mut contents = map.clone();
                self.walk_level(
                    self.schema.structure(),
                    &mut contents,
                    &FieldPath::root(),
                    &mut violations,
                );
                Some(contents)
            }
            Some(other) => {
                violations.report(
                    ViolationKind::TypeMismatch,
                    contents_path,
                    format!("'contents' must be a dict, got {}", type_name(other)),
                );
                None
            }
        };

        tracing::debug!(
            schema = %self.schema.name(),
            violations = violations.len(),
            "document validated"
        );

        match (metadata, contents) {
            (Some(metadata), Some(contents)) if violations.is_empty() => {
                Ok(ValidatedDocument { metadata, contents })
            }
            _ => Err(violations),
        }
    }

    /// Validate a bare content mapping, skipping the metadata checks.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn validate_contents(
        &self,
        contents: &Map<String, Value>,
    ) -> Result<Map<String, Value>, Violations> {
        let mut violations = Violations::new();
        let mut out = contents.clone();
        self.walk_level(self.schema.structure(), &mut out, &FieldPath::root(), &mut violations);
        violations.into_result(out)
    }

    fn walk_level(
        &self,
        descriptors: &[FieldDescriptor],
        map: &mut Map<String, Value>,
        path: &FieldPath,
        out: &mut Violations,
    ) {
        for fd in descriptors {
            let field_path = path.key(fd.name());
            let present = map.get(fd.name()).is_some_and(|v| !v.is_null());

            if !present {
                if fd.is_required() {
                    out.report(
                        ViolationKind::MissingField,
                        field_path,
                        format!("missing required field '{}'", fd.name()),
                    );
                } else if let Some(default) = fd.effective_default() {
                    map.insert(fd.name().to_string(), default.clone());
                }
                continue;
            }

            if let Some(value) = map.get_mut(fd.name()) {
                self.check_value(fd, value, &field_path, out);
            }
        }

        for key in map.keys() {
            if descriptors.iter().any(|fd| fd.name() == key) {
                continue;
            }
            if is_reserved_name(key) {
                out.report(
                    ViolationKind::ReservedFieldName,
                    path.key(key.as_str()),
                    format!("'{key}' is a reserved name and cannot be used as a field"),
                );
            } else if self.deny_unknown_fields {
                out.report(
                    ViolationKind::UnknownField,
                    path.key(key.as_str()),
                    format!("field '{key}' is not declared by the schema"),
                );
            }
        }
    }

    fn check_value(
        &self,
        fd: &FieldDescriptor,
        value: &mut Value,
        path: &FieldPath,
        out: &mut Violations,
    ) {
        let field_type = fd.field_type();
        if !field_type.accepts(value) {
            out.report(
                ViolationKind::TypeMismatch,
                path.clone(),
                format!("expected {field_type}, got {} {}", type_name(value), render(value)),
            );
            return;
        }

        match (fd.kind(), value) {
            (FieldKind::Dict { children }, Value::Object(map)) => {
                self.walk_level(children, map, path, out);
            }
            (FieldKind::List { children }, Value::Array(items)) => {
                for (index, item) in items.iter_mut().enumerate() {
                    let item_path = path.index(index);
                    match item {
                        Value::Object(record) => self.walk_level(children, record, &item_path, out),
                        other => out.report(
                            ViolationKind::TypeMismatch,
                            item_path,
                            format!("list element must be a dict, got {}", type_name(other)),
                        ),
                    }
                }
            }
            (FieldKind::Enum { options }, Value::String(s)) => {
                if !options.iter().any(|o| o.as_str() == s.as_str()) {
                    out.report(
                        ViolationKind::EnumViolation,
                        path.clone(),
                        format!("value '{s}' is not one of: {}", options.join(", ")),
                    );
                }
            }
            (FieldKind::String { pattern: Some(pattern) }, Value::String(s)) => {
                if !pattern.is_match(s) {
                    out.report(
                        ViolationKind::PatternViolation,
                        path.clone(),
                        format!("value '{s}' does not match pattern '{pattern}'"),
                    );
                }
            }
            _ => {}
        }
    }
}
