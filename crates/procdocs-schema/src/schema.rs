//! # Schema Model
//!
//! A compiled, immutable document schema: parsed metadata plus the ordered
//! top-level field descriptors. The only way to obtain a [`Schema`] is
//! through the meta-schema compiler, so every `Schema` in existence has
//! passed meta-schema validation.
//!
//! `Schema` holds no interior mutability and is `Send + Sync`; share it
//! across threads behind an `Arc` and validate documents concurrently.

use serde_json::{Map, Value};

use procdocs_core::constants::{METADATA_KEY, STRUCTURE_KEY};
use procdocs_core::Violations;

use crate::descriptor::FieldDescriptor;
use crate::document::{DocumentValidator, ValidatedDocument};
use crate::error::SchemaError;
use crate::meta::MetaSchemaValidator;
use crate::metadata::SchemaMetadata;

/// One compiled document schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    metadata: SchemaMetadata,
    structure: Vec<FieldDescriptor>,
}

impl Schema {
    pub(crate) fn new(metadata: SchemaMetadata, structure: Vec<FieldDescriptor>) -> Self {
        Self {
            metadata,
            structure,
        }
    }

    /// Compile a raw definition. Shorthand for
    /// [`MetaSchemaValidator::compile`].
    pub fn from_definition(definition: &Value) -> Result<Self, SchemaError> {
        MetaSchemaValidator::new().compile(definition)
    }

    /// Normalised identifying name.
    pub fn name(&self) -> &str {
        &self.metadata.schema_name
    }

    /// The schema's format version string.
    pub fn format_version(&self) -> &str {
        &self.metadata.format_version
    }

    /// Free-form version label, if declared.
    pub fn version(&self) -> Option<&str> {
        self.metadata.schema_version.as_deref()
    }

    /// Parsed metadata.
    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    /// Top-level descriptors in declaration order.
    pub fn structure(&self) -> &[FieldDescriptor] {
        &self.structure
    }

    /// Look up a top-level descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.structure.iter().find(|fd| fd.name() == name)
    }

    /// Render back into a raw definition that compiles to an equal schema.
    pub fn to_definition(&self) -> Value {
        let mut out = Map::new();
        out.insert(METADATA_KEY.into(), self.metadata.to_value());
        out.insert(
            STRUCTURE_KEY.into(),
            Value::Array(self.structure.iter().map(FieldDescriptor::to_definition).collect()),
        );
        Value::Object(out)
    }

    /// An open-schema document validator bound to this schema.
    pub fn validator(&self) -> DocumentValidator<'_> {
        DocumentValidator::new(self)
    }

    /// Validate a raw document with the default (open) validator.
    pub fn validate_document(&self, document: &Value) -> Result<ValidatedDocument, Violations> {
        self.validator().validate(document)
    }
}
