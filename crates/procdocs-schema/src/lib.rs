//! # procdocs-schema — Schema Compilation & Document Validation
//!
//! The validation engine of ProcDocs: a raw schema definition is checked
//! against the fixed meta-schema and compiled into an immutable [`Schema`];
//! documents are then validated against it, with defaults applied and all
//! violations reported in one pass.
//!
//! ```text
//! raw definition ──MetaSchemaValidator──▶ Schema ──DocumentValidator──▶ ValidatedDocument
//!                          │                                  │
//!                          └──────────── Violations ◀─────────┘
//! ```
//!
//! ## Modules
//!
//! - [`field_type`] — the closed set of field types and their attribute table.
//! - [`descriptor`] — the compiled, recursive field descriptor tree.
//! - [`metadata`] — schema and document metadata.
//! - [`meta`] — the meta-schema validator / compiler.
//! - [`schema`] — the compiled schema.
//! - [`document`] — the document validator.
//! - [`registry`] — schema discovery and lookup by name.
//! - [`load`] — reading schema and document files.
//! - [`scaffold`] — YAML skeleton generation.
//!
//! ## Crate Policy
//!
//! - Depends only on `procdocs-core` internally.
//! - User-facing problems are data ([`Violations`]), never panics.
//! - A [`Schema`] can only be obtained through meta-schema validation, so
//!   document validation never sees an ill-formed schema.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod field_type;
pub mod load;
pub mod meta;
pub mod metadata;
pub mod registry;
pub mod scaffold;
pub mod schema;

pub use descriptor::{FieldDescriptor, FieldKind, Pattern};
pub use document::{DocumentValidator, ValidatedDocument};
pub use error::SchemaError;
pub use field_type::{FieldType, UnknownFieldType};
pub use load::LoadError;
pub use meta::MetaSchemaValidator;
pub use metadata::{DocumentMetadata, SchemaMetadata};
pub use registry::{EntryStatus, RegistryEntry, RegistryError, SchemaRegistry};
pub use schema::Schema;

pub use procdocs_core::{FieldPath, PathSegment, Violation, ViolationKind, Violations};
