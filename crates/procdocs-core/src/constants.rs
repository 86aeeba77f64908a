//! # ProcDocs Constants
//!
//! Process-wide read-only tables shared by the meta-schema validator and
//! the document validator. Nothing here is ever mutated, so the tables are
//! safe to read from any number of concurrent validation calls.

/// Field names that may never be used by a schema field or a document
/// content key, at any nesting level.
pub const RESERVED_FIELD_NAMES: [&str; 3] = ["metadata", "structure", "contents"];

/// Current version of the ProcDocs format (schema and document layout).
pub const CURRENT_FORMAT_VERSION: &str = "0.0.1";

/// Top-level key holding metadata in both schemas and documents.
pub const METADATA_KEY: &str = "metadata";

/// Top-level key holding the field descriptor sequence of a schema.
pub const STRUCTURE_KEY: &str = "structure";

/// Top-level key holding the data tree of a document.
pub const CONTENTS_KEY: &str = "contents";

/// Metadata key carrying the format version, in schemas and documents.
pub const FORMAT_VERSION_KEY: &str = "format_version";

/// Schema metadata key carrying the identifying name.
pub const SCHEMA_NAME_KEY: &str = "schema_name";

/// Optional, free-form schema version label.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Document metadata key naming the schema the document claims to follow.
pub const DOCUMENT_TYPE_KEY: &str = "document_type";

/// Optional, free-form document version label.
pub const DOCUMENT_VERSION_KEY: &str = "document_version";

/// Required keys of a schema's `metadata` mapping.
pub const SCHEMA_METADATA_REQUIRED: [&str; 2] = [SCHEMA_NAME_KEY, FORMAT_VERSION_KEY];

/// Required keys of a document's `metadata` mapping.
pub const DOCUMENT_METADATA_REQUIRED: [&str; 2] = [DOCUMENT_TYPE_KEY, FORMAT_VERSION_KEY];

/// Returns true if `name` is one of [`RESERVED_FIELD_NAMES`].
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_FIELD_NAMES.contains(&name)
}

/// Normalise a schema name or document type identifier for comparison:
/// surrounding whitespace is dropped and ASCII letters are lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
