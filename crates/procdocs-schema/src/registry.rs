//! # Schema Registry
//!
//! Discovers schema files under one or more root directories, compiles
//! each through the meta-schema validator, and indexes the valid ones by
//! normalised `schema_name`.
//!
//! Every discovered file is recorded as a [`RegistryEntry`], valid or not,
//! so tooling can report broken schemas without failing the whole load.
//! A missing root is skipped with a warning. When two files declare the
//! same name, the first in path order wins and the later one is recorded
//! as invalid.
//!
//! Compiled schemas are held as `Arc<Schema>` and handed out shared; the
//! registry is `Send + Sync` once loaded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use procdocs_core::constants::{
    normalize_name, DOCUMENT_TYPE_KEY, METADATA_KEY, SCHEMA_NAME_KEY, SCHEMA_VERSION_KEY,
};
use procdocs_core::value::non_blank_str;
use procdocs_core::Violations;
use serde_json::Value;
use thiserror::Error;

use crate::document::ValidatedDocument;
use crate::load::{is_json_path, load_schema, read_schema_definition, LoadError};
use crate::schema::Schema;

/// Registry lookup and dispatch failures.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No valid schema with this name is registered.
    #[error("schema '{0}' not found")]
    UnknownSchema(String),

    /// The document does not declare `metadata.document_type`.
    #[error("document does not declare metadata.document_type")]
    MissingDocumentType,

    /// A schema with the same normalised name is already registered.
    #[error("schema '{0}' is already registered")]
    DuplicateSchema(String),

    /// The document failed validation against its schema.
    #[error("document failed validation against schema '{schema_name}':\n{violations}")]
    Validation {
        /// Normalised schema name.
        schema_name: String,
        /// Every violation found.
        violations: Violations,
    },
}

/// Outcome of loading one schema file.
#[derive(Debug, Clone)]
pub enum EntryStatus {
    /// Compiled and registered.
    Valid(Arc<Schema>),
    /// Rejected, with the reason.
    Invalid(String),
}

/// One discovered schema file.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    /// File the schema was read from.
    pub path: PathBuf,
    /// Normalised `schema_name`, when one could be read.
    pub name: Option<String>,
    /// `schema_version`, when one could be read.
    pub version: Option<String>,
    /// Load outcome.
    pub status: EntryStatus,
}

impl RegistryEntry {
    /// Returns true if the schema compiled and is registered.
    pub fn is_valid(&self) -> bool {
        matches!(self.status, EntryStatus::Valid(_))
    }

    /// The compiled schema of a valid entry.
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.status {
            EntryStatus::Valid(schema) => Some(schema),
            EntryStatus::Invalid(_) => None,
        }
    }

    /// The rejection reason of an invalid entry.
    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            EntryStatus::Valid(_) => None,
            EntryStatus::Invalid(reason) => Some(reason),
        }
    }
}

/// Pseudo-root of schemas registered through [`SchemaRegistry::insert`].
pub const INSERTED_ROOT: &str = "<inserted>";

/// Compiled schemas indexed by name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    roots: Vec<PathBuf>,
    entries: Vec<RegistryEntry>,
    by_name: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// An empty registry with no roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and compile every `*.json` file under `roots`.
    pub fn load<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registry = Self {
            roots: roots.into_iter().map(|r| r.as_ref().to_path_buf()).collect(),
            ..Self::default()
        };

        for root in registry.roots.clone() {
            if !root.is_dir() {
                tracing::warn!(root = %root.display(), "schema root does not exist, skipping");
                continue;
            }
            for path in find_schema_files(&root) {
                registry.load_file(path);
            }
        }

        tracing::debug!(
            valid = registry.by_name.len(),
            invalid = registry.invalid_entries().count(),
            "schema registry loaded"
        );
        registry
    }

    fn load_file(&mut self, path: PathBuf) {
        match load_schema(&path) {
            Ok(schema) => {
                let name = schema.name().to_string();
                let version = schema.version().map(str::to_string);
                if self.by_name.contains_key(&name) {
                    tracing::warn!(path = %path.display(), schema = %name, "duplicate schema name");
                    self.entries.push(RegistryEntry {
                        path,
                        name: Some(name),
                        version,
                        status: EntryStatus::Invalid("duplicate schema name".into()),
                    });
                    return;
                }
                let schema = Arc::new(schema);
                self.by_name.insert(name.clone(), Arc::clone(&schema));
                self.entries.push(RegistryEntry {
                    path,
                    name: Some(name),
                    version,
                    status: EntryStatus::Valid(schema),
                });
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %first_line(&err), "invalid schema file");
                let (name, version) = peek_identity(&path);
                self.entries.push(RegistryEntry {
                    path,
                    name,
                    version,
                    status: EntryStatus::Invalid(err.to_string()),
                });
            }
        }
    }

    /// Register an already compiled schema.
    ///
    /// The schema is also recorded as a valid entry whose path is
    /// `<inserted>/<name>`, so `entries()` and `names()` stay in step.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateSchema`] if the name is taken.
    pub fn insert(&mut self, schema: Schema) -> Result<Arc<Schema>, RegistryError> {
        let name = schema.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateSchema(name));
        }
        let schema = Arc::new(schema);
        self.by_name.insert(name.clone(), Arc::clone(&schema));
        self.entries.push(RegistryEntry {
            path: Path::new(INSERTED_ROOT).join(&name),
            name: Some(name),
            version: schema.version().map(str::to_string),
            status: EntryStatus::Valid(Arc::clone(&schema)),
        });
        Ok(schema)
    }

    /// Look up a schema; the name is normalised first.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.by_name.get(&normalize_name(name)).cloned()
    }

    /// Look up a schema that must exist.
    pub fn require(&self, name: &str) -> Result<Arc<Schema>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownSchema(normalize_name(name)))
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered (valid) schemas.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Roots this registry was loaded from.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every discovered file, in discovery order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Entries that compiled.
    pub fn valid_entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(|e| e.is_valid())
    }

    /// Entries that were rejected.
    pub fn invalid_entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(|e| !e.is_valid())
    }

    /// The schema named by a document's `metadata.document_type`.
    pub fn resolve(&self, document: &Value) -> Result<Arc<Schema>, RegistryError> {
        let declared = document
            .get(METADATA_KEY)
            .and_then(|m| m.get(DOCUMENT_TYPE_KEY))
            .and_then(non_blank_str)
            .ok_or(RegistryError::MissingDocumentType)?;
        self.require(declared)
    }

    /// Resolve the document's schema and validate against it.
    pub fn validate_document(&self, document: &Value) -> Result<ValidatedDocument, RegistryError> {
        let schema = self.resolve(document)?;
        schema
            .validate_document(document)
            .map_err(|violations| RegistryError::Validation {
                schema_name: schema.name().to_string(),
                violations,
            })
    }
}

/// Recursively find `*.json` files under a directory, sorted. Symlinked
/// directories are not descended into.
pub fn find_schema_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_dir() {
                files.extend(find_schema_files(&path));
            } else if is_json_path(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Best-effort name and version of a schema file that failed to compile.
fn peek_identity(path: &Path) -> (Option<String>, Option<String>) {
    let Ok(definition) = read_schema_definition(path) else {
        return (None, None);
    };
    let metadata = definition.get(METADATA_KEY);
    let field = |key: &str| {
        metadata
            .and_then(|m| m.get(key))
            .and_then(non_blank_str)
            .map(str::to_string)
    };
    (
        field(SCHEMA_NAME_KEY).map(|n| normalize_name(&n)),
        field(SCHEMA_VERSION_KEY),
    )
}

fn first_line(err: &LoadError) -> String {
    err.to_string().lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_schema(dir: &Path, file: &str, name: &str) {
        let body = json!({
            "metadata": {"schema_name": name, "format_version": "0.0.1", "schema_version": "1.0"},
            "structure": [{"name": "id"}]
        });
        fs::write(dir.join(file), body.to_string()).unwrap();
    }

    #[test]
    fn loads_recursively_and_records_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested/deeper");
        fs::create_dir_all(&nested).unwrap();
        write_schema(dir.path(), "a.json", "Alpha");
        write_schema(&nested, "b.json", "beta");
        fs::write(nested.join("broken.json"), "{").unwrap();
        fs::write(
            dir.path().join("invalid.json"),
            json!({"metadata": {"schema_name": "gamma"}, "structure": []}).to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = SchemaRegistry::load([dir.path()]);
        assert_eq!(registry.names(), vec!["alpha", "beta"]);
        assert_eq!(registry.entries().len(), 4);

        let invalid: Vec<_> = registry.invalid_entries().collect();
        assert_eq!(invalid.len(), 2);
        let gamma = invalid
            .iter()
            .find(|e| e.name.as_deref() == Some("gamma"))
            .unwrap();
        assert!(gamma.reason().unwrap().contains("format_version"));
    }

    #[test]
    fn duplicate_names_keep_first_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "1.json", "same");
        write_schema(dir.path(), "2.json", "SAME");

        let registry = SchemaRegistry::load([dir.path()]);
        assert_eq!(registry.len(), 1);
        let dup = registry.invalid_entries().next().unwrap();
        assert!(dup.path.ends_with("2.json"));
        assert_eq!(dup.reason(), Some("duplicate schema name"));
    }

    #[test]
    fn missing_root_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::load([dir.path().join("absent")]);
        assert!(registry.is_empty());
        assert!(registry.entries().is_empty());
        assert_eq!(registry.roots().len(), 1);
    }

    #[test]
    fn lookup_is_normalised() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "a.json", "alpha");
        let registry = SchemaRegistry::load([dir.path()]);

        assert!(registry.get(" ALPHA ").is_some());
        assert!(registry.require("alpha").is_ok());
        assert!(matches!(
            registry.require("omega"),
            Err(RegistryError::UnknownSchema(name)) if name == "omega"
        ));
        let entry = registry.valid_entries().next().unwrap();
        assert_eq!(entry.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut registry = SchemaRegistry::new();
        let definition = json!({
            "metadata": {"schema_name": "x", "format_version": "0.0.1"},
            "structure": []
        });
        registry.insert(Schema::from_definition(&definition).unwrap()).unwrap();
        let err = registry
            .insert(Schema::from_definition(&definition).unwrap())
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateSchema(_)));
    }

    #[test]
    fn inserted_schemas_are_listed_as_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "a.json", "alpha");
        let mut registry = SchemaRegistry::load([dir.path()]);
        let definition = json!({
            "metadata": {"schema_name": "Beta", "format_version": "0.0.1", "schema_version": "2.0"},
            "structure": [{"name": "id"}]
        });
        registry.insert(Schema::from_definition(&definition).unwrap()).unwrap();

        assert_eq!(registry.names(), vec!["alpha", "beta"]);
        assert_eq!(registry.valid_entries().count(), registry.len());
        let inserted = registry.entries().last().unwrap();
        assert_eq!(inserted.path, Path::new(INSERTED_ROOT).join("beta"));
        assert_eq!(inserted.name.as_deref(), Some("beta"));
        assert_eq!(inserted.version.as_deref(), Some("2.0"));
        assert!(inserted.is_valid());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "a.json", "alpha");
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        assert_eq!(find_schema_files(dir.path()), vec![dir.path().join("a.json")]);
        assert_eq!(SchemaRegistry::load([dir.path()]).len(), 1);
    }

    #[test]
    fn validate_document_dispatches_on_document_type() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "a.json", "alpha");
        let registry = SchemaRegistry::load([dir.path()]);

        let ok = json!({
            "metadata": {"document_type": "Alpha", "format_version": "0.0.1"},
            "contents": {"id": "x"}
        });
        assert!(registry.validate_document(&ok).is_ok());

        let missing_type = json!({"metadata": {}, "contents": {}});
        assert!(matches!(
            registry.validate_document(&missing_type),
            Err(RegistryError::MissingDocumentType)
        ));

        let bad = json!({
            "metadata": {"document_type": "alpha", "format_version": "0.0.1"},
            "contents": {}
        });
        match registry.validate_document(&bad) {
            Err(RegistryError::Validation { schema_name, violations }) => {
                assert_eq!(schema_name, "alpha");
                assert_eq!(violations.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }
}
