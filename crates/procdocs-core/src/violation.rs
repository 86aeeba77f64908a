//! # Violations
//!
//! A violation is one reported deviation between a schema definition (or a
//! document) and the rules it must satisfy. Validators never stop at the
//! first problem: they collect every [`Violation`] they find into a
//! [`Violations`] list so a caller sees the complete diagnosis in one pass.
//!
//! ## Kinds
//!
//! [`ViolationKind`] is closed. Adding a kind forces every exhaustive
//! `match` over it to be revisited, and each kind has a stable snake_case
//! [`code`](ViolationKind::code) suitable for machine consumption.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Machine-distinguishable category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required metadata key is absent (schema or document).
    MissingMetadataKey,
    /// A descriptor's `type` is not one of the supported field types.
    UnknownFieldType,
    /// An attribute is illegal for the descriptor's type, or absent where
    /// the type requires it.
    InvalidAttributeForType,
    /// A `pattern` does not compile as a regular expression.
    InvalidPattern,
    /// Two sibling descriptors share a name.
    DuplicateFieldName,
    /// A field name equals one of the reserved names.
    ReservedFieldName,
    /// A document's declared type does not match the schema it is checked
    /// against.
    DocumentTypeMismatch,
    /// A required field is absent.
    MissingField,
    /// A value's runtime shape does not match the declared type.
    TypeMismatch,
    /// A value is not among the declared enum options.
    EnumViolation,
    /// A string value does not match the declared pattern.
    PatternViolation,
    /// A content key is not declared by the schema (closed validation only).
    UnknownField,
}

impl ViolationKind {
    /// All kinds, in declaration order.
    pub const ALL: [ViolationKind; 12] = [
        ViolationKind::MissingMetadataKey,
        ViolationKind::UnknownFieldType,
        ViolationKind::InvalidAttributeForType,
        ViolationKind::InvalidPattern,
        ViolationKind::DuplicateFieldName,
        ViolationKind::ReservedFieldName,
        ViolationKind::DocumentTypeMismatch,
        ViolationKind::MissingField,
        ViolationKind::TypeMismatch,
        ViolationKind::EnumViolation,
        ViolationKind::PatternViolation,
        ViolationKind::UnknownField,
    ];

    /// Stable snake_case code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingMetadataKey => "missing_metadata_key",
            ViolationKind::UnknownFieldType => "unknown_field_type",
            ViolationKind::InvalidAttributeForType => "invalid_attribute_for_type",
            ViolationKind::InvalidPattern => "invalid_pattern",
            ViolationKind::DuplicateFieldName => "duplicate_field_name",
            ViolationKind::ReservedFieldName => "reserved_field_name",
            ViolationKind::DocumentTypeMismatch => "document_type_mismatch",
            ViolationKind::MissingField => "missing_field",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::EnumViolation => "enum_violation",
            ViolationKind::PatternViolation => "pattern_violation",
            ViolationKind::UnknownField => "unknown_field",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single violation with its location and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Category of the violation.
    pub kind: ViolationKind,
    /// Location of the offending node.
    pub path: FieldPath,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Create a violation.
    pub fn new(kind: ViolationKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} [{}]", self.path, self.message, self.kind)
    }
}

/// Ordered collection of violations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append a violation built from its parts.
    pub fn report(&mut self, kind: ViolationKind, path: FieldPath, message: impl Into<String>) {
        self.push(Violation::new(kind, path, message));
    }

    /// Append every violation of `other`, preserving order.
    pub fn append(&mut self, other: Violations) {
        self.violations.extend(other.violations);
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations in report order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Returns the violations of one kind.
    pub fn of_kind(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }

    /// Returns true if any violation has the given kind.
    pub fn contains_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Violations> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self {
            violations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}
