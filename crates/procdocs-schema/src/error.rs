//! Error types for schema compilation.

use procdocs_core::Violations;
use thiserror::Error;

/// Outcome of a failed schema compilation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The definition breaks one or more meta-schema rules.
    #[error("schema definition is invalid ({} violation(s)):\n{}", .0.len(), .0)]
    Invalid(Violations),

    /// The engine reached a state that meta-schema validation should have
    /// ruled out. Indicates a defect in this crate, not in the input.
    #[error("internal schema compiler error: {0}")]
    Internal(String),
}

impl SchemaError {
    /// The violations of an [`SchemaError::Invalid`] outcome.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            SchemaError::Invalid(violations) => Some(violations),
            SchemaError::Internal(_) => None,
        }
    }

    /// Returns true for an engine defect rather than a user input problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, SchemaError::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procdocs_core::{FieldPath, ViolationKind};

    #[test]
    fn invalid_display_counts_and_lists_violations() {
        let mut violations = Violations::new();
        violations.report(
            ViolationKind::MissingMetadataKey,
            FieldPath::root().key("metadata").key("schema_name"),
            "missing required key",
        );
        violations.report(
            ViolationKind::MissingMetadataKey,
            FieldPath::root().key("metadata").key("format_version"),
            "missing required key",
        );
        let err = SchemaError::Invalid(violations.clone());

        let text = err.to_string();
        assert_eq!(
            text,
            format!("schema definition is invalid (2 violation(s)):\n{violations}")
        );
        assert!(text.contains("metadata.schema_name: missing required key"));
        assert_eq!(err.violations().map(Violations::len), Some(2));
        assert!(!err.is_internal());
    }
}
