//! # Error Types
//!
//! Errors raised by the foundational helpers. Validation problems are not
//! errors in this sense; they are reported as [`crate::Violations`].

use thiserror::Error;

/// Error raised while converting or inspecting raw input trees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A YAML mapping key cannot be represented as a string key.
    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),

    /// A YAML number has no JSON representation (NaN or infinity).
    #[error("cannot represent number {0} in the document model")]
    NonFiniteNumber(String),
}
