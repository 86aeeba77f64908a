//! # procdocs-core — Foundational Types for ProcDocs
//!
//! This crate is the leaf of the ProcDocs workspace. It holds the types
//! every other crate speaks in when it reports a problem or inspects a raw
//! tree, and nothing that knows about schemas themselves.
//!
//! ## Key Design Principles
//!
//! 1. **One raw value model.** Schema definitions and documents are
//!    `serde_json::Value` trees. YAML input is converted into the same
//!    model by [`value::yaml_to_json`] before anything inspects it.
//!
//! 2. **Violations are data.** A [`Violation`] carries a [`FieldPath`], a
//!    closed [`ViolationKind`] and a message. Validators collect them into
//!    [`Violations`] and return them; they never panic on user input.
//!
//! 3. **Process-wide constants are immutable.** Reserved names, metadata
//!    keys and the current format version live in [`constants`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `procdocs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod constants;
pub mod error;
pub mod path;
pub mod value;
pub mod violation;

pub use constants::{is_reserved_name, RESERVED_FIELD_NAMES};
pub use error::CoreError;
pub use path::{FieldPath, PathSegment};
pub use violation::{Violation, ViolationKind, Violations};
