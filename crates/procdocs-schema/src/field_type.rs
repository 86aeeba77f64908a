//! # Field Type Registry
//!
//! The closed set of field types a descriptor may declare, and the table
//! of which descriptor attributes each type allows or requires.
//!
//! | type      | shape accepted     | type-specific attributes |
//! |-----------|--------------------|--------------------------|
//! | `string`  | string             | `pattern` (optional)     |
//! | `number`  | integer or float   | none                     |
//! | `boolean` | `true` / `false`   | none                     |
//! | `enum`    | string             | `options` (required)     |
//! | `list`    | sequence of dicts  | `children` (required)    |
//! | `dict`    | mapping            | `children` (required)    |
//!
//! The meta-schema validator consults the attribute table to decide which
//! keys are legal on a raw descriptor; the document validator consults
//! [`FieldType::accepts`] for the shape of a value. Membership in an enum's
//! options and pattern matching depend on the descriptor, not the type, and
//! live on [`crate::FieldDescriptor::accepts`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Descriptor attribute naming the field.
pub const NAME: &str = "name";
/// Descriptor attribute declaring the field type.
pub const TYPE: &str = "type";
/// Descriptor attribute marking the field optional when `false`.
pub const REQUIRED: &str = "required";
/// Descriptor attribute with a human-readable description.
pub const DESCRIPTION: &str = "description";
/// Descriptor attribute with the value substituted for an absent optional field.
pub const DEFAULT: &str = "default";
/// `string` only: regular expression the value must match.
pub const PATTERN: &str = "pattern";
/// `enum` only: allowed values.
pub const OPTIONS: &str = "options";
/// `list` and `dict` only: nested descriptors.
pub const CHILDREN: &str = "children";

/// Attributes legal on every descriptor regardless of type.
pub const COMMON_ATTRIBUTES: [&str; 5] = [NAME, TYPE, REQUIRED, DESCRIPTION, DEFAULT];

/// Attributes whose legality depends on the descriptor's type.
pub const TYPE_SPECIFIC_ATTRIBUTES: [&str; 3] = [PATTERN, OPTIONS, CHILDREN];

/// A `type` value outside the closed enumeration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown field type '{0}'; valid types are: string, number, boolean, enum, list, dict")]
pub struct UnknownFieldType(pub String);

/// Supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Textual scalar, optionally constrained by a pattern.
    String,
    /// Numeric scalar (integer or float).
    Number,
    /// `true` / `false`.
    Boolean,
    /// String constrained to a fixed set of options.
    Enum,
    /// Homogeneous sequence of records described by `children`.
    List,
    /// Mapping with named sub-fields described by `children`.
    Dict,
}

impl FieldType {
    /// All field types, in declaration order.
    pub const ALL: [FieldType; 6] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Enum,
        FieldType::List,
        FieldType::Dict,
    ];

    /// The type assumed when a descriptor omits `type`.
    pub const DEFAULT: FieldType = FieldType::String;

    /// Resolve a type name. Surrounding whitespace and ASCII case are ignored.
    pub fn parse(name: &str) -> Result<Self, UnknownFieldType> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "enum" => Ok(FieldType::Enum),
            "list" => Ok(FieldType::List),
            "dict" => Ok(FieldType::Dict),
            _ => Err(UnknownFieldType(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::List => "list",
            FieldType::Dict => "dict",
        }
    }

    /// True for `string`, `number`, `boolean` and `enum`.
    pub fn is_scalar(&self) -> bool {
        !self.is_container()
    }

    /// True for `list` and `dict`, the types that carry `children`.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::List | FieldType::Dict)
    }

    /// Type-specific attributes this type allows.
    pub fn allowed_attributes(&self) -> &'static [&'static str] {
        match self {
            FieldType::String => &[PATTERN],
            FieldType::Number | FieldType::Boolean => &[],
            FieldType::Enum => &[OPTIONS],
            FieldType::List | FieldType::Dict => &[CHILDREN],
        }
    }

    /// Type-specific attributes this type requires.
    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            FieldType::String | FieldType::Number | FieldType::Boolean => &[],
            FieldType::Enum => &[OPTIONS],
            FieldType::List | FieldType::Dict => &[CHILDREN],
        }
    }

    /// Returns true if `attribute` may appear on a descriptor of this type.
    pub fn allows_attribute(&self, attribute: &str) -> bool {
        COMMON_ATTRIBUTES.contains(&attribute) || self.allowed_attributes().contains(&attribute)
    }

    /// Shape predicate: does `value` have the runtime shape of this type?
    ///
    /// For `enum` this only checks that the value is a string; membership in
    /// the options is a property of the descriptor.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String | FieldType::Enum => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::List => value.is_array(),
            FieldType::Dict => value.is_object(),
        }
    }
}

/// Returns true if `attribute` is a known descriptor attribute of any type.
pub fn is_known_attribute(attribute: &str) -> bool {
    COMMON_ATTRIBUTES.contains(&attribute) || TYPE_SPECIFIC_ATTRIBUTES.contains(&attribute)
}

/// Types that allow a type-specific attribute, for diagnostics.
pub fn types_allowing(attribute: &str) -> Vec<FieldType> {
    FieldType::ALL
        .into_iter()
        .filter(|t| t.allowed_attributes().contains(&attribute))
        .collect()
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::parse(s)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
