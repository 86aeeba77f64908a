//! # Field Descriptor Model
//!
//! A [`FieldDescriptor`] is one node of a compiled schema's field tree. The
//! type-specific attributes live inside [`FieldKind`], so a descriptor can
//! only ever carry the attributes its type allows: a `number` field has no
//! place to put `options`, and a `dict` always has its `children`.
//!
//! Descriptors are produced only by the meta-schema compiler
//! ([`crate::MetaSchemaValidator`]) and are immutable afterwards. Children
//! are owned by value; validation is a pure downward traversal, so there
//! are no back-references.

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::field_type::{self, FieldType};

/// A compiled `pattern` attribute.
///
/// Matching is anchored at the start of the value: the expression must
/// match beginning at the first character, but may stop before the end
/// unless the pattern itself ends in `$`.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns the regex engine's error when `source` is not a valid
    /// expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(source)?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The expression as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the expression matches `value` starting at its
    /// first character.
    pub fn is_match(&self, value: &str) -> bool {
        // Leftmost-first search returns a match at 0 whenever one exists.
        self.regex.find(value).is_some_and(|m| m.start() == 0)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Type-specific part of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `string`, with an optional compiled pattern.
    String {
        /// Expression the value must match, if declared.
        pattern: Option<Pattern>,
    },
    /// `number`.
    Number,
    /// `boolean`.
    Boolean,
    /// `enum` with its non-empty, duplicate-free option list.
    Enum {
        /// Allowed values, in declaration order.
        options: Vec<String>,
    },
    /// `list`: `children` describe the record shape of every element.
    List {
        /// Element record fields.
        children: Vec<FieldDescriptor>,
    },
    /// `dict`: `children` describe the named sub-fields.
    Dict {
        /// Sub-fields.
        children: Vec<FieldDescriptor>,
    },
}

impl FieldKind {
    /// The [`FieldType`] this kind belongs to.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::String { .. } => FieldType::String,
            FieldKind::Number => FieldType::Number,
            FieldKind::Boolean => FieldType::Boolean,
            FieldKind::Enum { .. } => FieldType::Enum,
            FieldKind::List { .. } => FieldType::List,
            FieldKind::Dict { .. } => FieldType::Dict,
        }
    }
}

/// One compiled field descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    required: bool,
    description: Option<String>,
    default: Option<Value>,
    kind: FieldKind,
}

impl FieldDescriptor {
    pub(crate) fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            required: true,
            description: None,
            default: None,
            kind,
        }
    }

    pub(crate) fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub(crate) fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub(crate) fn with_default(mut self, default: Option<Value>) -> Self {
        self.default = default;
        self
    }

    /// Field name, unique among its siblings.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Whether the field must be present in a document.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Human-readable description, if declared.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The declared `default`, as written.
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The value substituted when the field is absent from a document:
    /// the declared `default` of an optional field. Required fields never
    /// receive one.
    pub fn effective_default(&self) -> Option<&Value> {
        if self.required {
            None
        } else {
            self.default.as_ref()
        }
    }

    /// Type-specific attributes.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Compiled pattern of a `string` field.
    pub fn pattern(&self) -> Option<&Pattern> {
        match &self.kind {
            FieldKind::String { pattern } => pattern.as_ref(),
            _ => None,
        }
    }

    /// Options of an `enum` field; empty for every other type.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Enum { options } => options,
            _ => &[],
        }
    }

    /// Nested descriptors of a `list` or `dict` field; empty for leaves.
    pub fn children(&self) -> &[FieldDescriptor] {
        match &self.kind {
            FieldKind::List { children } | FieldKind::Dict { children } => children,
            _ => &[],
        }
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&FieldDescriptor> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Leaf predicate: shape from the [`FieldType`], plus option membership
    /// for `enum` and a pattern match for a `string` with a pattern.
    ///
    /// Containers only have their own shape checked; their children are the
    /// document validator's concern.
    pub fn accepts(&self, value: &Value) -> bool {
        if !self.field_type().accepts(value) {
            return false;
        }
        match (&self.kind, value) {
            (FieldKind::Enum { options }, Value::String(s)) => options.iter().any(|o| o == s),
            (FieldKind::String { pattern: Some(p) }, Value::String(s)) => p.is_match(s),
            _ => true,
        }
    }

    /// Render the descriptor back into its raw authoring shape.
    ///
    /// `type` and `required` are always written; other attributes only when
    /// present. Compiling the result yields an equal descriptor.
    pub fn to_definition(&self) -> Value {
        let mut out = Map::new();
        out.insert(field_type::NAME.into(), Value::String(self.name.clone()));
        out.insert(
            field_type::TYPE.into(),
            Value::String(self.field_type().as_str().into()),
        );
        out.insert(field_type::REQUIRED.into(), Value::Bool(self.required));
        if let Some(description) = &self.description {
            out.insert(field_type::DESCRIPTION.into(), Value::String(description.clone()));
        }
        if let Some(default) = &self.default {
            out.insert(field_type::DEFAULT.into(), default.clone());
        }
        match &self.kind {
            FieldKind::String { pattern: Some(p) } => {
                out.insert(field_type::PATTERN.into(), Value::String(p.as_str().into()));
            }
            FieldKind::Enum { options } => {
                let options = options.iter().cloned().map(Value::String).collect();
                out.insert(field_type::OPTIONS.into(), Value::Array(options));
            }
            FieldKind::List { children } | FieldKind::Dict { children } => {
                let children = children.iter().map(FieldDescriptor::to_definition).collect();
                out.insert(field_type::CHILDREN.into(), Value::Array(children));
            }
            FieldKind::String { pattern: None } | FieldKind::Number | FieldKind::Boolean => {}
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code_pattern() -> Pattern {
        Pattern::new(r"^[A-Z]{3}-\d{3}$").unwrap()
    }

    #[test]
    fn pattern_matches_from_start_only() {
        let p = Pattern::new(r"\d+").unwrap();
        assert!(p.is_match("123abc"));
        assert!(!p.is_match("abc123"));
    }

    #[test]
    fn pattern_without_end_anchor_allows_trailing_text() {
        let p = Pattern::new("ab").unwrap();
        assert!(p.is_match("abc"));
        assert!(!p.is_match("cab"));
    }

    #[test]
    fn pattern_rejects_invalid_syntax() {
        assert!(Pattern::new("[unclosed").is_err());
    }

    #[test]
    fn patterns_compare_by_source() {
        assert_eq!(code_pattern(), code_pattern());
        assert_ne!(code_pattern(), Pattern::new("x").unwrap());
        assert_eq!(format!("{:?}", Pattern::new("x").unwrap()), "Pattern(\"x\")");
    }

    #[test]
    fn string_with_pattern_accepts() {
        let fd = FieldDescriptor::new(
            "id",
            FieldKind::String {
                pattern: Some(code_pattern()),
            },
        );
        assert!(fd.accepts(&json!("ABC-123")));
        assert!(!fd.accepts(&json!("abc123")));
        assert!(!fd.accepts(&json!(123)));
    }

    #[test]
    fn enum_accepts_only_options() {
        let fd = FieldDescriptor::new(
            "status",
            FieldKind::Enum {
                options: vec!["draft".into(), "final".into()],
            },
        );
        assert!(fd.accepts(&json!("draft")));
        assert!(!fd.accepts(&json!("Draft")));
        assert!(!fd.accepts(&json!(1)));
        assert_eq!(fd.options(), ["draft", "final"]);
    }

    #[test]
    fn accessors_for_leaf_and_container() {
        let leaf = FieldDescriptor::new("count", FieldKind::Number);
        assert!(leaf.children().is_empty());
        assert!(leaf.options().is_empty());
        assert!(leaf.pattern().is_none());

        let dict = FieldDescriptor::new(
            "owner",
            FieldKind::Dict {
                children: vec![leaf.clone()],
            },
        );
        assert_eq!(dict.field_type(), FieldType::Dict);
        assert_eq!(dict.child("count"), Some(&leaf));
        assert!(dict.child("missing").is_none());
    }

    #[test]
    fn effective_default_only_for_optional_fields() {
        let optional = FieldDescriptor::new("note", FieldKind::String { pattern: None })
            .with_required(false)
            .with_default(Some(json!("n/a")));
        assert_eq!(optional.effective_default(), Some(&json!("n/a")));

        let required = optional.clone().with_required(true);
        assert_eq!(required.default(), Some(&json!("n/a")));
        assert_eq!(required.effective_default(), None);
    }

    #[test]
    fn to_definition_writes_present_attributes() {
        let fd = FieldDescriptor::new(
            "steps",
            FieldKind::List {
                children: vec![FieldDescriptor::new("step-number", FieldKind::Number)],
            },
        )
        .with_required(false)
        .with_description(Some("Ordered steps".into()));

        assert_eq!(
            fd.to_definition(),
            json!({
                "name": "steps",
                "type": "list",
                "required": false,
                "description": "Ordered steps",
                "children": [
                    {"name": "step-number", "type": "number", "required": true}
                ]
            })
        );
    }
}
