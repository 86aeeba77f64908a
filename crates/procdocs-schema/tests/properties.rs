//! # Generated-Schema Properties
//!
//! Property tests over randomly generated, well-formed schema trees:
//!
//! - every well-formed definition compiles, and the compiled structure has
//!   the same names, types and nesting as the definition;
//! - a document holding only the required fields validates, and every
//!   omitted optional field comes back with its declared default;
//! - re-validating a validated document changes nothing;
//! - an `enum` without options, or a repeated sibling name, is always
//!   reported at the offending path.

use procdocs_schema::{FieldDescriptor, FieldType, Schema, ViolationKind};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Generated schema model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum GenKind {
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
    List(Vec<GenField>),
    Dict(Vec<GenField>),
}

#[derive(Debug, Clone)]
struct GenField {
    kind: GenKind,
    required: bool,
    with_default: bool,
}

impl GenKind {
    fn field_type(&self) -> FieldType {
        match self {
            GenKind::String => FieldType::String,
            GenKind::Number => FieldType::Number,
            GenKind::Boolean => FieldType::Boolean,
            GenKind::Enum(_) => FieldType::Enum,
            GenKind::List(_) => FieldType::List,
            GenKind::Dict(_) => FieldType::Dict,
        }
    }
}

fn field_name(index: usize) -> String {
    format!("field-{index}")
}

fn leaf_kind() -> impl Strategy<Value = GenKind> {
    prop_oneof![
        Just(GenKind::String),
        Just(GenKind::Number),
        Just(GenKind::Boolean),
        prop::collection::btree_set("[a-z]{1,6}", 1..4)
            .prop_map(|options| GenKind::Enum(options.into_iter().collect())),
    ]
}

fn gen_field() -> impl Strategy<Value = GenField> {
    let leaf = (leaf_kind(), any::<bool>(), any::<bool>()).prop_map(
        |(kind, required, with_default)| GenField {
            kind,
            required,
            with_default,
        },
    );
    leaf.prop_recursive(
        3,  // depth
        24, // desired size
        4,  // children per container
        |inner| {
            (prop::collection::vec(inner, 1..4), any::<bool>(), any::<bool>()).prop_map(
                |(children, is_list, required)| GenField {
                    kind: if is_list {
                        GenKind::List(children)
                    } else {
                        GenKind::Dict(children)
                    },
                    required,
                    with_default: false,
                },
            )
        },
    )
}

fn gen_structure() -> impl Strategy<Value = Vec<GenField>> {
    prop::collection::vec(gen_field(), 0..5)
}

// ---------------------------------------------------------------------------
// Rendering generated models
// ---------------------------------------------------------------------------

fn default_for(kind: &GenKind) -> Option<Value> {
    match kind {
        GenKind::String => Some(json!("fallback")),
        GenKind::Number => Some(json!(7)),
        GenKind::Boolean => Some(json!(false)),
        GenKind::Enum(options) => options.first().map(|o| json!(o)),
        GenKind::List(_) | GenKind::Dict(_) => None,
    }
}

fn descriptors(fields: &[GenField]) -> Value {
    let items = fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let mut d = Map::new();
            d.insert("name".into(), json!(field_name(i)));
            d.insert("type".into(), json!(f.kind.field_type().as_str()));
            d.insert("required".into(), json!(f.required));
            if f.with_default {
                if let Some(default) = default_for(&f.kind) {
                    d.insert("default".into(), default);
                }
            }
            match &f.kind {
                GenKind::Enum(options) => {
                    d.insert("options".into(), json!(options));
                }
                GenKind::List(children) | GenKind::Dict(children) => {
                    d.insert("children".into(), descriptors(children));
                }
                _ => {}
            }
            Value::Object(d)
        })
        .collect();
    Value::Array(items)
}

fn definition(fields: &[GenField]) -> Value {
    json!({
        "metadata": {"schema_name": "generated", "format_version": "0.0.1"},
        "structure": descriptors(fields)
    })
}

/// Contents holding every required field and omitting every optional one.
fn required_only(fields: &[GenField]) -> Map<String, Value> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.required)
        .map(|(i, f)| {
            let value = match &f.kind {
                GenKind::String => json!("text"),
                GenKind::Number => json!(1),
                GenKind::Boolean => json!(true),
                GenKind::Enum(options) => json!(options.last()),
                GenKind::Dict(children) => Value::Object(required_only(children)),
                GenKind::List(children) => json!([Value::Object(required_only(children))]),
            };
            (field_name(i), value)
        })
        .collect()
}

fn document(contents: Map<String, Value>) -> Value {
    json!({
        "metadata": {"document_type": "generated", "format_version": "0.0.1"},
        "contents": Value::Object(contents)
    })
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn same_shape(generated: &[GenField], compiled: &[FieldDescriptor]) -> Result<(), String> {
    if generated.len() != compiled.len() {
        return Err(format!("{} fields generated, {} compiled", generated.len(), compiled.len()));
    }
    for (i, (g, c)) in generated.iter().zip(compiled).enumerate() {
        if c.name() != field_name(i) {
            return Err(format!("expected name {}, got {}", field_name(i), c.name()));
        }
        if c.field_type() != g.kind.field_type() || c.is_required() != g.required {
            return Err(format!("field {} differs", c.name()));
        }
        match &g.kind {
            GenKind::Enum(options) if options.as_slice() != c.options() => {
                return Err(format!("options of {} differ", c.name()));
            }
            GenKind::List(children) | GenKind::Dict(children) => {
                same_shape(children, c.children())?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn defaults_applied(fields: &[GenField], contents: &Map<String, Value>) -> Result<(), String> {
    for (i, f) in fields.iter().enumerate() {
        let name = field_name(i);
        let value = contents.get(&name);
        if f.required {
            match (&f.kind, value) {
                (GenKind::Dict(children), Some(Value::Object(map))) => defaults_applied(children, map)?,
                (GenKind::List(children), Some(Value::Array(items))) => {
                    for item in items {
                        let record = item.as_object().ok_or("list element is not a dict")?;
                        defaults_applied(children, record)?;
                    }
                }
                (_, Some(_)) => {}
                (_, None) => return Err(format!("required field {name} disappeared")),
            }
            continue;
        }
        let expected = if f.with_default { default_for(&f.kind) } else { None };
        if value != expected.as_ref() {
            return Err(format!("optional field {name}: expected {expected:?}, got {value:?}"));
        }
    }
    Ok(())
}

proptest! {
    /// Well-formed definitions compile to a structurally identical tree.
    #[test]
    fn compiled_structure_mirrors_definition(fields in gen_structure()) {
        let schema = Schema::from_definition(&definition(&fields));
        prop_assert!(schema.is_ok(), "compile failed: {:?}", schema.err());
        let schema = schema.unwrap();
        prop_assert_eq!(same_shape(&fields, schema.structure()), Ok(()));
    }

    /// Compiling the rendered definition of a compiled schema is lossless.
    #[test]
    fn to_definition_is_lossless(fields in gen_structure()) {
        let schema = Schema::from_definition(&definition(&fields)).unwrap();
        let again = Schema::from_definition(&schema.to_definition()).unwrap();
        prop_assert_eq!(again, schema);
    }

    /// Omitted optional fields receive their declared defaults; optional
    /// fields without one stay absent.
    #[test]
    fn omitted_optional_fields_receive_defaults(fields in gen_structure()) {
        let schema = Schema::from_definition(&definition(&fields)).unwrap();
        let validated = schema.validate_document(&document(required_only(&fields)));
        prop_assert!(validated.is_ok(), "validation failed: {:?}", validated.err());
        let validated = validated.unwrap();
        prop_assert_eq!(defaults_applied(&fields, &validated.contents), Ok(()));
    }

    /// Validating an already validated document is a no-op.
    #[test]
    fn validation_is_idempotent(fields in gen_structure()) {
        let schema = Schema::from_definition(&definition(&fields)).unwrap();
        let first = schema.validate_document(&document(required_only(&fields))).unwrap();
        let second = schema.validate_document(&first.clone().into_value());
        prop_assert!(second.is_ok(), "second pass failed: {:?}", second.err());
        prop_assert_eq!(second.unwrap(), first);
    }

    /// An enum with absent or empty options is reported at its own path.
    #[test]
    fn enum_without_options_is_reported(fields in gen_structure(), empty in any::<bool>()) {
        let mut def = definition(&fields);
        let mut broken = json!({"name": "broken", "type": "enum"});
        if empty {
            broken["options"] = json!([]);
        }
        def["structure"].as_array_mut().unwrap().push(broken);

        let violations = procdocs_schema::MetaSchemaValidator::new().check(&def);
        let at_field: Vec<_> = violations
            .iter()
            .filter(|v| v.path.to_string() == "structure.broken")
            .map(|v| v.kind)
            .collect();
        prop_assert_eq!(at_field, vec![ViolationKind::InvalidAttributeForType]);
    }

    /// Repeating a sibling name is reported as a duplicate at that level.
    #[test]
    fn repeated_sibling_name_is_reported(fields in gen_structure().prop_filter("non-empty", |f| !f.is_empty())) {
        let mut def = definition(&fields);
        let structure = def["structure"].as_array_mut().unwrap();
        let copy = structure[0].clone();
        structure.push(copy);

        let violations = procdocs_schema::MetaSchemaValidator::new().check(&def);
        let duplicates = violations.of_kind(ViolationKind::DuplicateFieldName);
        prop_assert_eq!(duplicates.len(), 1);
        prop_assert_eq!(duplicates[0].path.to_string(), "structure.field-0");
    }
}
