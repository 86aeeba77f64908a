//! # Raw Value Helpers
//!
//! Schema definitions and documents reach the validators as
//! `serde_json::Value` trees, a tagged variant over
//! `Null | Bool | Number | String | Array | Object`. Validators pattern-match
//! over that variant instead of probing shapes dynamically.
//!
//! YAML documents use only the JSON-compatible subset of YAML, so they are
//! converted into the same model by [`yaml_to_json`] before validation.

use serde_json::Value;

use crate::error::CoreError;

/// Longest rendering of an offending value quoted in a violation message.
const MAX_RENDERED_LEN: usize = 60;

/// Short name of a value's shape, in schema vocabulary.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Compact rendering of a value for violation messages, truncated to a
/// bounded length so a large subtree never floods the report.
pub fn render(value: &Value) -> String {
    let text = match value {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    };
    if text.chars().count() <= MAX_RENDERED_LEN {
        text
    } else {
        let head: String = text.chars().take(MAX_RENDERED_LEN).collect();
        format!("{head}...")
    }
}

/// Returns the string content of `value` when it is a non-blank string.
pub fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Mapping keys that are strings, numbers or booleans become string keys.
/// YAML tags are dropped and the tagged value is converted in place.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedKey`] for sequence, mapping or null keys
/// and [`CoreError::NonFiniteNumber`] for NaN or infinite floats.
pub fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, CoreError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| CoreError::NonFiniteNumber(f.to_string()))
            } else {
                Err(CoreError::NonFiniteNumber(n.to_string()))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, CoreError> = seq.iter().map(yaml_to_json).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(CoreError::UnsupportedKey(format!("{other:?}"))),
                };
                json_map.insert(key, yaml_to_json(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
