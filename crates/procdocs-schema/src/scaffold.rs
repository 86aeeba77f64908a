//! # YAML Scaffold
//!
//! Renders a fill-in-the-blanks YAML document for a schema: the metadata
//! block is pre-filled, every field appears with a `<required>` or
//! `<optional>` placeholder, and an inline comment summarises the field's
//! type and constraints.
//!
//! ```yaml
//! ---
//! metadata:
//!   document_type: maintenance
//!   document_version: 0.0.0
//!   format_version: 0.0.1
//!
//! contents:
//!   id: <required>  # string. Pattern: ^[A-Z]{3}-\d{3}$
//!
//!   # Steps - list
//!   steps:
//!     # Example list: 'steps' shows 2 items.
//!     - step-number: <required>  # number
//!       step: <required>  # string
//!     - step-number: <required>  # number
//!       step: <required>  # string
//! ```

use std::collections::HashSet;
use std::io;
use std::path::Path;

use procdocs_core::constants::CONTENTS_KEY;
use procdocs_core::value::render;
use serde_json::Value;

use crate::descriptor::FieldDescriptor;
use crate::field_type::FieldType;
use crate::schema::Schema;

/// Example records rendered per list when the caller has no preference.
pub const DEFAULT_LIST_EXAMPLES: usize = 2;

const TOP_LEVEL_INDENT: usize = 2;

/// Render the scaffold. Lists show `max(1, list_examples)` example records.
pub fn render_yaml_template(schema: &Schema, list_examples: usize) -> String {
    let mut renderer = Renderer {
        list_examples: list_examples.max(1),
        noted_lists: HashSet::new(),
        lines: vec![
            "---".to_string(),
            "metadata:".to_string(),
            format!("  document_type: {}", scalar(schema.name())),
            "  document_version: 0.0.0".to_string(),
            format!("  format_version: {}", scalar(schema.format_version())),
            String::new(),
            format!("{CONTENTS_KEY}:"),
        ],
    };

    for fd in schema.structure() {
        renderer.field(fd, fd.name(), TOP_LEVEL_INDENT, Placement::Key);
    }

    let mut text = renderer.lines.join("\n");
    text.push('\n');
    text
}

/// Render the scaffold and write it to `path`, creating parent directories.
pub fn write_yaml_template(schema: &Schema, path: &Path, list_examples: usize) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_yaml_template(schema, list_examples))
}

/// Where a field's line sits relative to the enclosing structure.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Plain mapping key.
    Key,
    /// First key of a list record, carrying the `- ` bullet.
    ItemStart,
    /// Later key of a list record, aligned under the bullet.
    ItemRest,
}

struct Renderer {
    list_examples: usize,
    /// Lists that already carry their explanatory note, by dotted path.
    noted_lists: HashSet<String>,
    lines: Vec<String>,
}

impl Renderer {
    fn field(&mut self, fd: &FieldDescriptor, path: &str, indent: usize, placement: Placement) {
        let (prefix, child_indent) = match placement {
            Placement::Key => (" ".repeat(indent), indent + 2),
            Placement::ItemStart => (format!("{}- ", " ".repeat(indent)), indent + 4),
            Placement::ItemRest => (" ".repeat(indent + 2), indent + 4),
        };
        let comment = comment(fd);
        let key = scalar(fd.name());

        if fd.field_type().is_scalar() {
            let placeholder = if fd.is_required() { "<required>" } else { "<optional>" };
            self.lines
                .push(format!("{prefix}{key}: {placeholder}  # {comment}"));
            return;
        }

        if indent == TOP_LEVEL_INDENT && placement == Placement::Key {
            self.lines.push(String::new());
            self.lines
                .push(format!("{prefix}# {} - {comment}", single_line(&title(fd.name()))));
            self.lines.push(format!("{prefix}{key}:"));
        } else {
            self.lines.push(format!("{prefix}{key}:  # {comment}"));
        }

        match fd.field_type() {
            FieldType::Dict => {
                for child in fd.children() {
                    let child_path = format!("{path}.{}", child.name());
                    self.field(child, &child_path, child_indent, Placement::Key);
                }
            }
            FieldType::List => {
                if self.noted_lists.insert(path.to_string()) {
                    self.lines.push(format!(
                        "{}# Example list: '{}' shows {} items.",
                        " ".repeat(child_indent),
                        single_line(fd.name()),
                        self.list_examples
                    ));
                }
                for _ in 0..self.list_examples {
                    for (i, child) in fd.children().iter().enumerate() {
                        let child_path = format!("{path}.{}", child.name());
                        let placement = if i == 0 {
                            Placement::ItemStart
                        } else {
                            Placement::ItemRest
                        };
                        self.field(child, &child_path, child_indent, placement);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Inline summary: type, optionality, description, default and the
/// type-specific constraint.
fn comment(fd: &FieldDescriptor) -> String {
    let mut parts = vec![fd.field_type().as_str().to_string()];
    if !fd.is_required() {
        parts.push("optional".into());
    }
    if let Some(description) = fd.description().filter(|d| !d.trim().is_empty()) {
        parts.push(description.trim().to_string());
    }
    if let Some(default) = fd.effective_default() {
        parts.push(format!("Default = {}", render(default)));
    }
    if let Some(pattern) = fd.pattern() {
        parts.push(format!("Pattern: {pattern}"));
    }
    if !fd.options().is_empty() {
        parts.push(format!("Options: {}", fd.options().join(", ")));
    }
    single_line(&parts.join(". "))
}

/// A YAML scalar that reads back as exactly `text`: plain when that is
/// unambiguous, double-quoted otherwise.
fn scalar(text: &str) -> String {
    if is_plain(text) {
        text.to_string()
    } else {
        Value::from(text).to_string()
    }
}

fn is_plain(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphanumeric() || first == '_')
        && !text.ends_with(' ')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ' | '/'))
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(text),
            Ok(serde_yaml::Value::String(ref parsed)) if parsed == text
        )
}

/// Comments end at the line break, so line breaks become spaces.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// `step-number` becomes `Step Number`.
fn title(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use procdocs_core::value::yaml_to_json;
    use std::collections::BTreeSet;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_definition(&json!({
            "metadata": {"schema_name": "maintenance", "format_version": "0.0.1"},
            "structure": [
                {"name": "id", "pattern": "^[A-Z]{3}-\\d{3}$"},
                {"name": "status", "type": "enum", "options": ["open", "closed"], "required": false, "default": "open"},
                {"name": "owner", "type": "dict", "description": "Responsible person", "children": [
                    {"name": "email"}
                ]},
                {"name": "steps", "type": "list", "children": [
                    {"name": "step-number", "type": "number"},
                    {"name": "step"},
                    {"name": "checks", "type": "list", "required": false, "children": [
                        {"name": "check"}
                    ]}
                ]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn header_and_metadata_block() {
        let text = render_yaml_template(&schema(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            &lines[..7],
            &[
                "---",
                "metadata:",
                "  document_type: maintenance",
                "  document_version: 0.0.0",
                "  format_version: 0.0.1",
                "",
                "contents:",
            ]
        );
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn scalar_lines_carry_placeholder_and_comment() {
        let text = render_yaml_template(&schema(), 1);
        assert!(text.contains("  id: <required>  # string. Pattern: ^[A-Z]{3}-\\d{3}$\n"));
        assert!(text.contains(
            "  status: <optional>  # enum. optional. Default = 'open'. Options: open, closed\n"
        ));
        assert!(text.contains("  # Owner - dict. Responsible person\n  owner:\n    email: <required>"));
    }

    #[test]
    fn output_is_parseable_yaml_with_example_records() {
        let text = render_yaml_template(&schema(), 3);
        let yaml: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let doc = yaml_to_json(&yaml).unwrap();

        assert_eq!(doc["metadata"]["document_type"], "maintenance");
        let steps = doc["contents"]["steps"].as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["step"], "<required>");
        assert_eq!(steps[0]["checks"].as_array().map(Vec::len), Some(3));
        assert_eq!(doc["contents"]["owner"]["email"], "<required>");
    }

    #[test]
    fn list_note_is_written_once_per_list() {
        let text = render_yaml_template(&schema(), 2);
        assert_eq!(text.matches("# Example list: 'steps'").count(), 1);
        assert_eq!(text.matches("# Example list: 'checks'").count(), 1);
    }

    #[test]
    fn at_least_one_example_record() {
        let text = render_yaml_template(&schema(), 0);
        assert!(text.contains("# Example list: 'steps' shows 1 items."));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/template.yaml");
        write_yaml_template(&schema(), &path, 1).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_yaml_template(&schema(), 1));
    }

    #[test]
    fn awkward_names_and_descriptions_read_back_unchanged() {
        let schema = Schema::from_definition(&json!({
            "metadata": {"schema_name": "maintenance", "format_version": "0.0.1"},
            "structure": [
                {"name": "a: b", "description": "First line\nsecond: line"},
                {"name": "ref #1", "type": "enum", "options": ["x: y", "z"]},
                {"name": "true", "required": false, "default": "multi\r\nline"},
                {"name": "items", "type": "list", "description": "one\ntwo", "children": [
                    {"name": "- item"},
                    {"name": "say \"hi\""}
                ]}
            ]
        }))
        .unwrap();

        let text = render_yaml_template(&schema, 2);
        assert!(text.contains("  \"a: b\": <required>  # string. First line second: line\n"));

        let yaml: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let doc = yaml_to_json(&yaml).unwrap();
        let keys = |v: &serde_json::Value| -> BTreeSet<String> {
            v.as_object().unwrap().keys().cloned().collect()
        };

        assert_eq!(
            keys(&doc),
            BTreeSet::from(["metadata".to_string(), "contents".to_string()])
        );
        assert_eq!(
            keys(&doc["contents"]),
            BTreeSet::from([
                "a: b".to_string(),
                "ref #1".to_string(),
                "true".to_string(),
                "items".to_string(),
            ])
        );
        let items = doc["contents"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            keys(&items[1]),
            BTreeSet::from(["- item".to_string(), "say \"hi\"".to_string()])
        );
    }

    #[test]
    fn schema_name_and_version_stay_strings() {
        let schema = Schema::from_definition(&json!({
            "metadata": {"schema_name": "2024", "format_version": "1.0"},
            "structure": [{"name": "id"}]
        }))
        .unwrap();

        let text = render_yaml_template(&schema, 1);
        assert!(text.contains("  document_type: \"2024\"\n"));
        let yaml: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        let doc = yaml_to_json(&yaml).unwrap();
        assert_eq!(doc["metadata"]["document_type"], "2024");
        assert_eq!(doc["metadata"]["format_version"], "1.0");
    }

    #[test]
    fn plain_scalars_only_when_unambiguous() {
        assert_eq!(scalar("step-number"), "step-number");
        assert_eq!(scalar("0.0.1"), "0.0.1");
        assert_eq!(scalar("null"), "\"null\"");
        assert_eq!(scalar("12"), "\"12\"");
        assert_eq!(scalar("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn title_case_of_field_names() {
        assert_eq!(title("step-number"), "Step Number");
        assert_eq!(title("owner"), "Owner");
        assert_eq!(title("safety_CHECKS"), "Safety Checks");
    }
}
