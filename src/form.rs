//! Input-field planning and write-back for variables shown as a form.

use serde_json::{Map, Number, Value};
use std::fmt;

/// Objects with more keys than this are edited as JSON instead of one
/// input per key.
const MAX_INLINE_KEYS: usize = 5;
/// Text longer than this gets a multi-line editor.
const LONG_TEXT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
    Boolean,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    TextInput,
    TextArea,
    NumberInput,
    Checkbox,
    JsonEditor,
}

/// One input the front end should render.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Dotted name used to write the value back, see [`set_nested_value`].
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub widget: Widget,
    pub value: Value,
    /// Nesting level, for indentation.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    InvalidNumber(String),
    InvalidBoolean(String),
    InvalidJson { input: String, reason: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::InvalidNumber(input) => write!(f, "'{}' is not a number", input),
            FormError::InvalidBoolean(input) => write!(f, "'{}' is not a boolean", input),
            FormError::InvalidJson { input, reason } => {
                write!(f, "invalid JSON {:.40?}: {}", input, reason)
            }
        }
    }
}

impl std::error::Error for FormError {}

/// The kind of input a value is edited with.
pub fn detect_kind(value: &Value) -> InputKind {
    match value {
        Value::Bool(_) => InputKind::Boolean,
        Value::Number(_) => InputKind::Number,
        Value::Object(_) | Value::Array(_) => InputKind::Json,
        Value::String(_) | Value::Null => InputKind::Text,
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Lay out inputs for every top-level variable of `values`, which is usually
/// an inferred table (`VariableTable::to_json_map`) or its reconciliation.
pub fn plan_form(values: &Map<String, Value>) -> Vec<FormField> {
    let mut fields = Vec::new();
    for (name, value) in values {
        fields_for(value, name, 0, &mut fields);
    }
    fields
}

fn fields_for(value: &Value, name: &str, depth: usize, out: &mut Vec<FormField>) {
    match value {
        Value::Array(_) => out.push(FormField {
            name: name.to_string(),
            label: format!("{} (Array)", name),
            kind: InputKind::Json,
            widget: Widget::JsonEditor,
            value: value.clone(),
            depth,
        }),
        Value::Object(map) if map.len() <= MAX_INLINE_KEYS && map.values().all(is_primitive) => {
            for (key, inner) in map {
                let full = if name.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", name, key)
                };
                let (kind, widget) = match inner {
                    Value::Bool(_) => (InputKind::Boolean, Widget::Checkbox),
                    _ => (InputKind::Text, Widget::TextInput),
                };
                out.push(FormField {
                    label: full.clone(),
                    name: full,
                    kind,
                    widget,
                    value: inner.clone(),
                    depth: depth + 1,
                });
            }
        }
        Value::Object(_) => out.push(FormField {
            name: name.to_string(),
            label: format!("{} (Object)", name),
            kind: InputKind::Json,
            widget: Widget::JsonEditor,
            value: value.clone(),
            depth,
        }),
        _ => {
            let kind = detect_kind(value);
            let widget = match (kind, value) {
                (InputKind::Boolean, _) => Widget::Checkbox,
                (InputKind::Number, _) => Widget::NumberInput,
                (_, Value::String(s)) if s.chars().count() > LONG_TEXT => Widget::TextArea,
                _ => Widget::TextInput,
            };
            out.push(FormField {
                name: name.to_string(),
                label: name.to_string(),
                kind,
                widget,
                value: value.clone(),
                depth,
            });
        }
    }
}

/// Write `value` into `context` at a dotted `path` such as `user.address.city`.
///
/// Intermediates that are missing or not containers become `{}`. An array
/// indexed by a decimal key is padded with `null` up to that index and
/// descended into; any other key replaces it with `{}`.
pub fn set_nested_value(context: &mut Map<String, Value>, path: &str, value: Value) {
    let keys: Vec<&str> = path.split('.').collect();
    let Some((first, rest)) = keys.split_first() else {
        return;
    };
    let slot = context.entry(first.to_string()).or_insert(Value::Null);
    assign(slot, rest, value);
}

fn assign(slot: &mut Value, keys: &[&str], value: Value) {
    let Some((key, rest)) = keys.split_first() else {
        *slot = value;
        return;
    };

    if let Value::Array(items) = slot {
        if let Ok(idx) = key.parse::<usize>() {
            if idx >= items.len() {
                items.resize(idx + 1, Value::Null);
            }
            assign(&mut items[idx], rest, value);
            return;
        }
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        let child = map.entry(key.to_string()).or_insert(Value::Null);
        assign(child, rest, value);
    }
}

/// Turn raw input text into a typed value for `kind`.
///
/// An empty number field stays `""` so clearing an input does not invent a
/// zero.
pub fn coerce_input(kind: InputKind, raw: &str) -> Result<Value, FormError> {
    match kind {
        InputKind::Text => Ok(Value::String(raw.to_string())),
        InputKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "checked" => Ok(Value::Bool(true)),
            "false" | "off" | "0" | "" => Ok(Value::Bool(false)),
            _ => Err(FormError::InvalidBoolean(raw.to_string())),
        },
        InputKind::Number => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Value::String(String::new()));
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| FormError::InvalidNumber(raw.to_string()))
        }
        InputKind::Json => serde_json::from_str(raw).map_err(|e| FormError::InvalidJson {
            input: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer_variables;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_plan_from_inferred_table() {
        let table = infer_variables(
            "{{ title }} {% if published %}{% endif %} {% for t in tags %}{% endfor %} {{ author.name }}",
        );
        let fields = plan_form(&table.to_json_map());

        let summary: Vec<_> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.widget, f.depth))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("title", Widget::TextInput, 0),
                ("author.name", Widget::TextInput, 1),
                ("tags", Widget::JsonEditor, 0),
                ("published", Widget::Checkbox, 0),
            ]
        );
        assert_eq!(fields[2].label, "tags (Array)");
    }

    #[test]
    fn test_large_or_nested_object_uses_json_editor() {
        let values = map(json!({
            "wide": {"a": "", "b": "", "c": "", "d": "", "e": "", "f": ""},
            "deep": {"inner": {"x": ""}},
        }));
        let fields = plan_form(&values);
        assert_eq!(fields.len(), 2);
        assert!(fields.iter().all(|f| f.widget == Widget::JsonEditor));
        assert_eq!(fields[1].label, "deep (Object)");
    }

    #[test]
    fn test_scalar_widgets() {
        let long = "x".repeat(LONG_TEXT + 1);
        let values = map(json!({"n": 3, "flag": false, "bio": long, "nothing": null}));
        let widgets: Vec<_> = plan_form(&values).into_iter().map(|f| f.widget).collect();
        assert_eq!(
            widgets,
            vec![
                Widget::NumberInput,
                Widget::Checkbox,
                Widget::TextArea,
                Widget::TextInput
            ]
        );
    }

    #[test]
    fn test_empty_object_has_no_fields() {
        assert!(plan_form(&map(json!({"empty": {}}))).is_empty());
    }

    #[test]
    fn test_set_nested_value() {
        let mut ctx = map(json!({"user": {"name": "Ada"}, "title": "x"}));
        set_nested_value(&mut ctx, "user.address.city", json!("Paris"));
        set_nested_value(&mut ctx, "title.main", json!("Hi"));
        set_nested_value(&mut ctx, "count", json!(3));
        assert_eq!(
            Value::Object(ctx),
            json!({
                "user": {"name": "Ada", "address": {"city": "Paris"}},
                "title": {"main": "Hi"},
                "count": 3
            })
        );
    }

    #[test]
    fn test_set_nested_value_into_array() {
        let mut ctx = map(json!({"rows": [{"id": 1}, {"id": 2}]}));
        set_nested_value(&mut ctx, "rows.1.id", json!(7));
        assert_eq!(ctx["rows"], json!([{"id": 1}, {"id": 7}]));

        set_nested_value(&mut ctx, "rows.3", json!("x"));
        assert_eq!(ctx["rows"], json!([{"id": 1}, {"id": 7}, null, "x"]));

        set_nested_value(&mut ctx, "rows.5.id", json!(9));
        assert_eq!(ctx["rows"][4], Value::Null);
        assert_eq!(ctx["rows"][5], json!({"id": 9}));

        set_nested_value(&mut ctx, "rows.first", json!(1));
        assert_eq!(ctx["rows"], json!({"first": 1}));
    }

    #[test]
    fn test_coerce_input() {
        assert_eq!(coerce_input(InputKind::Text, " a "), Ok(json!(" a ")));
        assert_eq!(coerce_input(InputKind::Boolean, "On"), Ok(json!(true)));
        assert_eq!(coerce_input(InputKind::Boolean, ""), Ok(json!(false)));
        assert_eq!(coerce_input(InputKind::Number, "42"), Ok(json!(42)));
        assert_eq!(coerce_input(InputKind::Number, "2.5"), Ok(json!(2.5)));
        assert_eq!(coerce_input(InputKind::Number, ""), Ok(json!("")));
        assert_eq!(
            coerce_input(InputKind::Json, r#"{"a": [1]}"#),
            Ok(json!({"a": [1]}))
        );
    }

    #[test]
    fn test_coerce_input_errors() {
        assert_eq!(
            coerce_input(InputKind::Number, "abc"),
            Err(FormError::InvalidNumber("abc".into()))
        );
        assert_eq!(
            coerce_input(InputKind::Number, "NaN"),
            Err(FormError::InvalidNumber("NaN".into()))
        );
        assert_eq!(
            coerce_input(InputKind::Boolean, "maybe"),
            Err(FormError::InvalidBoolean("maybe".into()))
        );
        let err = coerce_input(InputKind::Json, "{oops").unwrap_err();
        assert!(matches!(err, FormError::InvalidJson { .. }));
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
