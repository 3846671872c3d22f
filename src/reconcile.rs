//! Merging freshly inferred shapes with values a user already entered.
//!
//! Re-running inference after a template edit must not throw away what was
//! typed into the generated form. The inferred shape decides which keys
//! exist; existing values fill them wherever the structure still fits.

use crate::shape::Shape;
use crate::table::VariableTable;
use serde_json::{Map, Value};

/// Reconcile one shape with the value previously stored for it.
///
/// * arrays: an existing array is kept whole, anything else yields the shape;
/// * objects: exactly the shape's keys, each reconciled against the existing
///   object's entry when there is one;
/// * scalars: the existing value, whatever its type, when present.
pub fn reconcile(shape: &Shape, existing: Option<&Value>) -> Value {
    match shape {
        Shape::Array(_) => match existing {
            Some(value @ Value::Array(_)) => value.clone(),
            _ => Value::from(shape),
        },
        Shape::Object(fields) => {
            let existing = existing.and_then(Value::as_object);
            let merged = fields
                .iter()
                .map(|(key, field)| {
                    let value = match existing.and_then(|obj| obj.get(key)) {
                        Some(previous) => reconcile(field, Some(previous)),
                        None => Value::from(field),
                    };
                    (key.clone(), value)
                })
                .collect();
            Value::Object(merged)
        }
        Shape::String(_) | Shape::Boolean(_) => match existing {
            Some(value) => value.clone(),
            None => Value::from(shape),
        },
    }
}

/// Reconcile a whole table. The result has exactly the table's names, in
/// table order; stale entries of `existing` are dropped.
pub fn reconcile_table(table: &VariableTable, existing: &Map<String, Value>) -> Map<String, Value> {
    table
        .iter()
        .map(|(name, shape)| (name.to_string(), reconcile(shape, existing.get(name))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::infer_variables;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_no_existing_values() {
        let table = infer_variables("{{ user.name }} {% if admin %}{% endif %}");
        let merged = reconcile_table(&table, &Map::new());
        assert_eq!(
            Value::Object(merged),
            json!({"user": {"name": ""}, "admin": true})
        );
    }

    #[test]
    fn test_keeps_user_values() {
        let table = infer_variables("{{ user.name }} {{ user.email }} {{ title }}");
        let existing = as_map(json!({"user": {"name": "Ada"}, "title": 42}));
        assert_eq!(
            Value::Object(reconcile_table(&table, &existing)),
            json!({"user": {"name": "Ada", "email": ""}, "title": 42})
        );
    }

    #[test]
    fn test_drops_stale_names_and_keys() {
        let table = infer_variables("{{ user.name }}");
        let existing = as_map(json!({"user": {"name": "Ada", "age": 36}, "old": "x"}));
        assert_eq!(
            Value::Object(reconcile_table(&table, &existing)),
            json!({"user": {"name": "Ada"}})
        );
    }

    #[test]
    fn test_existing_array_kept_whole() {
        let table = infer_variables("{% for t in tags %}{{ t }}{% endfor %}");
        let existing = as_map(json!({"tags": ["rust", "jinja", "json"]}));
        assert_eq!(
            reconcile_table(&table, &existing).get("tags"),
            Some(&json!(["rust", "jinja", "json"]))
        );
    }

    #[test]
    fn test_shape_change_prefers_new_structure() {
        let shape = Shape::Array(vec![Shape::empty()]);
        assert_eq!(reconcile(&shape, Some(&json!("was text"))), json!([""]));

        let table = infer_variables("{{ user.name }}");
        let existing = as_map(json!({"user": "plain"}));
        assert_eq!(
            Value::Object(reconcile_table(&table, &existing)),
            json!({"user": {"name": ""}})
        );
    }

    #[test]
    fn test_scalar_takes_any_existing_value() {
        assert_eq!(reconcile(&Shape::empty(), Some(&Value::Null)), Value::Null);
        assert_eq!(
            reconcile(&Shape::flag(), Some(&json!({"a": 1}))),
            json!({"a": 1})
        );
    }
}
