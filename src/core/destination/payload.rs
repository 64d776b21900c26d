//! Payload pruning

use serde_json::{Map, Value};

/// Removes empty entries from every object in a payload
///
/// An entry is removed when its value, after pruning, is null, an empty
/// string, an empty array, or an empty object. Array elements are pruned
/// recursively but never removed, so positional rows keep their shape.
///
/// # Examples
///
/// ```
/// use dmp_sync::core::destination::prune_empty;
/// use serde_json::json;
///
/// let pruned = prune_empty(json!({"name": "Sample", "description": "", "data": [[[], ["x"]]]}));
/// assert_eq!(pruned, json!({"name": "Sample", "data": [[[], ["x"]]]}));
/// ```
pub fn prune_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, prune_empty(value)))
                .filter(|(_, value)| !is_empty(value))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_empty).collect()),
        other => other,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
