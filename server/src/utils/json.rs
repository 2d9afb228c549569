//! JSON utility functions

use serde_json::{Map, Value as JsonValue};

/// Look up a dot-separated path (e.g. `"project.run_id"`) in a nested object
pub fn get_path<'a>(map: &'a Map<String, JsonValue>, path: &str) -> Option<&'a JsonValue> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Render a scalar as plain text. Strings are returned without quotes;
/// null, arrays and objects yield `None`.
pub fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Field lookup accepting either the camelCase or snake_case spelling
pub fn get_either<'a>(value: &'a JsonValue, camel: &str, snake: &str) -> Option<&'a JsonValue> {
    value.get(camel).or_else(|| value.get(snake))
}
