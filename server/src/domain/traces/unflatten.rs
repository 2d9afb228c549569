//! Unflatten dotted attribute keys into a nested tree.
//!
//! `{"output.usage.input_tokens": 12}` becomes
//! `{"output": {"usage": {"input_tokens": 12}}}`.
//!
//! Collisions resolve in favour of the deeper key, whatever the input order:
//! - a scalar sitting on a path prefix is replaced by an object when a longer
//!   key passes through it
//! - a scalar landing on an existing object is discarded
//! - two objects landing on the same node are merged
//! - two scalars on the same node: the later one wins
//!
//! Numeric segments are ordinary object keys; no arrays are created.

use serde_json::{Map, Value as JsonValue};

use super::types::Attributes;

/// Build a nested tree from a flat dotted-key map
pub fn unflatten_attributes(flat: Attributes) -> Attributes {
    let mut root = Attributes::new();
    for (key, value) in flat {
        insert_path(&mut root, &key, value);
    }
    root
}

fn insert_path(root: &mut Map<String, JsonValue>, path: &str, value: JsonValue) {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            match current.get_mut(segment) {
                Some(existing) => merge_value(existing, value, path),
                None => {
                    current.insert(segment.to_string(), value);
                }
            }
            return;
        }

        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !entry.is_object() {
            tracing::debug!(key = path, "Replacing scalar attribute with nested object");
            *entry = JsonValue::Object(Map::new());
        }
        let JsonValue::Object(next) = entry else {
            return;
        };
        current = next;
    }
}

fn merge_value(slot: &mut JsonValue, incoming: JsonValue, path: &str) {
    match (slot, incoming) {
        (JsonValue::Object(existing), JsonValue::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(child) => merge_value(child, value, path),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (JsonValue::Object(_), _) => {
            tracing::debug!(key = path, "Dropping scalar attribute shadowed by nested keys");
        }
        (slot, incoming) => *slot = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: JsonValue) -> Attributes {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_unflatten_siblings() {
        let result = unflatten_attributes(flat(json!({"a.b": 1, "a.c": "x"})));
        assert_eq!(JsonValue::Object(result), json!({"a": {"b": 1, "c": "x"}}));
    }

    #[test]
    fn test_unflatten_plain_keys_untouched() {
        let result = unflatten_attributes(flat(json!({"name": "n", "count": 3})));
        assert_eq!(JsonValue::Object(result), json!({"name": "n", "count": 3}));
    }

    #[test]
    fn test_unflatten_deep_path() {
        let result = unflatten_attributes(flat(json!({"output.usage.input_tokens": 12})));
        assert_eq!(
            JsonValue::Object(result),
            json!({"output": {"usage": {"input_tokens": 12}}})
        );
    }

    #[test]
    fn test_unflatten_numeric_segments_are_keys() {
        let result = unflatten_attributes(flat(json!({"messages.0.role": "user"})));
        assert_eq!(
            JsonValue::Object(result),
            json!({"messages": {"0": {"role": "user"}}})
        );
    }

    #[test]
    fn test_collision_deeper_key_wins_in_either_order() {
        let forward = unflatten_attributes(flat(json!({"a.b": 1, "a.b.c": 2})));
        let reverse = unflatten_attributes(flat(json!({"a.b.c": 2, "a.b": 1})));
        let expected = json!({"a": {"b": {"c": 2}}});
        assert_eq!(JsonValue::Object(forward), expected);
        assert_eq!(JsonValue::Object(reverse), expected);
    }

    #[test]
    fn test_collision_object_leaf_merges() {
        let forward = unflatten_attributes(flat(json!({"a": {"x": 1}, "a.b": 2})));
        let reverse = unflatten_attributes(flat(json!({"a.b": 2, "a": {"x": 1}})));
        let expected = json!({"a": {"x": 1, "b": 2}});
        assert_eq!(JsonValue::Object(forward), expected);
        assert_eq!(JsonValue::Object(reverse), expected);
    }

    #[test]
    fn test_empty_segments_kept() {
        let result = unflatten_attributes(flat(json!({"a..b": 1, ".c": 2})));
        assert_eq!(
            JsonValue::Object(result),
            json!({"a": {"": {"b": 1}}, "": {"c": 2}})
        );
    }
}
