//! Dotted-path flattening and lookup for JSON objects

use serde_json::Value;

/// Flattens a nested JSON object into `(dotted path, leaf value)` pairs.
///
/// Key order is preserved. Arrays and scalars are leaves; only objects are
/// descended into. Empty objects produce no entries.
pub fn obj_to_dot(value: &Value) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten(value, "", &mut out);
    out
}

fn flatten(value: &Value, prefix: &str, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, sub) in map {
                let path = join_path(prefix, key);
                if sub.is_object() {
                    flatten(sub, &path, out);
                } else {
                    out.push((path, sub.clone()));
                }
            }
        }
        _ if !prefix.is_empty() => out.push((prefix.to_string(), value.clone())),
        _ => {}
    }
}

/// Looks up a value by dotted path.
///
/// Returns `None` when any segment is absent or a non-object is reached
/// before the path is exhausted. Absence is not an error here; callers
/// decide what a missing path means.
pub fn find_by_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Joins a path prefix with a segment, skipping the dot for empty prefixes.
pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_object() {
        let value = json!({
            "name": "Ann",
            "address": {
                "city": "Miami",
                "zip": 33129
            }
        });

        let flat = obj_to_dot(&value);
        assert_eq!(
            flat,
            vec![
                ("name".to_string(), json!("Ann")),
                ("address.city".to_string(), json!("Miami")),
                ("address.zip".to_string(), json!(33129)),
            ]
        );
    }

    #[test]
    fn test_flatten_treats_arrays_as_leaves() {
        let value = json!({ "tags": ["a", "b"], "meta": { "ids": [1, 2] } });
        let flat = obj_to_dot(&value);
        assert_eq!(
            flat,
            vec![
                ("tags".to_string(), json!(["a", "b"])),
                ("meta.ids".to_string(), json!([1, 2])),
            ]
        );
    }

    #[test]
    fn test_flatten_scalar_has_no_entries() {
        assert!(obj_to_dot(&json!("plain")).is_empty());
        assert!(obj_to_dot(&json!({})).is_empty());
    }

    #[test]
    fn test_find_by_path() {
        let value = json!({ "address": { "city": "Miami" } });

        assert_eq!(find_by_path(&value, "address.city"), Some(&json!("Miami")));
        assert_eq!(find_by_path(&value, "address"), Some(&json!({ "city": "Miami" })));
        assert_eq!(find_by_path(&value, ""), Some(&value));
    }

    #[test]
    fn test_find_by_path_absent() {
        let value = json!({ "address": { "city": "Miami" } });

        assert_eq!(find_by_path(&value, "address.zip"), None);
        assert_eq!(find_by_path(&value, "address.city.block"), None);
        assert_eq!(find_by_path(&value, "missing"), None);
        assert_eq!(find_by_path(&json!(42), "anything"), None);
    }
}
