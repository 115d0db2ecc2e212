//! Restriction check for structural validation
//!
//! Verifies that an object's own properties are a subset of an allowed path
//! set. Non-strict mode treats sub-properties of an exactly-allowed property
//! as implicitly permitted without descending; strict mode descends whenever
//! deeper paths are declared for a property.

use serde_json::Value;

/// Returns true when every own property of `value` is covered by `allowed`.
///
/// Non-objects are trivially restricted. A property is covered when its name
/// matches an allowed path exactly, or when deeper allowed paths
/// (`name.sub`) exist and its value is recursively restricted to them. In
/// non-strict mode an exact match wins outright; in strict mode deeper
/// declared paths force descent even for an exactly-allowed name.
pub fn properties_restricted(value: &Value, allowed: &[&str], strict: bool) -> bool {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return true,
    };

    for (key, sub) in obj {
        let exact = allowed.iter().any(|p| p == key);
        let deeper = deeper_paths(allowed, key);

        if exact && (!strict || deeper.is_empty()) {
            continue;
        }
        if !deeper.is_empty() {
            if !properties_restricted(sub, &deeper, strict) {
                return false;
            }
            continue;
        }
        if !exact {
            return false;
        }
    }

    true
}

/// Allowed paths under `key`, with the `key.` prefix stripped.
fn deeper_paths<'a>(allowed: &[&'a str], key: &str) -> Vec<&'a str> {
    allowed
        .iter()
        .filter_map(|p| p.strip_prefix(key).and_then(|rest| rest.strip_prefix('.')))
        .collect()
}
