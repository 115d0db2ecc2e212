//! Message template rendering
//!
//! Error messages throughout the engine are configurable templates such as
//! `"Property {field.fullPath} is required"`. Rendering substitutes each
//! `{placeholder}` token from a flat property map; unknown placeholders
//! render as empty text so a bad template never aborts error reporting.

use std::collections::BTreeMap;

/// Interpolates `{placeholder}` tokens in `template` from `props`.
///
/// A `{` without a closing `}` is emitted verbatim.
pub fn render(template: &str, props: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close) => {
                let key = &rest[open + 1..open + close];
                if let Some(value) = props.get(key) {
                    out.push_str(value);
                }
                rest = &rest[open + close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}
