//! Date transformer
//!
//! Dates travel as RFC 3339 strings in the JSON value domain. The default
//! `autoCast` canonicalizes plain `YYYY-MM-DD` dates to midnight UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};

use super::{violation, Transformer};
use crate::schema::{ParseResult, Schema, Settings};

pub struct DateTransformer;

impl Transformer for DateTransformer {
    fn default_settings(&self) -> Map<String, Value> {
        let mut defaults = Map::new();
        defaults.insert("autoCast".into(), json!(true));
        defaults.insert("typeError".into(), json!("Invalid date"));
        defaults
    }

    fn cast(&self, value: Value, _node: &Schema, _settings: &Settings) -> Value {
        if let Value::String(text) = &value {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Value::String(parsed.to_rfc3339());
            }
            if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    let midnight = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
                    return Value::String(midnight.to_rfc3339());
                }
            }
        }
        value
    }

    fn validate(&self, value: &Value, node: &Schema, settings: &Settings) -> ParseResult<()> {
        let valid = value
            .as_str()
            .map(|text| DateTime::parse_from_rfc3339(text).is_ok())
            .unwrap_or(false);
        if valid {
            Ok(())
        } else {
            Err(violation(node, settings, "typeError", "Invalid date", value, &[]))
        }
    }
}
