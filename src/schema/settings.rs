//! Node settings and the three-tier merge
//!
//! Every node owns exactly one immutable `Settings` record, produced at
//! construction by merging, lowest precedence first:
//! 1. built-in defaults (`required = true`, `allowNull = false`,
//!    `autoCast = false`, no default value)
//! 2. the matched transformer's declared defaults
//! 3. the node's explicit settings (with the `type` key already dropped)
//!
//! Settings are never inherited top-down; each child owns its own record.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::errors::{ParseResult, SchemaError, SchemaResult};
use super::node::Schema;

/// Node-level cast hook: best-effort reshaping, runs before the
/// transformer's cast, unconditionally.
pub type CastHook = dyn Fn(Value, &Schema) -> Value + Send + Sync;

/// Node-level validate hook: runs after the transformer's validate.
pub type ValidateHook = dyn Fn(&Value, &Schema) -> ParseResult<()> + Send + Sync;

/// Computed default: evaluated with the node as receiver when the value is
/// absent.
pub type DefaultFn = dyn Fn(&Schema) -> Value + Send + Sync;

/// The required flag, optionally carrying a custom message template.
///
/// Declaratively this is `true`, `false`, or an `[enabled, message]` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub enabled: bool,
    pub message: Option<String>,
}

impl Requirement {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(enabled) => Some(Self {
                enabled: *enabled,
                message: None,
            }),
            Value::Array(pair) if pair.len() <= 2 => {
                let enabled = pair.first()?.as_bool()?;
                let message = match pair.get(1) {
                    Some(Value::String(message)) => Some(message.clone()),
                    Some(_) => return None,
                    None => None,
                };
                Some(Self { enabled, message })
            }
            _ => None,
        }
    }
}

/// A configured default value: fixed, or computed from the node.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Computed(Arc<DefaultFn>),
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// The merged, immutable configuration of one schema node.
#[derive(Clone)]
pub struct Settings {
    pub required: Requirement,
    pub allow_null: bool,
    pub auto_cast: bool,
    pub default: Option<DefaultValue>,
    pub cast: Option<Arc<CastHook>>,
    pub validate: Option<Arc<ValidateHook>>,
    /// Per-type options (minlength, enum, arraySchema, loaders, error
    /// message templates, ...), read by transformers.
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Merges the three tiers into one record.
    ///
    /// Rejects a node that explicitly declares both `required: true` and a
    /// default value; that combination is an authoring bug.
    pub(crate) fn merge(
        transformer_defaults: &Map<String, Value>,
        user: &Map<String, Value>,
        default_fn: Option<Arc<DefaultFn>>,
        cast: Option<Arc<CastHook>>,
        validate: Option<Arc<ValidateHook>>,
        path: &str,
    ) -> SchemaResult<Self> {
        let explicit_required = match user.get("required") {
            Some(value) => Some(Requirement::from_value(value).ok_or_else(|| {
                SchemaError::invalid_description(
                    path,
                    "'required' must be a boolean or an [enabled, message] pair",
                )
            })?),
            None => None,
        };
        let explicit_default = user.contains_key("default") || default_fn.is_some();
        if explicit_default && explicit_required.as_ref().map_or(false, |r| r.enabled) {
            return Err(SchemaError::required_and_default(path));
        }

        let mut layered = transformer_defaults.clone();
        for (key, value) in user {
            layered.insert(key.clone(), value.clone());
        }

        let required = match layered.get("required") {
            Some(value) => Requirement::from_value(value).ok_or_else(|| {
                SchemaError::invalid_description(
                    path,
                    "'required' must be a boolean or an [enabled, message] pair",
                )
            })?,
            None => Requirement {
                enabled: true,
                message: None,
            },
        };
        let allow_null = bool_setting(&layered, "allowNull", false, path)?;
        let auto_cast = bool_setting(&layered, "autoCast", false, path)?;

        let default = match default_fn {
            Some(f) => Some(DefaultValue::Computed(f)),
            None => layered
                .get("default")
                .map(|value| DefaultValue::Literal(value.clone())),
        };

        let mut extra = layered;
        for consumed in ["required", "allowNull", "autoCast", "default", "type"] {
            extra.remove(consumed);
        }

        Ok(Self {
            required,
            allow_null,
            auto_cast,
            default,
            cast,
            validate,
            extra,
        })
    }

    /// A message template from the extra options, falling back to the
    /// built-in text.
    pub fn template<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
    }

    pub fn str_option(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    pub fn u64_option(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }

    pub fn f64_option(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    pub fn array_option(&self, key: &str) -> Option<&Vec<Value>> {
        self.extra.get(key).and_then(Value::as_array)
    }

    pub fn value_option(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("required", &self.required)
            .field("allow_null", &self.allow_null)
            .field("auto_cast", &self.auto_cast)
            .field("default", &self.default)
            .field("cast", &self.cast.is_some())
            .field("validate", &self.validate.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

fn bool_setting(
    layered: &Map<String, Value>,
    key: &str,
    fallback: bool,
    path: &str,
) -> SchemaResult<bool> {
    match layered.get(key) {
        Some(Value::Bool(value)) => Ok(*value),
        Some(_) => Err(SchemaError::invalid_description(
            path,
            format!("'{}' must be a boolean", key),
        )),
        None => Ok(fallback),
    }
}
