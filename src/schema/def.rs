//! Declarative schema descriptions
//!
//! A schema is described by one of four shapes, classified exactly once at
//! construction time:
//! - a bare type reference (`"string"`), possibly a union (`["string",
//!   "number"]`, ordered candidates)
//! - a settings object (`{ "type": "string", "minlength": 3 }`)
//! - a plain nested mapping with no `type` key (one child per property, in
//!   declaration order)
//! - an existing `Schema`, embedded by deep copy (never by aliasing)
//!
//! JSON descriptions cover everything except hooks and computed defaults;
//! those attach through the builder methods.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};
use super::node::Schema;
use super::settings::{CastHook, DefaultFn, ValidateHook};
use crate::utils::join_path;

/// A leaf type reference: one transformer name, or an ordered list of
/// candidates resolved first-match-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Single(String),
    Union(Vec<String>),
}

impl TypeSpec {
    /// Candidate type names, in trial order.
    pub fn names(&self) -> &[String] {
        match self {
            TypeSpec::Single(name) => std::slice::from_ref(name),
            TypeSpec::Union(names) => names,
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, TypeSpec::Union(_))
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Single(name) => write!(f, "{}", name),
            TypeSpec::Union(names) => write!(f, "[{}]", names.join(", ")),
        }
    }
}

/// A leaf description: type reference plus per-type and common options,
/// with optional programmatic hooks.
#[derive(Clone)]
pub struct SettingsDef {
    pub type_spec: TypeSpec,
    pub options: Map<String, Value>,
    pub default_fn: Option<Arc<DefaultFn>>,
    pub cast: Option<Arc<CastHook>>,
    pub validate: Option<Arc<ValidateHook>>,
}

impl SettingsDef {
    fn new(type_spec: TypeSpec) -> Self {
        Self {
            type_spec,
            options: Map::new(),
            default_fn: None,
            cast: None,
            validate: None,
        }
    }
}

impl fmt::Debug for SettingsDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsDef")
            .field("type_spec", &self.type_spec)
            .field("options", &self.options)
            .field("default_fn", &self.default_fn.is_some())
            .field("cast", &self.cast.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// The closed set of schema description shapes.
#[derive(Clone)]
pub enum SchemaDef {
    /// Bare type reference.
    Type(TypeSpec),
    /// Settings object: type reference plus options.
    Settings(Box<SettingsDef>),
    /// Nested mapping, children in declaration order.
    Nested(Vec<(String, SchemaDef)>),
    /// An existing schema embedded by deep copy.
    Reference(Box<Schema>),
}

impl SchemaDef {
    /// A leaf of the given type with no options yet.
    pub fn of_type(name: impl Into<String>) -> Self {
        SchemaDef::Settings(Box::new(SettingsDef::new(TypeSpec::Single(name.into()))))
    }

    /// A union leaf; candidates are tried in the given order.
    pub fn union<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect();
        SchemaDef::Settings(Box::new(SettingsDef::new(TypeSpec::Union(names))))
    }

    /// A nested mapping with the given children, in order.
    pub fn nested<N: Into<String>>(children: Vec<(N, SchemaDef)>) -> Self {
        SchemaDef::Nested(
            children
                .into_iter()
                .map(|(name, def)| (name.into(), def))
                .collect(),
        )
    }

    /// Embeds an existing schema by deep copy. The embedded subtree is
    /// exclusively owned by the new tree; the original is untouched.
    pub fn from_schema(schema: &Schema) -> Self {
        SchemaDef::Reference(Box::new(schema.clone()))
    }

    /// Classifies a declarative JSON description.
    pub fn from_value(value: &Value) -> SchemaResult<Self> {
        Self::classify(value, "")
    }

    fn classify(value: &Value, path: &str) -> SchemaResult<Self> {
        match value {
            Value::String(name) => Ok(SchemaDef::Type(TypeSpec::Single(name.clone()))),
            Value::Array(entries) => {
                if entries.is_empty() {
                    return Err(SchemaError::invalid_description(
                        path,
                        "a union type needs at least one candidate",
                    ));
                }
                let mut names = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry.as_str() {
                        Some(name) => names.push(name.to_string()),
                        None => {
                            return Err(SchemaError::invalid_description(
                                path,
                                "union candidates must be type names",
                            ))
                        }
                    }
                }
                Ok(SchemaDef::Type(TypeSpec::Union(names)))
            }
            Value::Object(map) => match map.get("type") {
                Some(type_value) => {
                    let type_spec = match Self::classify(type_value, path) {
                        Ok(SchemaDef::Type(spec)) => spec,
                        _ => {
                            return Err(SchemaError::invalid_description(
                                path,
                                "the 'type' option must be a type name or a list of type names",
                            ))
                        }
                    };
                    let mut def = SettingsDef::new(type_spec);
                    for (key, option) in map {
                        if key != "type" {
                            def.options.insert(key.clone(), option.clone());
                        }
                    }
                    Ok(SchemaDef::Settings(Box::new(def)))
                }
                None => {
                    let mut children = Vec::with_capacity(map.len());
                    for (name, sub) in map {
                        let child = Self::classify(sub, &join_path(path, name))?;
                        children.push((name.clone(), child));
                    }
                    Ok(SchemaDef::Nested(children))
                }
            },
            other => Err(SchemaError::invalid_description(
                path,
                format!("cannot describe a schema with {}", json_kind(other)),
            )),
        }
    }

    /// Adds or replaces a declarative option on a leaf description. Bare
    /// type references upgrade to settings objects; nested mappings and
    /// embedded schemas are returned unchanged.
    pub fn option(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        match self {
            SchemaDef::Type(spec) => {
                let mut def = SettingsDef::new(spec);
                def.options.insert(key.into(), value.into());
                SchemaDef::Settings(Box::new(def))
            }
            SchemaDef::Settings(mut def) => {
                def.options.insert(key.into(), value.into());
                SchemaDef::Settings(def)
            }
            other => other,
        }
    }

    /// Marks a leaf required or optional.
    pub fn required(self, enabled: bool) -> Self {
        self.option("required", enabled)
    }

    /// Sets a fixed default value on a leaf.
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        self.option("default", value)
    }

    /// Sets a computed default; the closure receives the node, so defaults
    /// can depend on its position in the tree.
    pub fn with_default_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Schema) -> Value + Send + Sync + 'static,
    {
        self.map_settings(|def| def.default_fn = Some(Arc::new(f)))
    }

    /// Attaches a node-level cast hook. Runs before the transformer's own
    /// cast, unconditionally.
    pub fn with_cast<F>(self, f: F) -> Self
    where
        F: Fn(Value, &Schema) -> Value + Send + Sync + 'static,
    {
        self.map_settings(|def| def.cast = Some(Arc::new(f)))
    }

    /// Attaches a node-level validate hook. Runs after the transformer's
    /// validate, against the possibly cast value.
    pub fn with_validate<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &Schema) -> super::errors::ParseResult<()> + Send + Sync + 'static,
    {
        self.map_settings(|def| def.validate = Some(Arc::new(f)))
    }

    fn map_settings(self, apply: impl FnOnce(&mut SettingsDef)) -> Self {
        match self {
            SchemaDef::Type(spec) => {
                let mut def = SettingsDef::new(spec);
                apply(&mut def);
                SchemaDef::Settings(Box::new(def))
            }
            SchemaDef::Settings(mut def) => {
                apply(&mut def);
                SchemaDef::Settings(def)
            }
            other => other,
        }
    }
}

impl fmt::Debug for SchemaDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDef::Type(spec) => f.debug_tuple("Type").field(spec).finish(),
            SchemaDef::Settings(def) => f.debug_tuple("Settings").field(def).finish(),
            SchemaDef::Nested(children) => f.debug_tuple("Nested").field(children).finish(),
            SchemaDef::Reference(schema) => f.debug_tuple("Reference").field(schema).finish(),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl From<&str> for SchemaDef {
    fn from(name: &str) -> Self {
        SchemaDef::of_type(name)
    }
}

impl From<TypeSpec> for SchemaDef {
    fn from(spec: TypeSpec) -> Self {
        SchemaDef::Type(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_bare_type() {
        let def = SchemaDef::from_value(&json!("string")).unwrap();
        assert!(matches!(def, SchemaDef::Type(TypeSpec::Single(ref n)) if n == "string"));
    }

    #[test]
    fn test_classify_union() {
        let def = SchemaDef::from_value(&json!(["string", "number"])).unwrap();
        match def {
            SchemaDef::Type(TypeSpec::Union(names)) => {
                assert_eq!(names, vec!["string", "number"]);
            }
            other => panic!("expected union, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_settings_object() {
        let def = SchemaDef::from_value(&json!({ "type": "string", "minlength": 3 })).unwrap();
        match def {
            SchemaDef::Settings(def) => {
                assert_eq!(def.type_spec, TypeSpec::Single("string".to_string()));
                assert_eq!(def.options.get("minlength"), Some(&json!(3)));
                assert!(def.options.get("type").is_none());
            }
            other => panic!("expected settings, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_nested_mapping_keeps_order() {
        let def = SchemaDef::from_value(&json!({
            "name": "string",
            "age": { "type": "number", "required": false }
        }))
        .unwrap();
        match def {
            SchemaDef::Nested(children) => {
                let names: Vec<&str> = children.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["name", "age"]);
            }
            other => panic!("expected nested, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_rejects_scalars() {
        assert!(SchemaDef::from_value(&json!(42)).is_err());
        assert!(SchemaDef::from_value(&json!(null)).is_err());
        assert!(SchemaDef::from_value(&json!([])).is_err());
        assert!(SchemaDef::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_classify_rejects_non_type_in_settings() {
        let err = SchemaDef::from_value(&json!({ "type": 42 })).unwrap_err();
        assert!(err.to_string().contains("type"));
    }

    #[test]
    fn test_option_upgrades_bare_type() {
        let def = SchemaDef::from("string").option("minlength", 3);
        match def {
            SchemaDef::Settings(def) => {
                assert_eq!(def.options.get("minlength"), Some(&json!(3)));
            }
            other => panic!("expected settings, got {:?}", other),
        }
    }
}
