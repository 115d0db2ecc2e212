//! Schema node tree
//!
//! A `Schema` is one node of the validation tree: a leaf bound to a
//! transformer type (possibly a union of candidates), or a nested node
//! owning ordered children. Nodes are immutable once constructed; a
//! subtree is exclusively owned by its tree, and embedding a schema into
//! another tree always deep-copies it and rebinds the copied paths.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::def::{SchemaDef, SettingsDef, TypeSpec};
use super::errors::{SchemaError, SchemaResult};
use super::settings::{CastHook, DefaultFn, Settings, ValidateHook};
use crate::transformer::{default_registry, TransformerRegistry};
use crate::utils::{join_path, obj_to_dot};

/// Options for schema construction.
///
/// `default_values` is the root's external default mapping: when an absent
/// field has no default of its own, its full dotted path is looked up here.
/// `cast` and `validate` are the root-level hooks, run once against the
/// fully assembled value.
#[derive(Default)]
pub struct SchemaOptions {
    pub name: Option<String>,
    pub default_values: Map<String, Value>,
    pub settings: Map<String, Value>,
    pub cast: Option<Arc<CastHook>>,
    pub validate: Option<Arc<ValidateHook>>,
    pub registry: Option<Arc<TransformerRegistry>>,
}

impl SchemaOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the root field name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the external default-value mapping. Keys are dotted paths
    /// (or nested objects; both forms resolve).
    pub fn default_values(mut self, values: Map<String, Value>) -> Self {
        self.default_values = values;
        self
    }

    /// Adds one external default by dotted path.
    pub fn default_value(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(path.into(), value.into());
        self
    }

    /// Initial settings override for the root node.
    pub fn settings(mut self, settings: Map<String, Value>) -> Self {
        self.settings = settings;
        self
    }

    /// Adds one root setting.
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Root-level cast hook, run once after the subtree resolves.
    pub fn cast<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, &Schema) -> Value + Send + Sync + 'static,
    {
        self.cast = Some(Arc::new(f));
        self
    }

    /// Root-level validate hook, run once after the root cast.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Schema) -> super::errors::ParseResult<()> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    /// Uses a specific transformer registry instead of the process-wide
    /// default.
    pub fn registry(mut self, registry: Arc<TransformerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

#[derive(Clone)]
pub(crate) enum SchemaKind {
    Nested { children: Vec<Schema> },
    Leaf { type_spec: TypeSpec },
}

/// One node of the validation tree.
#[derive(Clone)]
pub struct Schema {
    pub(crate) name: String,
    pub(crate) full_path: String,
    pub(crate) kind: SchemaKind,
    /// One merged settings record per union candidate; a single entry for
    /// single-type leaves and nested nodes.
    pub(crate) candidate_settings: Vec<Settings>,
    pub(crate) registry: Arc<TransformerRegistry>,
    /// Root-only external default mapping, keyed by dotted path.
    pub(crate) default_values: Map<String, Value>,
    pub(crate) root_cast: Option<Arc<CastHook>>,
    pub(crate) root_validate: Option<Arc<ValidateHook>>,
}

impl Schema {
    /// Constructs a schema from a description with default options.
    pub fn new(def: impl Into<SchemaDef>) -> SchemaResult<Self> {
        Self::with_options(def, SchemaOptions::default())
    }

    /// Constructs a schema from a description.
    ///
    /// # Errors
    ///
    /// Fails on authoring mistakes only: unknown transformer type names,
    /// a node declaring both `required: true` and a default, or an
    /// unclassifiable description. Data is never validated here.
    pub fn with_options(def: impl Into<SchemaDef>, options: SchemaOptions) -> SchemaResult<Self> {
        let registry = options
            .registry
            .clone()
            .unwrap_or_else(|| default_registry().clone());
        let name = options.name.clone().unwrap_or_default();
        let override_settings = if options.settings.is_empty() {
            None
        } else {
            Some(&options.settings)
        };

        let mut root = Self::build(def.into(), name, "", &registry, override_settings)?;
        root.default_values = options.default_values;
        root.root_cast = options.cast;
        root.root_validate = options.validate;

        if !root.default_values.is_empty() {
            let known = root.paths();
            let flat = obj_to_dot(&Value::Object(root.default_values.clone()));
            for (path, _) in &flat {
                if !known.iter().any(|p| p == path) {
                    debug!(path = %path, "default value does not match any schema path");
                }
            }
        }

        Ok(root)
    }

    fn build(
        def: SchemaDef,
        name: String,
        parent_path: &str,
        registry: &Arc<TransformerRegistry>,
        override_settings: Option<&Map<String, Value>>,
    ) -> SchemaResult<Self> {
        let full_path = join_path(parent_path, &name);
        match def {
            SchemaDef::Type(type_spec) => Self::build_leaf(
                type_spec,
                Map::new(),
                None,
                None,
                None,
                name,
                full_path,
                registry,
                override_settings,
            ),
            SchemaDef::Settings(def) => {
                let SettingsDef {
                    type_spec,
                    options,
                    default_fn,
                    cast,
                    validate,
                } = *def;
                Self::build_leaf(
                    type_spec,
                    options,
                    default_fn,
                    cast,
                    validate,
                    name,
                    full_path,
                    registry,
                    override_settings,
                )
            }
            SchemaDef::Nested(entries) => {
                let mut children = Vec::with_capacity(entries.len());
                for (child_name, child_def) in entries {
                    children.push(Self::build(child_def, child_name, &full_path, registry, None)?);
                }
                let user = merged_user(&Map::new(), override_settings);
                let settings = Settings::merge(&Map::new(), &user, None, None, None, &full_path)?;
                Ok(Self {
                    name,
                    full_path,
                    kind: SchemaKind::Nested { children },
                    candidate_settings: vec![settings],
                    registry: registry.clone(),
                    default_values: Map::new(),
                    root_cast: None,
                    root_validate: None,
                })
            }
            SchemaDef::Reference(schema) => Ok(Self::adopt(*schema, name, parent_path, registry)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_leaf(
        type_spec: TypeSpec,
        options: Map<String, Value>,
        default_fn: Option<Arc<DefaultFn>>,
        cast: Option<Arc<CastHook>>,
        validate: Option<Arc<ValidateHook>>,
        name: String,
        full_path: String,
        registry: &Arc<TransformerRegistry>,
        override_settings: Option<&Map<String, Value>>,
    ) -> SchemaResult<Self> {
        if type_spec.names().is_empty() {
            return Err(SchemaError::invalid_description(
                &full_path,
                "a union type needs at least one candidate",
            ));
        }
        let user = merged_user(&options, override_settings);
        let mut candidate_settings = Vec::with_capacity(type_spec.names().len());
        for type_name in type_spec.names() {
            let transformer = registry
                .get(type_name)
                .ok_or_else(|| SchemaError::unknown_type(type_name, &full_path))?;
            candidate_settings.push(Settings::merge(
                &transformer.default_settings(),
                &user,
                default_fn.clone(),
                cast.clone(),
                validate.clone(),
                &full_path,
            )?);
        }
        Ok(Self {
            name,
            full_path,
            kind: SchemaKind::Leaf { type_spec },
            candidate_settings,
            registry: registry.clone(),
            default_values: Map::new(),
            root_cast: None,
            root_validate: None,
        })
    }

    /// Takes ownership of an embedded schema copy: renames it, strips the
    /// root-only collaborators, and rebinds every path to the new tree.
    fn adopt(
        mut schema: Schema,
        name: String,
        parent_path: &str,
        registry: &Arc<TransformerRegistry>,
    ) -> Self {
        if !name.is_empty() {
            schema.name = name;
        }
        schema.default_values = Map::new();
        schema.root_cast = None;
        schema.root_validate = None;
        schema.rebind(parent_path, registry);
        schema
    }

    fn rebind(&mut self, parent_path: &str, registry: &Arc<TransformerRegistry>) {
        self.full_path = join_path(parent_path, &self.name);
        self.registry = registry.clone();
        let full_path = self.full_path.clone();
        if let SchemaKind::Nested { children } = &mut self.kind {
            for child in children {
                child.rebind(&full_path, registry);
            }
        }
    }

    /// The property name this node represents; empty at the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted concatenation of ancestor names down to this node.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, SchemaKind::Nested { .. })
    }

    /// Ordered children; empty for leaves.
    pub fn children(&self) -> &[Schema] {
        match &self.kind {
            SchemaKind::Nested { children } => children,
            SchemaKind::Leaf { .. } => &[],
        }
    }

    /// The leaf type reference; `None` for nested nodes.
    pub fn type_spec(&self) -> Option<&TypeSpec> {
        match &self.kind {
            SchemaKind::Leaf { type_spec } => Some(type_spec),
            SchemaKind::Nested { .. } => None,
        }
    }

    /// The node's merged settings. Union leaves expose the first
    /// candidate's record here; per-candidate records are consulted during
    /// resolution.
    pub fn settings(&self) -> &Settings {
        &self.candidate_settings[0]
    }

    pub(crate) fn settings_at(&self, candidate: usize) -> &Settings {
        &self.candidate_settings[candidate]
    }

    /// Every leaf dotted path under this node, prefixed with its own name.
    pub fn paths(&self) -> Vec<String> {
        match &self.kind {
            SchemaKind::Leaf { .. } => vec![self.name.clone()],
            SchemaKind::Nested { children } => {
                let name = &self.name;
                children
                    .iter()
                    .flat_map(|child| {
                        child
                            .paths()
                            .into_iter()
                            .map(move |path| join_path(name, &path))
                    })
                    .collect()
            }
        }
    }

    /// Immediate children's names, used for structural validation.
    pub fn own_paths(&self) -> Vec<&str> {
        self.children().iter().map(|child| child.name()).collect()
    }

    /// True iff `path` is one of this node's leaf dotted paths.
    pub fn has_field(&self, path: &str) -> bool {
        self.paths().iter().any(|p| p == path)
    }

    /// Descends into children along a dotted path. `None` when no node
    /// matches at any level; callers must handle that, it is not a data
    /// error.
    pub fn schema_at_path(&self, path: &str) -> Option<&Schema> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let child = self.children().iter().find(|child| child.name == head)?;
        match rest {
            None => Some(child),
            Some(rest) => child.schema_at_path(rest),
        }
    }

    /// Flat property map for message templates.
    pub(crate) fn message_props(&self, value: Option<&Value>) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        props.insert("field.fullPath".to_string(), self.full_path.clone());
        props.insert("field.name".to_string(), self.name.clone());
        props.insert(
            "value".to_string(),
            match value {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
        );
        props
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Schema");
        out.field("name", &self.name).field("full_path", &self.full_path);
        match &self.kind {
            SchemaKind::Leaf { type_spec } => out.field("type", type_spec),
            SchemaKind::Nested { children } => out.field("children", children),
        };
        out.finish()
    }
}

fn merged_user(
    base: &Map<String, Value>,
    override_settings: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut user = base.clone();
    if let Some(overrides) = override_settings {
        for (key, value) in overrides {
            user.insert(key.clone(), value.clone());
        }
    }
    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_schema() -> Schema {
        Schema::new(
            SchemaDef::from_value(&json!({
                "name": "string",
                "age": { "type": "number", "required": false },
                "address": {
                    "city": "string",
                    "zip": "number"
                }
            }))
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_paths_cover_all_leaves() {
        let schema = nested_schema();
        assert_eq!(
            schema.paths(),
            vec!["name", "age", "address.city", "address.zip"]
        );
    }

    #[test]
    fn test_full_paths_follow_parent_chain() {
        let schema = nested_schema();
        let city = schema.schema_at_path("address.city").unwrap();
        assert_eq!(city.name(), "city");
        assert_eq!(city.full_path(), "address.city");
    }

    #[test]
    fn test_has_field_matches_leaf_paths_only() {
        let schema = nested_schema();
        assert!(schema.has_field("address.zip"));
        assert!(!schema.has_field("address"));
        assert!(!schema.has_field("nope"));
    }

    #[test]
    fn test_schema_at_path_absent_is_none() {
        let schema = nested_schema();
        assert!(schema.schema_at_path("address.planet").is_none());
        assert!(schema.schema_at_path("name.deeper").is_none());
    }

    #[test]
    fn test_own_paths_are_one_level() {
        let schema = nested_schema();
        assert_eq!(schema.own_paths(), vec!["name", "age", "address"]);
    }

    #[test]
    fn test_unknown_type_rejected_at_construction() {
        let err = Schema::new(SchemaDef::of_type("uuid")).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_required_default_conflict_rejected_at_construction() {
        let def = SchemaDef::of_type("string")
            .required(true)
            .with_default("x");
        let err = Schema::new(def).unwrap_err();
        assert!(matches!(err, SchemaError::RequiredAndDefault { .. }));
    }

    #[test]
    fn test_embedding_clones_and_rebases() {
        let address = Schema::new(
            SchemaDef::from_value(&json!({ "city": "string", "zip": "number" })).unwrap(),
        )
        .unwrap();

        let home = Schema::new(SchemaDef::nested(vec![(
            "home",
            SchemaDef::from_schema(&address),
        )]))
        .unwrap();
        let work = Schema::new(SchemaDef::nested(vec![(
            "work",
            SchemaDef::from_schema(&address),
        )]))
        .unwrap();

        // The original is untouched and each embedding got its own paths.
        assert_eq!(address.paths(), vec!["city", "zip"]);
        assert_eq!(home.paths(), vec!["home.city", "home.zip"]);
        assert_eq!(work.paths(), vec!["work.city", "work.zip"]);
    }

    #[test]
    fn test_root_settings_override() {
        let schema = Schema::with_options(
            SchemaDef::of_type("string"),
            SchemaOptions::new().setting("required", false),
        )
        .unwrap();
        assert!(!schema.settings().required.enabled);
    }

    #[test]
    fn test_clone_does_not_share_settings() {
        let schema = nested_schema();
        let clone = schema.clone();
        // Distinct records: the clone's settings live at their own address.
        assert!(!std::ptr::eq(schema.settings(), clone.settings()));
        assert_eq!(clone.paths(), schema.paths());
    }
}
