//! Resolution engine
//!
//! The recursive walk of a schema tree against an input value:
//! - nested nodes run structural validation, attempt every child, and
//!   aggregate all failures into one error instead of short-circuiting
//! - leaf nodes run the type pipeline: null gate, union trial resolution,
//!   default substitution, required check, loader pipelines, casts,
//!   validates, and the transformer's final parse
//!
//! All per-call transient state (the union-trial candidate in particular)
//! lives in the call, never on the shared node, so one constructed schema
//! may serve concurrent parses.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

use super::def::{SchemaDef, TypeSpec};
use super::errors::{ParseResult, ValidationError};
use super::node::{Schema, SchemaKind, SchemaOptions};
use super::settings::{DefaultValue, Settings};
use crate::transformer::TransformerRegistry;
use crate::utils::{find_by_path, join_path, properties_restricted, render};

const REQUIRED_TEMPLATE: &str = "Property {field.fullPath} is required";

/// Per-call resolution context threaded through the recursion.
pub struct ParseCtx<'a> {
    registry: &'a Arc<TransformerRegistry>,
    root: &'a Schema,
}

impl ParseCtx<'_> {
    /// The registry resolving type names for this call. Transformers use
    /// it to instantiate sub-schemas (array items, object maps).
    pub fn registry(&self) -> &Arc<TransformerRegistry> {
        self.registry
    }
}

impl Schema {
    /// Validates and sanitizes a value.
    ///
    /// # Errors
    ///
    /// Returns a single `ValidationError` whose `errors` list enumerates
    /// every violation found in this pass.
    pub fn parse(&self, value: Value) -> ParseResult<Value> {
        Ok(self.parse_opt(Some(value))?.unwrap_or(Value::Null))
    }

    /// Validates and sanitizes a possibly-absent value. `None` input on an
    /// optional schema resolves to `None` (the field is omitted upstream).
    pub fn parse_opt(&self, value: Option<Value>) -> ParseResult<Option<Value>> {
        let ctx = ParseCtx {
            registry: &self.registry,
            root: self,
        };
        debug!(field = %self.full_path, "parsing value against schema");
        let resolved = self.parse_node(value, &ctx)?;

        // Root hooks see the fully assembled value, once.
        let resolved = match resolved {
            Some(mut value) => {
                if let Some(cast) = &self.root_cast {
                    value = cast(value, self);
                }
                if let Some(validate) = &self.root_validate {
                    validate(&value, self)?;
                }
                Some(value)
            }
            None => None,
        };
        Ok(resolved)
    }

    pub(crate) fn parse_node(
        &self,
        value: Option<Value>,
        ctx: &ParseCtx,
    ) -> ParseResult<Option<Value>> {
        match &self.kind {
            SchemaKind::Nested { .. } => self.parse_nested(value, ctx),
            SchemaKind::Leaf { type_spec } => self.parse_leaf(type_spec, value, ctx),
        }
    }

    fn parse_nested(&self, value: Option<Value>, ctx: &ParseCtx) -> ParseResult<Option<Value>> {
        let settings = self.settings();

        // Absence resolves before any structural validation runs.
        let value = match value {
            Some(value) => value,
            None => match self.resolve_default(settings, ctx) {
                Some(value) => value,
                None => {
                    if !settings.required.enabled {
                        return Ok(None);
                    }
                    return Err(self.required_error(settings));
                }
            },
        };
        if value.is_null() && settings.allow_null {
            return Ok(Some(value));
        }

        let mut errors = Vec::new();

        // Structural validation: own properties must be a subset of the
        // declared child names. Sub-properties of an allowed property are
        // implicitly permitted; the owning child validates them itself.
        let own = self.own_paths();
        if let Some(obj) = value.as_object() {
            if !properties_restricted(&value, &own, false) {
                for (key, sub) in obj {
                    if !own.iter().any(|name| name == key) {
                        errors.push(ValidationError::unknown_property(
                            join_path(&self.full_path, key),
                            sub.clone(),
                        ));
                    }
                }
            }
        }

        // Every child is attempted; failures accumulate.
        let mut sanitized = Map::new();
        for child in self.children() {
            let sub = value
                .as_object()
                .and_then(|obj| obj.get(child.name()))
                .cloned();
            match child.parse_node(sub, ctx) {
                Ok(Some(parsed)) => {
                    sanitized.insert(child.name().to_string(), parsed);
                }
                Ok(None) => {}
                Err(err) if err.is_aggregate() => errors.extend(err.errors),
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::aggregate(&self.full_path, value, errors));
        }
        Ok(Some(Value::Object(sanitized)))
    }

    fn parse_leaf(
        &self,
        type_spec: &TypeSpec,
        value: Option<Value>,
        ctx: &ParseCtx,
    ) -> ParseResult<Option<Value>> {
        if matches!(value, Some(Value::Null)) && self.settings().allow_null {
            return Ok(Some(Value::Null));
        }

        match type_spec {
            TypeSpec::Single(name) => self.parse_candidate(name, self.settings_at(0), value, ctx),
            TypeSpec::Union(names) => {
                for (index, name) in names.iter().enumerate() {
                    trace!(field = %self.full_path, candidate = %name, "trying union candidate");
                    // Failed attempts are discarded; only a summary failure
                    // surfaces when no candidate matches.
                    if let Ok(resolved) =
                        self.parse_candidate(name, self.settings_at(index), value.clone(), ctx)
                    {
                        return Ok(resolved);
                    }
                }
                Err(ValidationError::unresolved_union(
                    self.full_path(),
                    value.unwrap_or(Value::Null),
                ))
            }
        }
    }

    fn parse_candidate(
        &self,
        type_name: &str,
        settings: &Settings,
        value: Option<Value>,
        ctx: &ParseCtx,
    ) -> ParseResult<Option<Value>> {
        let transformer = ctx
            .registry
            .get(type_name)
            .ok_or_else(|| ValidationError::unknown_type(type_name, self.full_path()))?;

        let value = match value {
            Some(value) => Some(value),
            None => self.resolve_default(settings, ctx),
        };
        let mut value = match value {
            Some(value) => value,
            None => {
                if !settings.required.enabled {
                    return Ok(None);
                }
                return Err(self.required_error(settings));
            }
        };

        if let Some(loaders) = settings.array_option("loaders") {
            value = self.run_loaders(loaders, value, ctx)?;
        }
        let transformer_loaders = transformer.loaders();
        if !transformer_loaders.is_empty() {
            value = self.run_loaders(&transformer_loaders, value, ctx)?;
        }

        // Node-level cast is unconditional; the transformer's cast only
        // runs when autoCast is enabled. Casts are total: they return the
        // input unchanged when conversion is impossible, so the validate
        // step reports the real failure.
        if let Some(cast) = &settings.cast {
            value = cast(value, self);
        }
        if settings.auto_cast {
            value = transformer.cast(value, self, settings);
        }

        transformer.validate(&value, self, settings)?;
        if let Some(validate) = &settings.validate {
            validate(&value, self)?;
        }

        let value = transformer.parse(value, self, settings, ctx)?;
        Ok(Some(value))
    }

    /// Runs each loader description's full leaf pipeline over the value,
    /// in order, before the target type's own pipeline.
    fn run_loaders(
        &self,
        loaders: &[Value],
        mut value: Value,
        ctx: &ParseCtx,
    ) -> ParseResult<Value> {
        for description in loaders {
            let def = SchemaDef::from_value(description)
                .map_err(|err| ValidationError::new(err.to_string()).with_field(self.full_path()))?;
            let loader = Schema::with_options(
                def,
                SchemaOptions::new()
                    .name(self.full_path())
                    .registry(ctx.registry.clone()),
            )
            .map_err(|err| ValidationError::new(err.to_string()).with_field(self.full_path()))?;
            value = loader.parse_opt(Some(value))?.unwrap_or(Value::Null);
        }
        Ok(value)
    }

    /// A node's effective default: its own literal or computed default
    /// first, else a dotted-path lookup into the root's external mapping.
    fn resolve_default(&self, settings: &Settings, ctx: &ParseCtx) -> Option<Value> {
        match &settings.default {
            Some(DefaultValue::Literal(value)) => Some(value.clone()),
            Some(DefaultValue::Computed(compute)) => Some(compute(self)),
            None => {
                let defaults = &ctx.root.default_values;
                if defaults.is_empty() || self.full_path.is_empty() {
                    return None;
                }
                if let Some(value) = defaults.get(&self.full_path) {
                    return Some(value.clone());
                }
                let (head, rest) = self.full_path.split_once('.')?;
                find_by_path(defaults.get(head)?, rest).cloned()
            }
        }
    }

    fn required_error(&self, settings: &Settings) -> ValidationError {
        let template = settings
            .required
            .message
            .as_deref()
            .unwrap_or(REQUIRED_TEMPLATE);
        ValidationError::new(render(template, &self.message_props(None)))
            .with_field(self.full_path())
    }
}
