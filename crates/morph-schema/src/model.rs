//! # Model Declarations
//!
//! A [`ModelSpec`] is the immutable, validated declaration of a model:
//! its ordered fields, the model-wide [`ModelConfig`], and the input and
//! output keys of every field, resolved once at build time.
//!
//! ## Build-Time Checks
//!
//! [`ModelSpecBuilder::build()`] rejects declarations that could never
//! validate deterministically:
//!
//! - two fields with the same canonical name,
//! - a validator or serializer attached to an undeclared field,
//! - two fields accepting the same input key,
//! - two fields written under the same output key,
//! - union or enum types with no members.
//!
//! Once built, a spec is shared through `Arc` and is `Send + Sync`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use morph_core::{NamingTransform, SchemaError};
use serde::{Deserialize, Serialize};

use crate::alias::ResolvedKeys;
use crate::field::{FieldSerializer, FieldSpec, WhenUsed};
use crate::pipeline::{Stage, Validator, ValueError};
use crate::value::Value;

/// What happens to input keys that match no declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Each such key is an `UnknownField` error.
    Forbid,
    /// Such keys are dropped silently.
    #[default]
    Ignore,
    /// Such keys are kept on the instance, untyped.
    Allow,
}

/// Model-wide switches. Every option defaults to off, and extras default
/// to [`ExtraPolicy::Ignore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Derives each field's default external name.
    pub naming_transform: Option<NamingTransform>,
    /// Handling of unmatched input keys.
    pub extra: ExtraPolicy,
    /// Also accept canonical names when an alias applies.
    pub populate_by_name: bool,
    /// Re-run coercion and validators on assignment.
    pub validate_on_assignment: bool,
    /// Run coercion and before-validators on default values too.
    pub validate_defaults: bool,
    /// Strip surrounding whitespace from string-typed input.
    pub strip_whitespace: bool,
}

impl ModelConfig {
    pub fn naming_transform(mut self, transform: NamingTransform) -> Self {
        self.naming_transform = Some(transform);
        self
    }

    pub fn extra(mut self, policy: ExtraPolicy) -> Self {
        self.extra = policy;
        self
    }

    pub fn populate_by_name(mut self, on: bool) -> Self {
        self.populate_by_name = on;
        self
    }

    pub fn validate_on_assignment(mut self, on: bool) -> Self {
        self.validate_on_assignment = on;
        self
    }

    pub fn validate_defaults(mut self, on: bool) -> Self {
        self.validate_defaults = on;
        self
    }

    pub fn strip_whitespace(mut self, on: bool) -> Self {
        self.strip_whitespace = on;
        self
    }
}

/// An immutable model declaration.
pub struct ModelSpec {
    name: String,
    fields: Vec<FieldSpec>,
    config: ModelConfig,
    keys: Vec<ResolvedKeys>,
    input_index: HashMap<String, usize>,
}

impl ModelSpec {
    /// Start declaring a model called `name`.
    pub fn builder(name: impl Into<String>) -> ModelSpecBuilder {
        ModelSpecBuilder {
            name: name.into(),
            config: ModelConfig::default(),
            fields: Vec::new(),
            validators: Vec::new(),
            serializers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// The field called `name`.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Resolved keys for the field at `index`, in field order.
    pub fn keys(&self) -> &[ResolvedKeys] {
        &self.keys
    }

    /// Accepted input keys of the field called `name`, highest
    /// precedence first.
    pub fn input_keys(&self, name: &str) -> Option<&[String]> {
        self.field_index(name).map(|i| self.keys[i].input.as_slice())
    }

    /// Output key of the field called `name`.
    pub fn output_key(&self, name: &str) -> Option<&str> {
        self.field_index(name).map(|i| self.keys[i].output.as_str())
    }

    /// Index of the field that accepts input key `key`.
    pub fn field_for_key(&self, key: &str) -> Option<usize> {
        self.input_index.get(key).copied()
    }

    /// Whitespace stripping for the field at `index`.
    pub(crate) fn strips(&self, index: usize) -> bool {
        self.fields[index]
            .strip_override()
            .unwrap_or(self.config.strip_whitespace)
    }
}

impl fmt::Debug for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSpec")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(FieldSpec::name).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}

/// Incremental declaration of a [`ModelSpec`].
pub struct ModelSpecBuilder {
    name: String,
    config: ModelConfig,
    fields: Vec<FieldSpec>,
    validators: Vec<(Vec<String>, Stage, Validator)>,
    serializers: Vec<(String, FieldSerializer)>,
}

impl ModelSpecBuilder {
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a before-validator on one field.
    pub fn before(
        self,
        field: &str,
        name: impl Into<String>,
        f: impl Fn(Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        self.validator(&[field], Stage::Before, name, f)
    }

    /// Declare an after-validator on one field.
    pub fn after(
        self,
        field: &str,
        name: impl Into<String>,
        f: impl Fn(Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        self.validator(&[field], Stage::After, name, f)
    }

    /// Declare one validator against several fields. It is added to each
    /// field's chain for `stage`.
    pub fn validator(
        mut self,
        fields: &[&str],
        stage: Stage,
        name: impl Into<String>,
        f: impl Fn(Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push((
            fields.iter().map(|s| s.to_string()).collect(),
            stage,
            Validator::new(name, f),
        ));
        self
    }

    /// Attach a custom output transform to `field`.
    pub fn serializer(
        mut self,
        field: &str,
        name: impl Into<String>,
        when_used: WhenUsed,
        f: impl Fn(&Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        self.serializers
            .push((field.to_string(), FieldSerializer::new(name, when_used, f)));
        self
    }

    /// Check the declaration and freeze it.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for the first defect found.
    pub fn build(self) -> Result<Arc<ModelSpec>, SchemaError> {
        let Self {
            name,
            config,
            mut fields,
            validators,
            serializers,
        } = self;

        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(SchemaError::DuplicateField {
                    model: name,
                    field: field.name().to_string(),
                });
            }
            if let Some(reason) = field.field_type().defect() {
                return Err(SchemaError::InvalidType {
                    field: field.name().to_string(),
                    reason,
                });
            }
        }

        for (targets, stage, validator) in validators {
            for target in &targets {
                let Some(field) = fields.iter_mut().find(|f| f.name() == target) else {
                    return Err(SchemaError::UnknownField {
                        model: name,
                        field: target.clone(),
                        by: validator.name().to_string(),
                    });
                };
                field.pipeline.chain_mut(stage).push_declared(validator.clone());
            }
        }

        for (target, serializer) in serializers {
            let Some(field) = fields.iter_mut().find(|f| f.name() == target) else {
                return Err(SchemaError::UnknownField {
                    model: name,
                    field: target,
                    by: serializer.name().to_string(),
                });
            };
            field.serializer = Some(serializer);
        }

        let keys: Vec<ResolvedKeys> = fields
            .iter()
            .map(|f| ResolvedKeys::resolve(f, &config))
            .collect();

        let mut input_index: HashMap<String, usize> = HashMap::new();
        for (i, resolved) in keys.iter().enumerate() {
            for key in &resolved.input {
                if let Some(&first) = input_index.get(key) {
                    return Err(SchemaError::AmbiguousInputKey {
                        model: name,
                        key: key.clone(),
                        first: fields[first].name().to_string(),
                        second: fields[i].name().to_string(),
                    });
                }
                input_index.insert(key.clone(), i);
            }
        }

        for (i, resolved) in keys.iter().enumerate() {
            if let Some(first) = keys[..i].iter().position(|k| k.output == resolved.output) {
                return Err(SchemaError::DuplicateOutputKey {
                    model: name,
                    key: resolved.output.clone(),
                    first: fields[first].name().to_string(),
                    second: fields[i].name().to_string(),
                });
            }
        }

        tracing::debug!(model = %name, fields = fields.len(), "model spec built");

        Ok(Arc::new(ModelSpec {
            name,
            fields,
            config,
            keys,
            input_index,
        }))
    }
}
