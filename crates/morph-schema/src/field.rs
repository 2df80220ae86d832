//! # Field Declarations
//!
//! A [`FieldSpec`] is one typed slot of a model: canonical name, declared
//! type, optional default, and independent input and output aliases.
//! Validators and serializers are attached through the model builder so
//! that one registration can target several fields.

use std::fmt;
use std::sync::Arc;

use crate::pipeline::{FieldPipeline, ValueError};
use crate::serialize::DumpMode;
use crate::types::FieldType;
use crate::value::Value;

/// Where a field's value comes from when the input does not supply one.
#[derive(Clone)]
pub enum DefaultValue {
    /// A fixed value, cloned into each instance.
    Value(Value),
    /// A producer invoked once per construction.
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// A fresh default for one instance.
    pub fn produce(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// When a custom field serializer takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhenUsed {
    /// In every dump.
    #[default]
    Always,
    /// In every dump, unless the value is null.
    UnlessNone,
    /// In text-mode dumps only.
    JsonOnly,
    /// In text-mode dumps, unless the value is null.
    JsonUnlessNone,
}

impl WhenUsed {
    /// Returns true if the serializer should run for this dump.
    pub fn applies(self, mode: DumpMode, is_null: bool) -> bool {
        match self {
            Self::Always => true,
            Self::UnlessNone => !is_null,
            Self::JsonOnly => mode == DumpMode::Json,
            Self::JsonUnlessNone => mode == DumpMode::Json && !is_null,
        }
    }
}

/// Signature shared by custom field serializers.
pub type SerializerFn = dyn Fn(&Value) -> Result<Value, ValueError> + Send + Sync;

/// A named custom output transform with its usage policy.
#[derive(Clone)]
pub struct FieldSerializer {
    name: String,
    when_used: WhenUsed,
    func: Arc<SerializerFn>,
}

impl FieldSerializer {
    pub fn new(
        name: impl Into<String>,
        when_used: WhenUsed,
        func: impl Fn(&Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            when_used,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn when_used(&self) -> WhenUsed {
        self.when_used
    }

    /// Apply the transform.
    pub fn call(&self, value: &Value) -> Result<Value, ValueError> {
        (self.func)(value)
    }
}

impl fmt::Debug for FieldSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldSerializer({}, {:?})", self.name, self.when_used)
    }
}

/// One declared field of a model.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    field_type: FieldType,
    default: Option<DefaultValue>,
    input_alias: Option<String>,
    output_alias: Option<String>,
    strip_whitespace: Option<bool>,
    description: Option<String>,
    pub(crate) pipeline: FieldPipeline,
    pub(crate) serializer: Option<FieldSerializer>,
}

impl FieldSpec {
    /// A required field with no aliases.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
            input_alias: None,
            output_alias: None,
            strip_whitespace: None,
            description: None,
            pipeline: FieldPipeline::default(),
            serializer: None,
        }
    }

    /// Make the field optional with a fixed default.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }

    /// Make the field optional with a default produced per construction.
    pub fn default_factory(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultValue::Factory(Arc::new(f)));
        self
    }

    /// Use `alias` as both the input and the output name.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.input_alias(alias.clone()).output_alias(alias)
    }

    /// Accept `alias` on input instead of the model's transformed name.
    pub fn input_alias(mut self, alias: impl Into<String>) -> Self {
        self.input_alias = Some(alias.into());
        self
    }

    /// Emit the field under `alias` in by-alias dumps.
    pub fn output_alias(mut self, alias: impl Into<String>) -> Self {
        self.output_alias = Some(alias.into());
        self
    }

    /// Override the model-wide whitespace stripping for this field.
    pub fn strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = Some(strip);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Returns true if the field has neither a default nor a factory.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn get_input_alias(&self) -> Option<&str> {
        self.input_alias.as_deref()
    }

    pub fn get_output_alias(&self) -> Option<&str> {
        self.output_alias.as_deref()
    }

    /// The per-field stripping override, if any.
    pub fn strip_override(&self) -> Option<bool> {
        self.strip_whitespace
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Both validator chains.
    pub fn pipeline(&self) -> &FieldPipeline {
        &self.pipeline
    }

    /// The custom output transform, if one is attached.
    pub fn serializer(&self) -> Option<&FieldSerializer> {
        self.serializer.as_ref()
    }
}
