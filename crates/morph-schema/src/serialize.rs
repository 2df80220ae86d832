//! # Serializer — Structural and Text Dumps
//!
//! Projects a [`ModelInstance`] back out as a [`Value`] map or as JSON
//! text.
//!
//! - `Python` mode keeps native values: dates, UUIDs and enum members
//!   stay typed.
//! - `Json` mode renders every value text-safe: dates as `YYYY-MM-DD`,
//!   UUIDs as lowercase hyphenated text, enum members as their value,
//!   non-finite floats as `null`.
//!
//! Keys are canonical field names, or output aliases with `by_alias`.
//! Nested models are dumped with the same options at every level. Extras
//! kept under `Allow` follow the declared fields under their raw key; a
//! declared field keeps its slot if an extra shares its key.
//!
//! A field's custom serializer runs only when its [`WhenUsed`] policy
//! applies to the dump mode and value.
//!
//! [`WhenUsed`]: crate::field::WhenUsed

use serde::Serialize;
use thiserror::Error;

use crate::instance::ModelInstance;
use crate::pipeline::ValueError;
use crate::value::{Map, Value};

/// Which projection a dump produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpMode {
    /// Native values.
    #[default]
    Python,
    /// Text-safe values.
    Json,
}

/// Options for [`ModelInstance::dump()`] and [`ModelInstance::dump_text()`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpOptions {
    pub mode: DumpMode,
    /// Key fields by output alias instead of canonical name.
    pub by_alias: bool,
    /// Drop fields whose value is null.
    pub exclude_none: bool,
    /// Drop fields filled from defaults rather than supplied or assigned.
    pub exclude_unset: bool,
    /// Pretty-print text dumps with this many spaces per level.
    pub indent: Option<usize>,
}

impl DumpOptions {
    /// Structural dump keyed by canonical name.
    pub fn python() -> Self {
        Self::default()
    }

    /// Text-safe dump keyed by canonical name.
    pub fn json() -> Self {
        Self {
            mode: DumpMode::Json,
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: DumpMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn by_alias(mut self, on: bool) -> Self {
        self.by_alias = on;
        self
    }

    pub fn exclude_none(mut self, on: bool) -> Self {
        self.exclude_none = on;
        self
    }

    pub fn exclude_unset(mut self, on: bool) -> Self {
        self.exclude_unset = on;
        self
    }

    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }
}

/// Failure while producing a dump.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializationError {
    /// A custom field serializer rejected its value.
    #[error("serializer '{serializer}' failed for field '{field}': {source}")]
    Serializer {
        /// Field being dumped.
        field: String,
        /// Name of the failing serializer.
        serializer: String,
        /// The serializer's own error.
        source: ValueError,
    },

    /// The dump could not be encoded as text.
    #[error("encoding failed: {0}")]
    Encode(String),
}

impl ModelInstance {
    /// Project this instance into a [`Value::Map`].
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError::Serializer`] if a custom field
    /// serializer fails, here or in a nested model.
    pub fn dump(&self, opts: &DumpOptions) -> Result<Value, SerializationError> {
        let spec = self.spec();
        let mut out = Map::with_capacity(spec.fields().len() + self.extras().len());

        for (i, field) in spec.fields().iter().enumerate() {
            if opts.exclude_unset && !self.set_flags()[i] {
                continue;
            }
            let value = &self.values()[i];
            if opts.exclude_none && value.is_null() {
                continue;
            }

            let rendered = match field.serializer() {
                Some(s) if s.when_used().applies(opts.mode, value.is_null()) => {
                    let custom = s.call(value).map_err(|source| {
                        tracing::warn!(
                            model = spec.name(),
                            field = field.name(),
                            serializer = s.name(),
                            error = %source,
                            "field serializer failed"
                        );
                        SerializationError::Serializer {
                            field: field.name().to_string(),
                            serializer: s.name().to_string(),
                            source,
                        }
                    })?;
                    project(&custom, opts)?
                }
                _ => project(value, opts)?,
            };

            let key = if opts.by_alias {
                spec.keys()[i].output.clone()
            } else {
                field.name().to_string()
            };
            out.insert(key, rendered);
        }

        for (key, value) in self.extras() {
            if opts.exclude_none && value.is_null() {
                continue;
            }
            if out.contains_key(key) {
                continue;
            }
            out.insert(key.clone(), project(value, opts)?);
        }

        Ok(Value::Map(out))
    }

    /// Encode this instance as JSON text. The mode in `opts` is ignored;
    /// text dumps are always text-safe.
    ///
    /// # Errors
    ///
    /// Returns a [`SerializationError`] if a custom serializer fails or
    /// the result cannot be encoded.
    pub fn dump_text(&self, opts: &DumpOptions) -> Result<String, SerializationError> {
        let json_opts = opts.clone().mode(DumpMode::Json);
        let tree = self.dump(&json_opts)?;
        encode_text(&tree, opts.indent)
    }
}

/// Project `instance` in `mode`, keyed by output alias if `by_alias`.
///
/// # Errors
///
/// See [`ModelInstance::dump()`].
pub fn dump(
    instance: &ModelInstance,
    mode: DumpMode,
    by_alias: bool,
) -> Result<Value, SerializationError> {
    instance.dump(&DumpOptions::default().mode(mode).by_alias(by_alias))
}

/// Encode `instance` as compact JSON text, keyed by output alias if
/// `by_alias`.
///
/// # Errors
///
/// See [`ModelInstance::dump_text()`].
pub fn dump_text(instance: &ModelInstance, by_alias: bool) -> Result<String, SerializationError> {
    instance.dump_text(&DumpOptions::json().by_alias(by_alias))
}

fn project(value: &Value, opts: &DumpOptions) -> Result<Value, SerializationError> {
    Ok(match value {
        Value::Model(m) => m.dump(opts)?,
        Value::List(items) => Value::List(
            items
                .iter()
                .map(|v| project(v, opts))
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), project(v, opts)?)))
                .collect::<Result<_, SerializationError>>()?,
        ),
        other if opts.mode == DumpMode::Python => other.clone(),
        Value::Date(d) => Value::Str(d.to_iso8601()),
        Value::Uuid(u) => Value::Str(u.hyphenated().to_string()),
        Value::Enum(e) => Value::Str(e.value.clone()),
        Value::Float(f) if !f.is_finite() => Value::Null,
        other => other.clone(),
    })
}

/// Encode any value as JSON text using the text-safe rendering,
/// pretty-printed with `indent` spaces per level if given.
///
/// # Errors
///
/// Returns [`SerializationError`] if a nested model fails to dump.
pub fn encode_text(tree: &Value, indent: Option<usize>) -> Result<String, SerializationError> {
    let encode_err = |e: serde_json::Error| SerializationError::Encode(e.to_string());
    let Some(spaces) = indent else {
        return serde_json::to_string(tree).map_err(encode_err);
    };
    let pad = vec![b' '; spaces];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&pad);
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut ser).map_err(encode_err)?;
    String::from_utf8(buf).map_err(|e| SerializationError::Encode(e.to_string()))
}
