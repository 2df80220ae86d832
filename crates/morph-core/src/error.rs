//! # Error Types — Structured Validation Error Hierarchy
//!
//! Defines the error types shared by every Morph crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Field-level failures are *collected*, never thrown one at a time. A
//!   single construction attempt reports every problem it found through
//!   one [`ValidationError`].
//! - Every [`FieldError`] carries a location path (`address.city`,
//!   `tags[2]`), an [`ErrorKind`], and a human-readable message.
//! - Malformed encoded input is a [`ParseError`], reported alone and
//!   before any field is looked at. It is never wrapped in a
//!   [`ValidationError`].
//! - Mistakes in a model declaration are a [`SchemaError`] raised once,
//!   when the model is built.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One segment of a location path inside a validated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum LocItem {
    /// A mapping key or field name.
    Key(String),
    /// A list position.
    Index(usize),
}

impl From<&str> for LocItem {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for LocItem {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for LocItem {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a value inside a validated document, outermost first.
///
/// An empty location refers to the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Loc(Vec<LocItem>);

impl Loc {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A single-segment location naming a field or key.
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![LocItem::Key(name.into())])
    }

    /// Returns a new location with `item` placed in front of this one.
    pub fn prefixed(&self, item: impl Into<LocItem>) -> Self {
        let mut items = Vec::with_capacity(self.0.len() + 1);
        items.push(item.into());
        items.extend(self.0.iter().cloned());
        Self(items)
    }

    /// Returns true if this is the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path segments, outermost first.
    pub fn items(&self) -> &[LocItem] {
        &self.0
    }

    /// The outermost key, if the location starts with one.
    pub fn first_key(&self) -> Option<&str> {
        match self.0.first() {
            Some(LocItem::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, item) in self.0.iter().enumerate() {
            match item {
                LocItem::Key(key) if i == 0 => write!(f, "{key}")?,
                LocItem::Key(key) => write!(f, ".{key}")?,
                LocItem::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Classification of a field-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No acceptable input key was present and the field has no default.
    MissingRequiredField,
    /// A value was present but could not be converted to the declared type.
    TypeCoercion,
    /// A before or after validator rejected the value.
    Validator,
    /// An input key matched no field while extra keys are forbidden.
    UnknownField,
}

impl ErrorKind {
    /// Short machine-readable name, as used in rendered reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "missing",
            Self::TypeCoercion => "type_coercion",
            Self::Validator => "validator",
            Self::UnknownField => "unknown_field",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level failure with structured context.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{loc}: {message} [{kind}]")]
pub struct FieldError {
    /// Where in the input the failure occurred.
    pub loc: Loc,
    /// What kind of failure this is.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl FieldError {
    /// Create an error at an explicit location.
    pub fn new(loc: Loc, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind,
            message: message.into(),
        }
    }

    /// A required field with no acceptable key present in the input.
    pub fn missing(field: &str) -> Self {
        Self::new(
            Loc::field(field),
            ErrorKind::MissingRequiredField,
            "field required",
        )
    }

    /// An input key that matched no declared field.
    pub fn unknown(key: &str) -> Self {
        Self::new(
            Loc::field(key),
            ErrorKind::UnknownField,
            "extra inputs are not permitted",
        )
    }

    /// A value that could not be coerced to the declared type.
    pub fn coercion(loc: Loc, message: impl Into<String>) -> Self {
        Self::new(loc, ErrorKind::TypeCoercion, message)
    }

    /// A value rejected by a validator function.
    pub fn validator(field: &str, message: impl Into<String>) -> Self {
        Self::new(Loc::field(field), ErrorKind::Validator, message)
    }

    /// Returns this error relocated underneath `item`.
    pub fn prefixed(mut self, item: impl Into<LocItem>) -> Self {
        self.loc = self.loc.prefixed(item);
        self
    }
}

/// Every field-level failure produced by one construction attempt.
///
/// Never empty: a construction that recorded no failure succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    model: String,
    errors: Vec<FieldError>,
}

impl ValidationError {
    /// Aggregate `errors` reported against `model`.
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    /// Name of the model that failed validation.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all recorded failures, in recording order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Failures whose location starts at the given field or key.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.loc.first_key() == Some(field))
    }

    /// Returns true if any failure of `kind` is located at `field`.
    pub fn has(&self, field: &str, kind: ErrorKind) -> bool {
        self.for_field(field).any(|e| e.kind == kind)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.errors.len();
        write!(
            f,
            "{n} validation error{} for {}",
            if n == 1 { "" } else { "s" },
            self.model
        )?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Malformed encoded input, detected before any field validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Description from the decoder.
    pub message: String,
    /// One-based line of the failure (zero if unknown).
    pub line: usize,
    /// One-based column of the failure (zero if unknown).
    pub column: usize,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            message: e.to_string(),
            line: e.line(),
            column: e.column(),
        }
    }
}

/// A model declaration that cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields share a canonical name.
    #[error("model '{model}' declares field '{field}' more than once")]
    DuplicateField {
        /// Model being built.
        model: String,
        /// The repeated field name.
        field: String,
    },

    /// A validator or serializer was attached to a field that does not exist.
    #[error("model '{model}' has no field '{field}' (referenced by '{by}')")]
    UnknownField {
        /// Model being built.
        model: String,
        /// The missing field name.
        field: String,
        /// Name of the validator or serializer that referenced it.
        by: String,
    },

    /// Two fields accept the same input key, so routing would be ambiguous.
    #[error("model '{model}': input key '{key}' is accepted by both '{first}' and '{second}'")]
    AmbiguousInputKey {
        /// Model being built.
        model: String,
        /// The shared input key.
        key: String,
        /// The field declared first.
        first: String,
        /// The field declared second.
        second: String,
    },

    /// Two fields would be written under the same output key.
    #[error("model '{model}': output key '{key}' is produced by both '{first}' and '{second}'")]
    DuplicateOutputKey {
        /// Model being built.
        model: String,
        /// The shared output key.
        key: String,
        /// The field declared first.
        first: String,
        /// The field declared second.
        second: String,
    },

    /// A type descriptor that can never accept a value.
    #[error("invalid type for field '{field}': {reason}")]
    InvalidType {
        /// Field carrying the type.
        field: String,
        /// Reason the type is unusable.
        reason: String,
    },
}

/// Top-level error type for Morph entry points that can fail in more
/// than one way.
#[derive(Error, Debug)]
pub enum MorphError {
    /// Encoded input could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Decoded input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A model declaration is invalid.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

impl MorphError {
    /// The aggregated validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(e) => Some(e),
            _ => None,
        }
    }
}
