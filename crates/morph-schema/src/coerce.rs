//! # Type Coercion Engine
//!
//! Converts a raw [`Value`] into a field's declared [`FieldType`], or
//! explains why it cannot.
//!
//! ## Lax Conversions
//!
//! | Target  | Accepts                                                        |
//! |---------|----------------------------------------------------------------|
//! | `int`   | ints, zero-fraction floats, strings matching `[+-]?[0-9]+`      |
//! | `float` | floats, ints, strings holding a finite decimal                  |
//! | `bool`  | bools, ints `0`/`1`, `true`/`false`/`yes`/`no`/`on`/`off` etc.  |
//! | `str`   | strings only                                                    |
//! | `date`  | dates, `YYYY-M-D` strings naming a real day                     |
//! | `uuid`  | UUIDs, any textual UUID form; version checked when pinned       |
//! | enum    | members of the same enum, strings equal to a member's value     |
//!
//! String parsing is strict: no partial parses, no silent truncation,
//! no wrap-around on overflow.
//!
//! Unions try their members in declaration order and keep the first
//! success. Nested models run full model validation and report their
//! errors with location paths relative to the field.

use std::sync::Arc;

use morph_core::{CalendarDate, FieldError, Loc};
use thiserror::Error;
use uuid::Uuid;

use crate::instance::ModelInstance;
use crate::types::{EnumType, FieldType};
use crate::value::Value;

/// Normalization applied while coercing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoerceOptions {
    /// Strip surrounding whitespace from string values.
    pub strip_whitespace: bool,
}

/// Why a value could not be converted to its declared type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Null (or nothing) where the type is not nullable.
    #[error("input should not be null")]
    MissingOrNull,

    /// The value's kind can never convert to the target.
    #[error("input should be {expected}, got {got}")]
    Mismatch {
        /// Description of the target, e.g. `a valid integer`.
        expected: String,
        /// Kind of the value supplied.
        got: String,
    },

    /// The value has the right kind but the wrong content.
    #[error("input should be {expected}: {message}")]
    Invalid {
        /// Description of the target.
        expected: String,
        /// What was wrong with the content.
        message: String,
    },

    /// Every member of a union failed. One entry per member, in order.
    #[error("{}", union_message(.0))]
    Union(Vec<(String, CoercionError)>),

    /// Failures inside a list or nested model, located relative to the
    /// value being coerced.
    #[error("{} error(s) in nested value", .0.len())]
    Nested(Vec<FieldError>),
}

fn union_message(branches: &[(String, CoercionError)]) -> String {
    let parts: Vec<String> = branches
        .iter()
        .map(|(member, err)| format!("{member}: {err}"))
        .collect();
    format!("no union member matched ({})", parts.join("; "))
}

impl CoercionError {
    fn mismatch(expected: &str, got: &Value) -> Self {
        Self::Mismatch {
            expected: expected.to_string(),
            got: got.type_name().to_string(),
        }
    }

    fn invalid(expected: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            expected: expected.to_string(),
            message: message.into(),
        }
    }

    /// Field-level errors for a failure at `loc`. Nested failures keep
    /// their own paths underneath `loc`.
    pub fn into_field_errors(self, loc: &Loc) -> Vec<FieldError> {
        match self {
            Self::Nested(errors) => errors
                .into_iter()
                .map(|e| {
                    loc.items()
                        .iter()
                        .rev()
                        .fold(e, |e, item| e.prefixed(item.clone()))
                })
                .collect(),
            other => vec![FieldError::coercion(loc.clone(), other.to_string())],
        }
    }
}

const INT: &str = "a valid integer";
const FLOAT: &str = "a valid number";
const BOOL: &str = "a valid boolean";
const STR: &str = "a valid string";
const DATE: &str = "a valid date";
const UUID: &str = "a valid UUID";
const DICT: &str = "a valid dictionary";

/// Convert `raw` to `ty`.
///
/// # Errors
///
/// Returns a [`CoercionError`] describing the first reason the value
/// cannot be converted (or, for unions, every member's reason).
pub fn coerce(raw: &Value, ty: &FieldType, opts: CoerceOptions) -> Result<Value, CoercionError> {
    if raw.is_null() {
        return if ty.accepts_null() {
            Ok(Value::Null)
        } else {
            Err(CoercionError::MissingOrNull)
        };
    }

    match ty {
        FieldType::Any => Ok(raw.clone()),
        FieldType::Nullable(inner) => coerce(raw, inner, opts),
        FieldType::Bool => coerce_bool(raw),
        FieldType::Int => coerce_int(raw),
        FieldType::Float => coerce_float(raw),
        FieldType::Str => match raw {
            Value::Str(s) if opts.strip_whitespace => Ok(Value::Str(s.trim().to_string())),
            Value::Str(_) => Ok(raw.clone()),
            other => Err(CoercionError::mismatch(STR, other)),
        },
        FieldType::Date => coerce_date(raw),
        FieldType::Uuid { version } => coerce_uuid(raw, *version),
        FieldType::Enum(e) => coerce_enum(raw, e),
        FieldType::List(item) => coerce_list(raw, item, opts),
        FieldType::Dict => match raw {
            Value::Map(_) => Ok(raw.clone()),
            other => Err(CoercionError::mismatch(DICT, other)),
        },
        FieldType::Model(spec) => ModelInstance::validate(spec, raw)
            .map(Value::from)
            .map_err(|e| CoercionError::Nested(e.into_inner())),
        FieldType::Union(members) => {
            let mut branches = Vec::with_capacity(members.len());
            for member in members {
                match coerce(raw, member, opts) {
                    Ok(v) => return Ok(v),
                    Err(e) => branches.push((member.to_string(), e)),
                }
            }
            Err(CoercionError::Union(branches))
        }
    }
}

fn coerce_int(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Int(_) => Ok(raw.clone()),
        Value::Float(f) => {
            // i64::MAX is not exactly representable; 2^63 is the first
            // float past the range.
            if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                Ok(Value::Int(*f as i64))
            } else if f.is_finite() && f.fract() != 0.0 {
                Err(CoercionError::invalid(INT, "got a number with a fractional part"))
            } else {
                Err(CoercionError::invalid(INT, "number out of range"))
            }
        }
        Value::Str(s) => parse_int(s.trim()).map(Value::Int),
        other => Err(CoercionError::mismatch(INT, other)),
    }
}

fn parse_int(s: &str) -> Result<i64, CoercionError> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoercionError::invalid(INT, "unable to parse string as an integer"));
    }
    s.parse::<i64>()
        .map_err(|_| CoercionError::invalid(INT, "number out of range"))
}

fn coerce_float(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Float(_) => Ok(raw.clone()),
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Str(s) => {
            let t = s.trim();
            let looks_numeric = !t.is_empty()
                && t
                    .bytes()
                    .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
            match t.parse::<f64>() {
                Ok(f) if looks_numeric && f.is_finite() => Ok(Value::Float(f)),
                _ => Err(CoercionError::invalid(FLOAT, "unable to parse string as a number")),
            }
        }
        other => Err(CoercionError::mismatch(FLOAT, other)),
    }
}

fn coerce_bool(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Int(_) => Err(CoercionError::invalid(BOOL, "integer is not 0 or 1")),
        Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "f" | "n" => Ok(Value::Bool(false)),
            _ => Err(CoercionError::invalid(BOOL, "unable to interpret string as a boolean")),
        },
        other => Err(CoercionError::mismatch(BOOL, other)),
    }
}

fn coerce_date(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Date(_) => Ok(raw.clone()),
        Value::Str(s) => CalendarDate::parse(s)
            .map(Value::Date)
            .map_err(|e| CoercionError::invalid(DATE, e.to_string())),
        other => Err(CoercionError::mismatch(DATE, other)),
    }
}

fn coerce_uuid(raw: &Value, version: Option<usize>) -> Result<Value, CoercionError> {
    let uuid = match raw {
        Value::Uuid(u) => *u,
        Value::Str(s) => Uuid::parse_str(s.trim())
            .map_err(|e| CoercionError::invalid(UUID, e.to_string()))?,
        other => return Err(CoercionError::mismatch(UUID, other)),
    };
    match version {
        Some(v) if uuid.get_version_num() != v => Err(CoercionError::invalid(
            UUID,
            format!("expected version {v}, got version {}", uuid.get_version_num()),
        )),
        _ => Ok(Value::Uuid(uuid)),
    }
}

fn coerce_enum(raw: &Value, e: &Arc<EnumType>) -> Result<Value, CoercionError> {
    let expected = e.expected_values();
    match raw {
        Value::Enum(member) if e.contains(member) => Ok(raw.clone()),
        Value::Enum(member) => Err(CoercionError::invalid(
            &expected,
            format!("got member of '{}'", member.enum_name),
        )),
        Value::Str(s) => e
            .from_value(s)
            .map(Value::Enum)
            .ok_or_else(|| CoercionError::invalid(&expected, format!("got '{s}'"))),
        other => Err(CoercionError::mismatch(&expected, other)),
    }
}

fn coerce_list(raw: &Value, item: &FieldType, opts: CoerceOptions) -> Result<Value, CoercionError> {
    let Value::List(items) = raw else {
        return Err(CoercionError::mismatch("a valid list", raw));
    };
    let mut out = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (i, element) in items.iter().enumerate() {
        match coerce(element, item, opts) {
            Ok(v) => out.push(v),
            Err(e) => errors.extend(e.into_field_errors(&Loc::root().prefixed(i))),
        }
    }
    if errors.is_empty() {
        Ok(Value::List(out))
    } else {
        Err(CoercionError::Nested(errors))
    }
}
