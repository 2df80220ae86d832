//! # Model Instances — Validated Construction and Assignment
//!
//! A [`ModelInstance`] is a record that has passed validation against a
//! [`ModelSpec`]. It can only be created through [`ModelInstance::validate()`]
//! (or its JSON-text sibling) and only be changed through
//! [`ModelInstance::set()`].
//!
//! ## Construction
//!
//! Every field is processed independently, in declaration order:
//!
//! 1. The first accepted input key present supplies the raw value.
//!    Otherwise the default (or a fresh default-factory value) is used,
//!    or the field is recorded as missing.
//! 2. Unless `validate_defaults` is on, a default skips steps 3 and 4.
//! 3. Strings are whitespace-stripped if enabled, then the before-chain
//!    runs on the raw value.
//! 4. The value is coerced to the declared type.
//! 5. The after-chain runs on the coerced value.
//!
//! A failure stops that field only. Every failure across all fields, plus
//! one `UnknownField` per unmatched key under [`ExtraPolicy::Forbid`], is
//! reported together in one [`ValidationError`].

use std::fmt;
use std::sync::Arc;

use morph_core::{FieldError, Loc, MorphError, ParseError, ValidationError};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};

use crate::coerce::{coerce, CoerceOptions};
use crate::model::{ExtraPolicy, ModelSpec};
use crate::serialize::DumpOptions;
use crate::value::{Map, Value};

/// A validated record.
#[derive(Clone)]
pub struct ModelInstance {
    spec: Arc<ModelSpec>,
    values: Vec<Value>,
    extras: Map,
    fields_set: Vec<bool>,
}

impl ModelInstance {
    /// Validate a native mapping against `spec`.
    ///
    /// An instance of the same spec is accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every field-level failure.
    pub fn validate(spec: &Arc<ModelSpec>, raw: &Value) -> Result<Self, ValidationError> {
        let map = match raw {
            Value::Map(map) => map,
            Value::Model(m) if Arc::ptr_eq(&m.spec, spec) => return Ok((**m).clone()),
            other => {
                let got = match other {
                    Value::Model(m) => m.spec.name().to_string(),
                    _ => other.type_name().to_string(),
                };
                return Err(ValidationError::new(
                    spec.name(),
                    vec![FieldError::coercion(
                        Loc::root(),
                        format!(
                            "input should be a valid dictionary or instance of {}, got {got}",
                            spec.name()
                        ),
                    )],
                ));
            }
        };

        let config = spec.config();
        let n = spec.fields().len();
        let mut values = Vec::with_capacity(n);
        let mut fields_set = Vec::with_capacity(n);
        let mut errors = Vec::new();

        for (i, field) in spec.fields().iter().enumerate() {
            let supplied = spec.keys()[i].input.iter().find_map(|k| map.get(k));
            let (raw_value, from_default) = match (supplied, field.default_value()) {
                (Some(v), _) => (v.clone(), false),
                (None, Some(default)) => {
                    tracing::trace!(model = spec.name(), field = field.name(), "using default");
                    (default.produce(), true)
                }
                (None, None) => {
                    errors.push(FieldError::missing(field.name()));
                    values.push(Value::Null);
                    fields_set.push(false);
                    continue;
                }
            };
            fields_set.push(!from_default);

            let outcome = if from_default && !config.validate_defaults {
                field
                    .pipeline()
                    .after
                    .run(field.name(), raw_value)
                    .map_err(|e| vec![FieldError::validator(field.name(), e.message)])
            } else {
                run_field(spec, i, raw_value)
            };
            match outcome {
                Ok(v) => values.push(v),
                Err(field_errors) => {
                    errors.extend(field_errors);
                    values.push(Value::Null);
                }
            }
        }

        let mut extras = Map::new();
        for (key, value) in map {
            if spec.field_for_key(key).is_some() {
                continue;
            }
            match config.extra {
                ExtraPolicy::Forbid => errors.push(FieldError::unknown(key)),
                ExtraPolicy::Ignore => {
                    tracing::trace!(model = spec.name(), key = key.as_str(), "ignoring extra key");
                }
                ExtraPolicy::Allow => {
                    extras.insert(key.clone(), value.clone());
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(model = spec.name(), errors = errors.len(), "validation failed");
            return Err(ValidationError::new(spec.name(), errors));
        }
        tracing::debug!(model = spec.name(), extras = extras.len(), "validated");

        Ok(Self {
            spec: Arc::clone(spec),
            values,
            extras,
            fields_set,
        })
    }

    /// Validate a parsed JSON tree against `spec`.
    ///
    /// # Errors
    ///
    /// See [`ModelInstance::validate()`].
    pub fn validate_json_value(
        spec: &Arc<ModelSpec>,
        json: &serde_json::Value,
    ) -> Result<Self, ValidationError> {
        Self::validate(spec, &Value::from(json))
    }

    /// Parse JSON text, then validate it against `spec`.
    ///
    /// # Errors
    ///
    /// [`MorphError::Parse`] if the text is not JSON; no field is looked at
    /// in that case. [`MorphError::Validation`] otherwise.
    pub fn validate_json(spec: &Arc<ModelSpec>, text: &str) -> Result<Self, MorphError> {
        let raw: Value = serde_json::from_str(text).map_err(ParseError::from)?;
        Ok(Self::validate(spec, &raw)?)
    }

    /// Assign `value` to the field called `name`.
    ///
    /// With `validate_on_assignment`, the value goes through the field's
    /// before-chain, coercion and after-chain first, and a failure leaves
    /// the instance untouched. An undeclared name is stored as an extra
    /// under [`ExtraPolicy::Allow`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] scoped to the single field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let value = value.into();
        let Some(i) = self.spec.field_index(name) else {
            if self.spec.config().extra == ExtraPolicy::Allow {
                self.extras.insert(name.to_string(), value);
                return Ok(());
            }
            return Err(ValidationError::new(
                self.spec.name(),
                vec![FieldError::unknown(name)],
            ));
        };

        let stored = if self.spec.config().validate_on_assignment {
            run_field(&self.spec, i, value)
                .map_err(|errors| ValidationError::new(self.spec.name(), errors))?
        } else {
            value
        };
        self.values[i] = stored;
        self.fields_set[i] = true;
        Ok(())
    }

    /// The model this instance was validated against.
    pub fn spec(&self) -> &Arc<ModelSpec> {
        &self.spec
    }

    /// Value of the field called `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.spec.field_index(name).map(|i| &self.values[i])
    }

    /// Extras kept under [`ExtraPolicy::Allow`], in input order.
    pub fn extras(&self) -> &Map {
        &self.extras
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Returns true if the field was supplied in the input or assigned
    /// since, rather than filled from its default.
    pub fn is_set(&self, name: &str) -> bool {
        self.spec
            .field_index(name)
            .is_some_and(|i| self.fields_set[i])
    }

    /// Names of the fields that are set, in declaration order.
    pub fn fields_set(&self) -> Vec<&str> {
        self.spec
            .fields()
            .iter()
            .zip(&self.fields_set)
            .filter(|(_, set)| **set)
            .map(|(f, _)| f.name())
            .collect()
    }

    /// `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.spec
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.values.iter())
    }

    pub(crate) fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn set_flags(&self) -> &[bool] {
        &self.fields_set
    }
}

impl ModelSpec {
    /// Validate a native mapping against this model.
    ///
    /// # Errors
    ///
    /// See [`ModelInstance::validate()`].
    pub fn validate(self: &Arc<Self>, raw: &Value) -> Result<ModelInstance, ValidationError> {
        ModelInstance::validate(self, raw)
    }

    /// Parse and validate JSON text against this model.
    ///
    /// # Errors
    ///
    /// See [`ModelInstance::validate_json()`].
    pub fn validate_json(self: &Arc<Self>, text: &str) -> Result<ModelInstance, MorphError> {
        ModelInstance::validate_json(self, text)
    }
}

/// Steps 3 to 5 for one field.
fn run_field(spec: &ModelSpec, index: usize, raw: Value) -> Result<Value, Vec<FieldError>> {
    let field = &spec.fields()[index];
    let name = field.name();
    let strip = spec.strips(index);

    let raw = match raw {
        Value::Str(s) if strip && field.field_type().is_string_typed() => {
            Value::Str(s.trim().to_string())
        }
        other => other,
    };
    let raw = field
        .pipeline()
        .before
        .run(name, raw)
        .map_err(|e| vec![FieldError::validator(name, e.message)])?;
    let coerced = coerce(
        &raw,
        field.field_type(),
        CoerceOptions {
            strip_whitespace: strip,
        },
    )
    .map_err(|e| e.into_field_errors(&Loc::field(name)))?;
    field
        .pipeline()
        .after
        .run(name, coerced)
        .map_err(|e| vec![FieldError::validator(name, e.message)])
}

impl PartialEq for ModelInstance {
    fn eq(&self, other: &Self) -> bool {
        self.spec.name() == other.spec.name()
            && self.values == other.values
            && self.extras == other.extras
    }
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.spec.name());
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        for (key, value) in &self.extras {
            s.field(key, value);
        }
        s.finish()
    }
}

impl Serialize for ModelInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.dump(&DumpOptions::json())
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::model::ModelConfig;
    use crate::pipeline::ValueError;
    use crate::types::FieldType;
    use morph_core::{ErrorKind, NamingTransform};
    use serde_json::json;

    fn person() -> Arc<ModelSpec> {
        ModelSpec::builder("Person")
            .config(ModelConfig::default().naming_transform(NamingTransform::Camel))
            .field(FieldSpec::new("first_name", FieldType::Str))
            .field(FieldSpec::new("last_name", FieldType::Str))
            .field(FieldSpec::new("age", FieldType::Int))
            .build()
            .unwrap()
    }

    #[test]
    fn test_camel_input_with_string_age() {
        let p = ModelInstance::validate_json_value(
            &person(),
            &json!({"firstName": "Sophia", "lastName": "Brown", "age": "42"}),
        )
        .unwrap();
        assert_eq!(p.get("age"), Some(&Value::Int(42)));
        assert_eq!(p.get("first_name"), Some(&Value::from("Sophia")));
        assert_eq!(p.fields_set(), ["first_name", "last_name", "age"]);
    }

    #[test]
    fn test_canonical_key_rejected_without_populate_by_name() {
        let err = ModelInstance::validate_json_value(
            &person(),
            &json!({"first_name": "Sophia", "lastName": "Brown", "age": 42}),
        )
        .unwrap_err();
        assert!(err.has("first_name", ErrorKind::MissingRequiredField));
        assert_eq!(err.len(), 1);
    }

    #[test]
    fn test_all_failures_aggregated() {
        let err = ModelInstance::validate_json_value(&person(), &json!({"age": "old"}))
            .unwrap_err();
        assert_eq!(err.model(), "Person");
        assert_eq!(err.len(), 3);
        assert!(err.has("first_name", ErrorKind::MissingRequiredField));
        assert!(err.has("last_name", ErrorKind::MissingRequiredField));
        assert!(err.has("age", ErrorKind::TypeCoercion));
    }

    #[test]
    fn test_null_on_required_field_is_coercion_error() {
        let err = ModelInstance::validate_json_value(
            &person(),
            &json!({"firstName": null, "lastName": "Brown", "age": 1}),
        )
        .unwrap_err();
        let e = err.for_field("first_name").next().unwrap();
        assert_eq!(e.kind, ErrorKind::TypeCoercion);
        assert_eq!(e.message, "input should not be null");
    }

    #[test]
    fn test_non_mapping_input() {
        let err = person().validate(&Value::from("Sophia")).unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.errors()[0].loc.is_root());
        assert_eq!(err.errors()[0].kind, ErrorKind::TypeCoercion);
    }

    #[test]
    fn test_validate_json_parse_error_is_distinct() {
        let err = person().validate_json("{\"firstName\": ").unwrap_err();
        assert!(matches!(err, MorphError::Parse(_)));
        let err = person().validate_json("{}").unwrap_err();
        assert_eq!(err.as_validation().map(ValidationError::len), Some(3));
    }

    #[test]
    fn test_same_spec_instance_passes_through() {
        let spec = person();
        let p = spec
            .validate_json(r#"{"firstName": "A", "lastName": "B", "age": 1}"#)
            .unwrap();
        let again = spec.validate(&Value::from(p.clone())).unwrap();
        assert_eq!(again, p);
    }

    #[test]
    fn test_alias_beats_canonical_when_both_present() {
        let spec = ModelSpec::builder("User")
            .config(ModelConfig::default().populate_by_name(true).extra(ExtraPolicy::Forbid))
            .field(FieldSpec::new("user_id", FieldType::Int).alias("id"))
            .build()
            .unwrap();
        let u = spec.validate(&json!({"user_id": 1, "id": 2}).into()).unwrap();
        assert_eq!(u.get("user_id"), Some(&Value::Int(2)));
        // The losing key is consumed, not an extra.
        assert!(u.extras().is_empty());
    }

    #[test]
    fn test_assignment_revalidates() {
        let spec = ModelSpec::builder("Person")
            .config(
                ModelConfig::default()
                    .validate_on_assignment(true)
                    .strip_whitespace(true),
            )
            .field(FieldSpec::new("age", FieldType::Int))
            .field(FieldSpec::new("name", FieldType::Str).default("anon"))
            .after("age", "non_negative", |v| match v.as_i64() {
                Some(n) if n < 0 => Err(ValueError::new("must be non-negative")),
                _ => Ok(v),
            })
            .before("age", "drop_years", |v| match v.as_str() {
                Some(s) => Ok(Value::from(s.trim_end_matches(" years").to_string())),
                None => Ok(v),
            })
            .before("name", "no_digits", |v| match v.as_str() {
                Some(s) if s.starts_with(|c: char| c.is_ascii_digit()) => {
                    Err(ValueError::new("must not start with a digit"))
                }
                _ => Ok(v),
            })
            .build()
            .unwrap();
        let mut p = spec.validate(&json!({"age": 3}).into()).unwrap();

        p.set("age", "7").unwrap();
        assert_eq!(p.get("age"), Some(&Value::Int(7)));

        p.set("age", "12 years").unwrap();
        assert_eq!(p.get("age"), Some(&Value::Int(12)));
        p.set("age", 7).unwrap();

        // Stripped before the before-chain sees it.
        p.set("name", "  Sophia ").unwrap();
        assert_eq!(p.get("name"), Some(&Value::from("Sophia")));
        let err = p.set("name", " 9lives").unwrap_err();
        assert!(err.has("name", ErrorKind::Validator));
        assert_eq!(p.get("name"), Some(&Value::from("Sophia")));

        let err = p.set("age", -1).unwrap_err();
        assert!(err.has("age", ErrorKind::Validator));
        assert_eq!(p.get("age"), Some(&Value::Int(7)));

        let err = p.set("age", "x").unwrap_err();
        assert!(err.has("age", ErrorKind::TypeCoercion));
        assert_eq!(p.get("age"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_strip_reaches_list_items() {
        let spec = ModelSpec::builder("Post")
            .config(ModelConfig::default().strip_whitespace(true))
            .field(FieldSpec::new("name", FieldType::Str))
            .field(FieldSpec::new("tags", FieldType::list(FieldType::Str)))
            .field(FieldSpec::new("raw", FieldType::list(FieldType::Str)).strip_whitespace(false))
            .build()
            .unwrap();
        let p = spec
            .validate(&json!({"name": " a ", "tags": [" x ", "y "], "raw": [" z "]}).into())
            .unwrap();
        assert_eq!(p.get("name"), Some(&Value::from("a")));
        assert_eq!(
            p.get("tags"),
            Some(&Value::List(vec![Value::from("x"), Value::from("y")]))
        );
        assert_eq!(p.get("raw"), Some(&Value::List(vec![Value::from(" z ")])));
    }

    #[test]
    fn test_assignment_without_revalidation_stores_as_is() {
        let spec = ModelSpec::builder("Person")
            .field(FieldSpec::new("age", FieldType::Int).default(0))
            .build()
            .unwrap();
        let mut p = spec.validate(&Value::Map(Map::new())).unwrap();
        assert!(!p.is_set("age"));
        p.set("age", "not a number").unwrap();
        assert_eq!(p.get("age"), Some(&Value::from("not a number")));
        assert!(p.is_set("age"));
    }

    #[test]
    fn test_assign_unknown_name() {
        let spec = ModelSpec::builder("M")
            .field(FieldSpec::new("a", FieldType::Int))
            .build()
            .unwrap();
        let mut m = spec.validate(&json!({"a": 1}).into()).unwrap();
        let err = m.set("b", 2).unwrap_err();
        assert!(err.has("b", ErrorKind::UnknownField));

        let spec = ModelSpec::builder("M")
            .config(ModelConfig::default().extra(ExtraPolicy::Allow))
            .field(FieldSpec::new("a", FieldType::Int))
            .build()
            .unwrap();
        let mut m = spec.validate(&json!({"a": 1}).into()).unwrap();
        m.set("b", 2).unwrap();
        assert_eq!(m.extra("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_strip_whitespace_before_validators() {
        let spec = ModelSpec::builder("M")
            .config(ModelConfig::default().strip_whitespace(true))
            .field(FieldSpec::new("name", FieldType::Str))
            .field(FieldSpec::new("raw", FieldType::Str).strip_whitespace(false))
            .before("name", "seen", |v| {
                assert_eq!(v.as_str(), Some("Sophia"));
                Ok(v)
            })
            .build()
            .unwrap();
        let m = spec
            .validate(&json!({"name": "  Sophia ", "raw": " x "}).into())
            .unwrap();
        assert_eq!(m.get("name"), Some(&Value::from("Sophia")));
        assert_eq!(m.get("raw"), Some(&Value::from(" x ")));
    }

    #[test]
    fn test_defaults_skip_coercion_unless_enabled() {
        let build = |validate_defaults: bool| {
            ModelSpec::builder("M")
                .config(ModelConfig::default().validate_defaults(validate_defaults))
                .field(FieldSpec::new("count", FieldType::Int).default("4"))
                .build()
                .unwrap()
        };
        let m = build(false).validate(&Value::Map(Map::new())).unwrap();
        assert_eq!(m.get("count"), Some(&Value::from("4")));
        let m = build(true).validate(&Value::Map(Map::new())).unwrap();
        assert_eq!(m.get("count"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_debug_names_model() {
        let p = person()
            .validate(&json!({"firstName": "A", "lastName": "B", "age": 1}).into())
            .unwrap();
        let dbg = format!("{p:?}");
        assert!(dbg.starts_with("Person {"));
        assert!(dbg.contains("first_name"));
    }
}
