//! # Built-in Models
//!
//! Demonstration models for validating payloads from the command line,
//! shaped after a typical camelCase user/product REST API:
//!
//! - `person`: forbids extras; every field but `last_name` has a default.
//! - `user`: `int | str | uuid4` id, with before/after validators on
//!   `last_name`.
//! - `product`: enum, date with a custom text serializer, separate input
//!   and output aliases.
//! - `account`: generated UUID4 id, extras kept.
//! - `profile`: nullable aliased field and an open-ended `address` map.

use std::sync::Arc;

use anyhow::{bail, Context};
use morph_core::NamingTransform;
use morph_schema::{
    EnumType, ExtraPolicy, FieldSpec, FieldType, ModelConfig, ModelSpec, Value, ValueError,
    WhenUsed,
};

/// Names accepted by [`builtin()`], in listing order.
pub const MODEL_NAMES: &[&str] = &["person", "user", "product", "account", "profile"];

/// Build the built-in model called `name`.
///
/// # Errors
///
/// Fails for an unknown name.
pub fn builtin(name: &str) -> anyhow::Result<Arc<ModelSpec>> {
    let spec = match name {
        "person" => person(),
        "user" => user(),
        "product" => product(),
        "account" => account(),
        "profile" => profile(),
        other => bail!(
            "unknown model '{other}' (available: {})",
            MODEL_NAMES.join(", ")
        ),
    };
    spec.with_context(|| format!("building model '{name}'"))
}

fn api_config() -> ModelConfig {
    ModelConfig::default()
        .naming_transform(NamingTransform::Camel)
        .populate_by_name(true)
        .strip_whitespace(true)
        .validate_defaults(true)
        .validate_on_assignment(true)
}

fn new_uuid4() -> Value {
    Value::Uuid(uuid::Uuid::new_v4())
}

fn person() -> anyhow::Result<Arc<ModelSpec>> {
    Ok(ModelSpec::builder("Person")
        .config(
            ModelConfig::default()
                .naming_transform(NamingTransform::Camel)
                .populate_by_name(true)
                .extra(ExtraPolicy::Forbid),
        )
        .field(FieldSpec::new("id_", FieldType::Int).alias("id").default(1))
        .field(FieldSpec::new("first_name", FieldType::Str.nullable()).default(Value::Null))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .field(FieldSpec::new("age", FieldType::Int.nullable()).default(Value::Null))
        .build()?)
}

fn user() -> anyhow::Result<Arc<ModelSpec>> {
    Ok(ModelSpec::builder("User")
        .config(api_config())
        .field(
            FieldSpec::new(
                "user_id",
                FieldType::union([FieldType::Int, FieldType::Str, FieldType::uuid4()]),
            )
            .alias("id"),
        )
        .field(FieldSpec::new("first_name", FieldType::Str))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .field(FieldSpec::new("age", FieldType::Int))
        .field(FieldSpec::new("email", FieldType::Str))
        .after("last_name", "min_length", |v| match v.as_str() {
            Some(s) if s.chars().count() < 3 => {
                Err(ValueError::new("last_name must be at least 3 characters"))
            }
            _ => Ok(v),
        })
        .after("last_name", "capitalized", |v| match v.as_str() {
            Some(s) if s.chars().next().is_some_and(char::is_lowercase) => {
                Err(ValueError::new("last name must start with an uppercase letter"))
            }
            _ => Ok(v),
        })
        .after("last_name", "not_c", |v| match v.as_str().map(str::to_uppercase) {
            Some(s) if s.starts_with('C') => {
                Err(ValueError::new("last name must not start with c"))
            }
            Some(s) => Ok(Value::Str(s)),
            None => Ok(v),
        })
        .before("last_name", "raw_min_length", |v| match v.as_str() {
            Some(s) if s.chars().count() < 3 => {
                Err(ValueError::new("last_name must be at least 3 characters"))
            }
            _ => Ok(v),
        })
        .build()?)
}

fn product_type() -> EnumType {
    EnumType::new(
        "ProductType",
        [
            ("SOFTWARE", "software"),
            ("ACCESSORIES", "accessories"),
            ("HARDWARE", "hardware"),
            ("COURSES", "courses"),
        ],
    )
}

fn product() -> anyhow::Result<Arc<ModelSpec>> {
    Ok(ModelSpec::builder("Product")
        .config(api_config())
        .field(
            FieldSpec::new(
                "product_id",
                FieldType::union([FieldType::Str, FieldType::Int]).nullable(),
            )
            .default(Value::Null),
        )
        .field(FieldSpec::new("product_type", FieldType::enumeration(product_type())).alias("type"))
        .field(FieldSpec::new("is_returnable", FieldType::Bool).default(false))
        .field(FieldSpec::new("manufactured_date", FieldType::Date).input_alias("completionDate"))
        .field(
            FieldSpec::new("base_msrp_usd", FieldType::Float)
                .input_alias("msrpUSD")
                .output_alias("baseMSRPUSD"),
        )
        .field(
            FieldSpec::new("number_of_components", FieldType::Int)
                .input_alias("doors")
                .default(4),
        )
        .field(FieldSpec::new("code", FieldType::Str.nullable()).default(Value::Null))
        .field(FieldSpec::new("country_of_origin", FieldType::Str.nullable()).default(Value::Null))
        .serializer(
            "manufactured_date",
            "slash_date",
            WhenUsed::JsonUnlessNone,
            |v| match v.as_date() {
                Some(d) => Ok(Value::Str(d.format("%Y/%m/%d"))),
                None => Err(ValueError::new("expected a date")),
            },
        )
        .build()?)
}

fn account() -> anyhow::Result<Arc<ModelSpec>> {
    Ok(ModelSpec::builder("Account")
        .config(api_config().extra(ExtraPolicy::Allow))
        .field(
            FieldSpec::new("user_id", FieldType::uuid4())
                .alias("id")
                .default_factory(new_uuid4),
        )
        .field(FieldSpec::new("email", FieldType::Str))
        .build()?)
}

fn profile() -> anyhow::Result<Arc<ModelSpec>> {
    Ok(ModelSpec::builder("Profile")
        .config(api_config())
        .field(
            FieldSpec::new(
                "user_id",
                FieldType::union([FieldType::Int, FieldType::Str, FieldType::uuid4()]),
            )
            .alias("id")
            .default_factory(new_uuid4),
        )
        .field(FieldSpec::new("date_of_birth", FieldType::Str.nullable()).alias("birthDate"))
        .field(FieldSpec::new("email", FieldType::Str).default("unknown@unknown.com"))
        .field(FieldSpec::new("first_name", FieldType::Str))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .field(FieldSpec::new("age", FieldType::Int))
        .field(
            FieldSpec::new("address", FieldType::Dict)
                .description("postal address, kept as supplied"),
        )
        .build()?)
}
