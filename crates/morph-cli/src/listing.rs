//! # Models Subcommand
//!
//! Describes the built-in models: configuration, then one line per field
//! with its type, accepted input keys, output key and attached functions.

use std::fmt::Write as _;

use clap::Args;
use morph_schema::{ExtraPolicy, ModelSpec};

use crate::models::{self, MODEL_NAMES};

/// Arguments for the models subcommand.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Describe only this model.
    pub name: Option<String>,
}

/// Run the subcommand and return the text to print.
///
/// # Errors
///
/// Fails on an unknown model name.
pub fn run(args: &ModelsArgs) -> anyhow::Result<String> {
    let names: Vec<&str> = match &args.name {
        Some(name) => vec![name.as_str()],
        None => MODEL_NAMES.to_vec(),
    };
    let mut blocks = Vec::with_capacity(names.len());
    for name in names {
        let spec = models::builtin(name)?;
        blocks.push(describe(&spec));
    }
    Ok(blocks.join("\n"))
}

/// Human-readable description of `spec`.
pub fn describe(spec: &ModelSpec) -> String {
    let config = spec.config();
    let extra = match config.extra {
        ExtraPolicy::Forbid => "forbid",
        ExtraPolicy::Ignore => "ignore",
        ExtraPolicy::Allow => "allow",
    };
    let naming = config
        .naming_transform
        .as_ref()
        .map_or("none", |t| t.name());

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{} (extra: {extra}, naming: {naming})", spec.name());
    for (field, keys) in spec.fields().iter().zip(spec.keys()) {
        let _ = write!(
            out,
            "  {}: {} in [{}] out {}",
            field.name(),
            field.field_type(),
            keys.input.join(", "),
            keys.output
        );
        if !field.is_required() {
            out.push_str(" (optional)");
        }
        let pipeline = field.pipeline();
        let before = pipeline.before.names();
        let after = pipeline.after.names();
        if !before.is_empty() {
            let _ = write!(out, " before [{}]", before.join(", "));
        }
        if !after.is_empty() {
            let _ = write!(out, " after [{}]", after.join(", "));
        }
        if let Some(ser) = field.serializer() {
            let _ = write!(out, " serializer {}", ser.name());
        }
        if let Some(desc) = field.get_description() {
            let _ = write!(out, " # {desc}");
        }
        out.push('\n');
    }
    out
}
