//! # Validate Subcommand
//!
//! Validates one payload against a built-in model and prints the dump.
//! A rejected payload fails the command with the full error report.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use morph_schema::{encode_text, DumpMode, DumpOptions};

use crate::input::load_payload;
use crate::models;

/// Projection printed after a successful validation.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Native values, rendered as JSON for display.
    #[default]
    Python,
    /// Text-safe values; custom JSON serializers apply.
    Json,
}

impl From<Mode> for DumpMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Python => DumpMode::Python,
            Mode::Json => DumpMode::Json,
        }
    }
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Built-in model to validate against.
    #[arg(long, short)]
    pub model: String,

    /// Payload file (`.json`, `.yaml` or `.yml`). Reads JSON from stdin if omitted.
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Key the output by output alias.
    #[arg(long)]
    pub by_alias: bool,

    /// Dump mode.
    #[arg(long, value_enum, default_value_t = Mode::Python)]
    pub mode: Mode,

    /// Drop null fields.
    #[arg(long)]
    pub exclude_none: bool,

    /// Drop fields filled from defaults.
    #[arg(long)]
    pub exclude_unset: bool,

    /// Pretty-print with this many spaces per level.
    #[arg(long)]
    pub indent: Option<usize>,
}

impl ValidateArgs {
    fn dump_options(&self) -> DumpOptions {
        let opts = DumpOptions::default()
            .mode(self.mode.into())
            .by_alias(self.by_alias)
            .exclude_none(self.exclude_none)
            .exclude_unset(self.exclude_unset);
        match self.indent {
            Some(spaces) => opts.indent(spaces),
            None => opts,
        }
    }
}

/// Run the subcommand and return the text to print.
///
/// # Errors
///
/// Fails on an unknown model, an unreadable payload, a rejected payload
/// or a failing serializer.
pub fn run(args: &ValidateArgs) -> anyhow::Result<String> {
    let spec = models::builtin(&args.model)?;
    let payload = load_payload(args.input.as_deref())?;

    let instance = spec.validate(&payload)?;
    tracing::info!(
        model = spec.name(),
        fields_set = instance.fields_set().len(),
        extras = instance.extras().len(),
        "payload accepted"
    );

    let opts = args.dump_options();
    let text = match opts.mode {
        DumpMode::Json => instance.dump_text(&opts)?,
        DumpMode::Python => encode_text(&instance.dump(&opts)?, opts.indent)?,
    };
    Ok(text)
}
