//! # morph CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Morph — declarative validation and aliasing for key/value payloads.
///
/// Validates JSON or YAML payloads against built-in models and prints
/// the validated record.
#[derive(Parser, Debug)]
#[command(name = "morph", version, about)]
struct Cli {
    /// Log line format on stderr. Levels come from `RUST_LOG`.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Describe the built-in models.
    Models(morph_cli::listing::ModelsArgs),
    /// Validate a payload and print its dump.
    Validate(morph_cli::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    let output = match &cli.command {
        Commands::Models(args) => morph_cli::listing::run(args)?,
        Commands::Validate(args) => morph_cli::validate::run(args)?,
    };
    println!("{output}");

    Ok(())
}
