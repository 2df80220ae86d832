//! # morph-cli — Command-Line Front End
//!
//! Validates JSON or YAML payloads against a set of built-in demonstration
//! models and prints the resulting dump.
//!
//! ## Subcommands
//!
//! - `models` — Describe the built-in models and their resolved keys
//! - `validate` — Validate a payload and print its structural or JSON dump
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return the text to print.
//! - Handlers delegate to `morph-schema` and hold no validation logic.
//! - Logs go to stderr so stdout stays machine-readable.

pub mod input;
pub mod listing;
pub mod models;
pub mod validate;
