//! # morph-schema — Validation & Aliasing Engine
//!
//! Turns untrusted, loosely typed key/value input into validated records,
//! and turns those records back into structural or JSON-text projections.
//!
//! ## Pipeline
//!
//! raw input → alias resolution ([`alias`]) → before-validators →
//! coercion ([`coerce`]) → after-validators ([`pipeline`]) →
//! [`ModelInstance`] → on demand, [`serialize`].
//!
//! ## Declaring a Model
//!
//! Models are declared once with [`ModelSpec::builder()`] and frozen into
//! an `Arc<ModelSpec>`. Input and output keys are resolved at build time;
//! declaration mistakes (duplicate fields, ambiguous keys, validators on
//! undeclared fields) fail the build with a `SchemaError` instead of
//! surfacing on the first input.
//!
//! ## Crate Policy
//!
//! - Depends only on `morph-core` internally.
//! - Field failures are collected, never thrown one at a time: a single
//!   construction reports every problem it found.
//! - Specs are immutable and `Send + Sync`; every closure they hold is too.
//! - No I/O. Callers hand the engine parsed values or JSON text.

pub mod alias;
pub mod coerce;
pub mod field;
pub mod instance;
pub mod model;
pub mod pipeline;
pub mod serialize;
pub mod types;
pub mod value;

pub use alias::{resolve_input_keys, resolve_output_key, ResolvedKeys};
pub use coerce::{coerce, CoerceOptions, CoercionError};
pub use field::{DefaultValue, FieldSerializer, FieldSpec, WhenUsed};
pub use instance::ModelInstance;
pub use model::{ExtraPolicy, ModelConfig, ModelSpec, ModelSpecBuilder};
pub use pipeline::{FieldPipeline, Stage, Validator, ValidatorChain, ValueError};
pub use serialize::{dump, dump_text, encode_text, DumpMode, DumpOptions, SerializationError};
pub use types::{EnumType, FieldType};
pub use value::{EnumValue, Map, Value};
