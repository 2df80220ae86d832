//! # morph-core — Foundational Types for Morph
//!
//! This crate is the leaf of the Morph workspace. It defines the pieces
//! every other crate agrees on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Errors are data.** A failed validation produces a
//!    [`ValidationError`] listing every [`FieldError`] with its location
//!    and [`ErrorKind`]; callers inspect it, they do not parse strings.
//!
//! 2. **Parse failures stand alone.** A [`ParseError`] means the input
//!    never reached field validation and is reported on its own.
//!
//! 3. **One date grammar.** Every text-to-date conversion goes through
//!    [`CalendarDate::parse()`], so the accepted forms are identical
//!    everywhere.
//!
//! 4. **Naming transforms are pure.** [`NamingTransform`] maps a field
//!    name to its default external name deterministically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `morph-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod naming;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::{
    ErrorKind, FieldError, Loc, LocItem, MorphError, ParseError, SchemaError, ValidationError,
};
pub use naming::{to_camel, to_pascal, to_snake, CustomTransform, NamingTransform};
pub use temporal::{CalendarDate, DateError};
