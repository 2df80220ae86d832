//! # Validator Pipeline
//!
//! Each field owns two ordered chains of named validators: `before`
//! runs on the raw input value ahead of coercion, `after` runs on the
//! coerced value.
//!
//! ## Ordering
//!
//! Chains are built by prepending. Declaring validators A, B, C against
//! the same field and stage executes C, then B, then A. The two stages
//! are ordered independently.
//!
//! ## Failure
//!
//! The first validator to fail stops its field's chain. Validators may
//! also transform the value; the next validator sees the result.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

/// Which side of coercion a validator runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// On the raw input value, before coercion.
    Before,
    /// On the coerced value, after coercion.
    After,
}

/// Rejection raised by a validator or a custom serializer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValueError {
    /// Human-readable reason.
    pub message: String,
}

impl ValueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Signature shared by every validator function.
pub type ValidatorFn = dyn Fn(Value) -> Result<Value, ValueError> + Send + Sync;

/// A named validator function.
#[derive(Clone)]
pub struct Validator {
    name: String,
    func: Arc<ValidatorFn>,
}

impl Validator {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the validator on `value`.
    pub fn call(&self, value: Value) -> Result<Value, ValueError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validator({})", self.name)
    }
}

/// An ordered chain of validators for one field and stage.
#[derive(Debug, Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Validator>,
}

impl ValidatorChain {
    /// Register a newly declared validator. It runs before every
    /// validator declared earlier.
    pub fn push_declared(&mut self, validator: Validator) {
        self.validators.insert(0, validator);
    }

    /// Validator names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.validators.iter().map(Validator::name).collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Thread `value` through the chain, stopping at the first failure.
    ///
    /// The returned error message is prefixed with the failing
    /// validator's name.
    pub fn run(&self, field: &str, mut value: Value) -> Result<Value, ValueError> {
        for validator in &self.validators {
            tracing::trace!(field, validator = validator.name(), "running validator");
            value = validator
                .call(value)
                .map_err(|e| ValueError::new(format!("{}: {}", validator.name(), e.message)))?;
        }
        Ok(value)
    }
}

/// Both validator chains of one field.
#[derive(Debug, Clone, Default)]
pub struct FieldPipeline {
    /// Runs on the raw value before coercion.
    pub before: ValidatorChain,
    /// Runs on the coerced value.
    pub after: ValidatorChain,
}

impl FieldPipeline {
    /// The chain for `stage`.
    pub fn chain(&self, stage: Stage) -> &ValidatorChain {
        match stage {
            Stage::Before => &self.before,
            Stage::After => &self.after,
        }
    }

    pub(crate) fn chain_mut(&mut self, stage: Stage) -> &mut ValidatorChain {
        match stage {
            Stage::Before => &mut self.before,
            Stage::After => &mut self.after,
        }
    }
}
