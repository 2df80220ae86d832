//! # Alias Resolution
//!
//! Computes, for one field, the input keys it accepts and the single key
//! it is written under in by-alias dumps.
//!
//! ## Precedence
//!
//! - Output: explicit `output_alias`, then the model's naming transform,
//!   then the canonical name.
//! - Input: explicit `input_alias` if set, otherwise the transformed
//!   name. The canonical name is also accepted when `populate_by_name` is
//!   on or when no alias or transform applies.
//!
//! Accepted keys are returned in precedence order. When an input carries
//! several of them, the first present one supplies the value and the rest
//! are treated as consumed.

use crate::field::FieldSpec;
use crate::model::ModelConfig;

/// Cached key resolution for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKeys {
    /// Accepted input keys, highest precedence first. Never empty.
    pub input: Vec<String>,
    /// Key used in by-alias dumps.
    pub output: String,
}

impl ResolvedKeys {
    pub(crate) fn resolve(field: &FieldSpec, config: &ModelConfig) -> Self {
        Self {
            input: resolve_input_keys(field, config),
            output: resolve_output_key(field, config),
        }
    }
}

/// Input keys accepted for `field`, highest precedence first.
pub fn resolve_input_keys(field: &FieldSpec, config: &ModelConfig) -> Vec<String> {
    let name = field.name();
    let primary = match (field.get_input_alias(), &config.naming_transform) {
        (Some(alias), _) => Some(alias.to_string()),
        (None, Some(transform)) => Some(transform.apply(name)),
        (None, None) => None,
    };

    let mut keys = Vec::with_capacity(2);
    match primary {
        Some(key) => {
            let same = key == name;
            keys.push(key);
            if config.populate_by_name && !same {
                keys.push(name.to_string());
            }
        }
        None => keys.push(name.to_string()),
    }
    keys
}

/// Key `field` is written under in by-alias dumps.
pub fn resolve_output_key(field: &FieldSpec, config: &ModelConfig) -> String {
    if let Some(alias) = field.get_output_alias() {
        return alias.to_string();
    }
    match &config.naming_transform {
        Some(transform) => transform.apply(field.name()),
        None => field.name().to_string(),
    }
}
