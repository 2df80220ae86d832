//! # Naming Transforms
//!
//! A naming transform maps a canonical (snake_case) field name to the
//! default external name a model uses on input and output, e.g.
//! `first_name` → `firstName`.
//!
//! Presets delegate word splitting to `convert_case`; anything else can
//! be supplied as a [`CustomTransform`]. Transforms must be pure: the
//! same name always maps to the same alias.

use std::fmt;
use std::sync::Arc;

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// A model-wide convention for deriving external names from field names.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingTransform {
    /// `first_name` → `firstName`.
    Camel,
    /// `first_name` → `FirstName`.
    Pascal,
    /// `firstName` → `first_name`.
    Snake,
    /// `first_name` → `first-name`.
    Kebab,
    /// A caller-supplied function.
    #[serde(skip)]
    Custom(CustomTransform),
}

impl NamingTransform {
    /// Wrap a function as a named custom transform.
    pub fn custom(
        name: impl Into<String>,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(CustomTransform {
            name: name.into(),
            f: Arc::new(f),
        })
    }

    /// Apply the transform to a canonical field name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Camel => name.to_case(Case::Camel),
            Self::Pascal => name.to_case(Case::Pascal),
            Self::Snake => name.to_case(Case::Snake),
            Self::Kebab => name.to_case(Case::Kebab),
            Self::Custom(custom) => (custom.f)(name),
        }
    }

    /// Short name of the transform, for listings and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Camel => "camel",
            Self::Pascal => "pascal",
            Self::Snake => "snake",
            Self::Kebab => "kebab",
            Self::Custom(custom) => &custom.name,
        }
    }
}

impl fmt::Debug for NamingTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamingTransform({})", self.name())
    }
}

/// A caller-supplied naming function with a display name.
#[derive(Clone)]
pub struct CustomTransform {
    name: String,
    f: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

/// Convert snake_case to camelCase.
pub fn to_camel(name: &str) -> String {
    NamingTransform::Camel.apply(name)
}

/// Convert snake_case to PascalCase.
pub fn to_pascal(name: &str) -> String {
    NamingTransform::Pascal.apply(name)
}

/// Convert camelCase or PascalCase to snake_case.
pub fn to_snake(name: &str) -> String {
    NamingTransform::Snake.apply(name)
}
