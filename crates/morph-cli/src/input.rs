//! # Payload Loading
//!
//! Reads a payload from a file or stdin. Files ending in `.yaml` or
//! `.yml` are parsed as YAML; everything else, stdin included, as JSON.
//! Both land in the engine's [`Value`] tree with mapping keys in document
//! order.

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use morph_core::ParseError;
use morph_schema::{Map, Value};

/// Encoding of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Read and decode the payload at `path`, or stdin when `None`.
///
/// # Errors
///
/// Fails if the source cannot be read or does not decode.
pub fn load_payload(path: Option<&Path>) -> anyhow::Result<Value> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            parse_payload(&text, Format::from_path(path))
                .with_context(|| format!("cannot decode {}", path.display()))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read stdin")?;
            parse_payload(&text, Format::Json).context("cannot decode stdin")
        }
    }
}

/// Decode `text` as `format`.
///
/// # Errors
///
/// JSON failures are reported as a [`ParseError`] with line and column.
pub fn parse_payload(text: &str, format: Format) -> anyhow::Result<Value> {
    match format {
        Format::Json => {
            let value: Value = serde_json::from_str(text).map_err(ParseError::from)?;
            Ok(value)
        }
        Format::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(text).context("invalid YAML")?;
            yaml_to_value(&yaml)
        }
    }
}

fn yaml_to_value(yaml: &serde_yaml::Value) -> anyhow::Result<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                bail!("unsupported YAML number: {n}")
            }
        }
        serde_yaml::Value::String(s) => Value::Str(s.clone()),
        serde_yaml::Value::Sequence(seq) => Value::List(
            seq.iter()
                .map(yaml_to_value)
                .collect::<anyhow::Result<_>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => bail!("unsupported YAML map key: {other:?}"),
                };
                map.insert(key, yaml_to_value(v)?);
            }
            Value::Map(map)
        }
        // Tags carry no meaning for payloads; keep the tagged value.
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(&tagged.value)?,
    })
}
