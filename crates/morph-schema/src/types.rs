//! # Type Descriptors
//!
//! `FieldType` describes what a field accepts. Unions are ordered: the
//! coercion engine tries members in declaration order and keeps the
//! first success, so `int | str | UUID` and `int | UUID | str` are
//! different types.

use std::fmt;
use std::sync::Arc;

use crate::model::ModelSpec;
use crate::value::EnumValue;

/// A named enumeration whose members render as text values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<(String, String)>,
}

impl EnumType {
    /// Declare an enumeration from `(member, value)` pairs, in order.
    pub fn new<N, V>(name: impl Into<String>, members: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }

    /// Enumeration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(member, value)` pairs in declaration order.
    pub fn members(&self) -> &[(String, String)] {
        &self.members
    }

    /// The member whose value equals `value`.
    pub fn from_value(&self, value: &str) -> Option<EnumValue> {
        self.members
            .iter()
            .find(|(_, v)| v == value)
            .map(|(member, v)| self.make(member, v))
    }

    /// The member called `member`.
    pub fn member(&self, member: &str) -> Option<EnumValue> {
        self.members
            .iter()
            .find(|(m, _)| m == member)
            .map(|(m, v)| self.make(m, v))
    }

    /// Returns true if `value` is a member of this enumeration.
    pub fn contains(&self, value: &EnumValue) -> bool {
        value.enum_name == self.name
            && self
                .members
                .iter()
                .any(|(m, v)| *m == value.member && *v == value.value)
    }

    fn make(&self, member: &str, value: &str) -> EnumValue {
        EnumValue {
            enum_name: self.name.clone(),
            member: member.to_string(),
            value: value.to_string(),
        }
    }

    /// Human-readable list of accepted values: `'a', 'b' or 'c'`.
    pub(crate) fn expected_values(&self) -> String {
        let quoted: Vec<String> = self.members.iter().map(|(_, v)| format!("'{v}'")).collect();
        match quoted.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        }
    }
}

/// The declared type of a field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Accepts any value unchanged.
    Any,
    /// `true` / `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Text.
    Str,
    /// Calendar date.
    Date,
    /// UUID, optionally pinned to one RFC 4122 version.
    Uuid {
        /// Required version number, if any.
        version: Option<usize>,
    },
    /// Member of a declared enumeration.
    Enum(Arc<EnumType>),
    /// Homogeneous list.
    List(Box<FieldType>),
    /// Open-ended mapping; contents are not coerced.
    Dict,
    /// Nested model.
    Model(Arc<ModelSpec>),
    /// The inner type, or null.
    Nullable(Box<FieldType>),
    /// The first member, in order, that accepts the value.
    Union(Vec<FieldType>),
}

impl FieldType {
    /// Any UUID.
    pub fn uuid() -> Self {
        Self::Uuid { version: None }
    }

    /// A version-4 (random) UUID.
    pub fn uuid4() -> Self {
        Self::Uuid { version: Some(4) }
    }

    /// Members of `enum_type`.
    pub fn enumeration(enum_type: EnumType) -> Self {
        Self::Enum(Arc::new(enum_type))
    }

    /// A list of `item`.
    pub fn list(item: FieldType) -> Self {
        Self::List(Box::new(item))
    }

    /// A nested model.
    pub fn model(spec: &Arc<ModelSpec>) -> Self {
        Self::Model(Arc::clone(spec))
    }

    /// An ordered union.
    pub fn union(members: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// This type, or null.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) | Self::Any => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Returns true if null is an acceptable value.
    pub fn accepts_null(&self) -> bool {
        match self {
            Self::Any | Self::Nullable(_) => true,
            Self::Union(members) => members.iter().any(Self::accepts_null),
            _ => false,
        }
    }

    /// Returns true if text is one of the values this type stores as-is,
    /// which is when whitespace stripping applies.
    pub fn is_string_typed(&self) -> bool {
        match self {
            Self::Str => true,
            Self::Nullable(inner) => inner.is_string_typed(),
            Self::Union(members) => members.iter().any(Self::is_string_typed),
            _ => false,
        }
    }

    /// Reason this type can never accept a value, if any.
    pub(crate) fn defect(&self) -> Option<String> {
        match self {
            Self::Union(members) if members.is_empty() => Some("union has no members".into()),
            Self::Union(members) => members.iter().find_map(Self::defect),
            Self::Enum(e) if e.members().is_empty() => {
                Some(format!("enum '{}' has no members", e.name()))
            }
            Self::List(item) | Self::Nullable(item) => item.defect(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Date => f.write_str("date"),
            Self::Uuid { version: None } => f.write_str("uuid"),
            Self::Uuid { version: Some(v) } => write!(f, "uuid{v}"),
            Self::Enum(e) => f.write_str(e.name()),
            Self::List(item) => write!(f, "list[{item}]"),
            Self::Dict => f.write_str("dict"),
            Self::Model(spec) => f.write_str(spec.name()),
            Self::Nullable(inner) => write!(f, "{inner} | None"),
            Self::Union(members) => {
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
        }
    }
}
