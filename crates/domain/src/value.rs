//! Document value model
//!
//! Configuration documents are trees of [`Value`]s. Mapping keys keep their
//! original order and spelling; a key containing `.` is just a key.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Ordered mapping used for every mapping node of a document.
pub type Mapping = IndexMap<String, Value>;

/// A node of a configuration document.
///
/// "Absent" (a reference that found nothing) is not a variant: resolution
/// APIs return `Option<Value>` and use `None` for it, so that `null` stays an
/// intentional value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit `null`.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating point scalar.
    Float(OrderedFloat<f64>),
    /// String scalar.
    String(String),
    /// Ordered list of values.
    Sequence(Vec<Value>),
    /// Ordered key/value mapping.
    Mapping(Mapping),
    /// YAML-tagged node (`!Ref MyBucket`). The tag is kept with its `!`.
    #[serde(skip_deserializing)]
    Tagged {
        /// Tag text, `!Ref`.
        tag: String,
        /// Tagged payload.
        value: Box<Self>,
    },
}

impl Value {
    /// Creates a tagged node.
    #[must_use]
    pub fn tagged(tag: impl Into<String>, value: Self) -> Self {
        Self::Tagged {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    /// Creates an empty mapping value (`{}`).
    #[must_use]
    pub fn empty_mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// Short name of the value's type, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Tagged { .. } => "tagged",
        }
    }

    /// Returns true for `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for a mapping, a sequence or a tagged node.
    #[must_use]
    pub const fn is_structure(&self) -> bool {
        matches!(
            self,
            Self::Mapping(_) | Self::Sequence(_) | Self::Tagged { .. }
        )
    }

    /// Returns true for a mapping with no entries.
    #[must_use]
    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, Self::Mapping(map) if map.is_empty())
    }

    /// Returns the string content of a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the entries of a mapping.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the entries of a mapping, mutably.
    pub const fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the items of a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up one path segment: a key of a mapping or a decimal index of a
    /// sequence. Scalars have no children.
    #[must_use]
    pub fn get(&self, segment: &str) -> Option<&Self> {
        match self {
            Self::Mapping(map) => map.get(segment),
            Self::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Returns true if this is a mapping containing `key`.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        matches!(self, Self::Mapping(map) if map.contains_key(key))
    }

    /// Text used when the value is embedded inside a larger string.
    ///
    /// Only strings and numbers have one; numbers use their canonical decimal
    /// form (`5`, `0.25`).
    #[must_use]
    pub fn substitution_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(OrderedFloat(value))
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::Sequence(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Self::Mapping(value)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else {
                    n.as_f64().map_or(Self::Null, Self::from)
                }
            }
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_yaml::Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(key, value)| (yaml_key(key), Self::from(value)))
                    .collect(),
            ),
            // Tags (`!Ref`, `!GetAtt`, ...) are provider syntax; keep the payload.
            serde_yaml::Value::Tagged(tagged) => {
                let serde_yaml::value::TaggedValue { tag, value } = *tagged;
                Self::tagged(tag.to_string(), Self::from(value))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(f.into_inner()),
            Self::String(s) => serializer.serialize_str(s),
            Self::Sequence(items) => serializer.collect_seq(items),
            Self::Mapping(map) => serializer.collect_map(map),
            // serde_yaml emits a one-entry map keyed `!Tag` as a tagged node;
            // other formats see the map.
            Self::Tagged { tag, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(tag, value)?;
                map.end()
            }
        }
    }
}

/// Non-string YAML keys become their scalar text (`1`, `true`).
fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
