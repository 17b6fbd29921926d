//! Core types for update map construction.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::naming::{default_naming_strategy, NamingStrategy};
use crate::record::Encode;

/// Default limit on nested embedded groups.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Output of a build: column or document-field name to value.
///
/// Ordinary values are borrowed from the record the map was built from.
pub type UpdateMap<'a> = BTreeMap<String, UpdateValue<'a>>;

/// Serialized JSON bytes of a semi-structured field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawJson(Vec<u8>);

impl RawJson {
    /// Wrap already-encoded JSON bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Parse the payload back into a JSON value.
    pub fn decode(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.0)
    }
}

impl Serialize for RawJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.decode()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

/// One entry of an [`UpdateMap`].
#[derive(Clone)]
pub enum UpdateValue<'a> {
    /// An ordinary column value, kept as-is. It is only encoded when the map
    /// is rendered, so a value JSON cannot represent never fails a build.
    Value(&'a dyn Encode),
    /// Pre-encoded payload of a semi-structured column.
    Raw(RawJson),
}

impl<'a> UpdateValue<'a> {
    /// The stored value, unless the entry is pre-encoded.
    pub fn as_value(&self) -> Option<&'a dyn Encode> {
        match self {
            UpdateValue::Value(value) => Some(*value),
            UpdateValue::Raw(_) => None,
        }
    }

    /// The encoded bytes of a semi-structured entry.
    pub fn as_raw(&self) -> Option<&RawJson> {
        match self {
            UpdateValue::Raw(raw) => Some(raw),
            UpdateValue::Value(_) => None,
        }
    }

    /// The entry as plain JSON, decoding raw payloads.
    ///
    /// # Errors
    ///
    /// Fails when the stored value has no JSON form (non-string map keys,
    /// integers wider than 64 bits, a failing `Serialize` impl) or when a raw
    /// payload is not valid JSON.
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        match self {
            UpdateValue::Value(value) => value.to_value(),
            UpdateValue::Raw(raw) => raw.decode(),
        }
    }
}

impl fmt::Debug for UpdateValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateValue::Value(value) => match value.to_value() {
                Ok(json) => f.debug_tuple("Value").field(&json).finish(),
                Err(_) => f.write_str("Value(<no JSON form>)"),
            },
            UpdateValue::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
        }
    }
}

impl Serialize for UpdateValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'a, T: Serialize> From<&'a T> for UpdateValue<'a> {
    fn from(value: &'a T) -> Self {
        UpdateValue::Value(value)
    }
}

impl From<RawJson> for UpdateValue<'_> {
    fn from(raw: RawJson) -> Self {
        UpdateValue::Raw(raw)
    }
}

/// Render a whole map as a JSON object, decoding raw payloads in place.
///
/// # Errors
///
/// Fails on the first entry without a JSON form.
pub fn update_map_to_json(map: &UpdateMap<'_>) -> serde_json::Result<Value> {
    let mut object = Map::with_capacity(map.len());
    for (key, value) in map {
        object.insert(key.clone(), value.to_json_value()?);
    }
    Ok(Value::Object(object))
}

/// Keys to leave out of a build.
///
/// Matched against the final key, after any embedded prefix is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(HashSet<String>);

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.0.insert(key.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for SkipSet {
    fn from(keys: [S; N]) -> Self {
        keys.into_iter().collect()
    }
}

/// Options for update map construction.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Fallback naming for fields without a usable annotation.
    pub naming: NamingStrategy,
    /// Maximum number of nested embedded groups.
    pub max_depth: usize,
}

impl BuildOptions {
    /// Options using the installed default naming strategy.
    ///
    /// The strategy is captured here, so a later
    /// [`set_default_naming_strategy`](crate::set_default_naming_strategy)
    /// does not affect builds that already hold these options.
    pub fn new() -> Self {
        Self {
            naming: default_naming_strategy(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Use a specific naming strategy.
    pub fn naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Set the limit on nested embedded groups.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}
