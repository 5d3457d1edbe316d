//! The loosely-typed parameter tree that flows through both the XML codec and the signer.
//!
//! Every gateway message is a flat-ish bag of string keys. Values are mostly strings, but callers hand us integers
//! (amounts), booleans (`receipt`, ...) and the occasional nested structure (`scene_info`, `detail`). There is exactly
//! one way to turn any of these into wire text, [`Value::to_wire_string`], and both the codec and the signer use it.

use std::collections::{btree_map, BTreeMap};

use serde::Serialize;
use wxp_common::Fen;

use crate::errors::{PayError, Result};

/// The key that carries the signature itself. It is never part of the signed content.
pub const SIGN_KEY: &str = "sign";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Value>),
    Map(ParameterMap),
}

impl Value {
    /// Canonical text form: booleans become `Y`/`N`, lists and maps become compact JSON, null becomes empty.
    pub fn to_wire_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Str(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Bool(true) => "Y".to_string(),
            Value::Bool(false) => "N".to_string(),
            Value::List(_) | Value::Map(_) => serde_json::to_string(self).unwrap_or_default(),
        }
    }

    /// Null and the empty string are "absent" as far as the gateway is concerned.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ParameterMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l.as_slice()),
            _ => None,
        }
    }

    /// Integer view of the value. Decoded XML only ever yields strings, so numeric strings are parsed.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Str(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<Fen> for Value {
    fn from(value: Fen) -> Self {
        Value::Int(value.value())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ParameterMap> for Value {
    fn from(value: ParameterMap) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            // Floats have no canonical integer form, so keep exactly what the sender wrote
            Json::Number(n) => n.as_i64().map(Value::Int).unwrap_or_else(|| Value::Str(n.to_string())),
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(obj) => Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

//-------------------------------------------   ParameterMap   -------------------------------------------------------
/// String-keyed parameters of a single gateway message. Iteration is always in ascending byte order of the keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap(BTreeMap<String, Value>);

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Chaining form of [`ParameterMap::insert`].
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// True if the key is present with a value that is neither null nor the empty string.
    pub fn has_value(&self, key: &str) -> bool {
        self.0.get(key).map(|v| !v.is_blank()).unwrap_or(false)
    }

    /// The wire text of `key`, or the empty string if it is absent.
    pub fn string(&self, key: &str) -> String {
        self.0.get(key).map(Value::to_wire_string).unwrap_or_default()
    }

    /// The integer value of `key`, or zero if it is absent or not a number.
    pub fn i64_or_zero(&self, key: &str) -> i64 {
        self.0.get(key).and_then(Value::to_i64).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// The entries that take part in a signature: no blanks and no `sign`.
    pub fn signable(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, v)| k.as_str() != SIGN_KEY && !v.is_blank())
    }

    /// Copy of this map without blank values.
    pub fn without_blanks(&self) -> Self {
        self.0.iter().filter(|(_, v)| !v.is_blank()).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Parse a JSON object into a parameter map. Anything other than an object is a protocol error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value = serde_json::from_str::<serde_json::Value>(json)
            .map_err(|e| PayError::protocol(format!("Invalid JSON document. {e}")))?;
        match Value::from(value) {
            Value::Map(map) => Ok(map),
            _ => Err(PayError::protocol("Expected a JSON object at the top level")),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for ParameterMap {
    type IntoIter = btree_map::IntoIter<String, Value>;
    type Item = (String, Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type IntoIter = btree_map::Iter<'a, String, Value>;
    type Item = (&'a String, &'a Value);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
