//! Tagged argument values and owned dictionaries.

use crate::schema::{ScalarKind, TypeTag};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Owned string-to-string mapping.
///
/// Keys are unique; iteration order is deterministic (sorted by key) but
/// carries no meaning. The dictionary owns copies of both keys and values,
/// so it is released on every exit path of the scope that built it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary(BTreeMap<String, String>);

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a mapping, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Looks up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One argument or reply field as a tagged value.
///
/// This replaces an untyped variadic argument list: callers build an ordered
/// sequence of `Value`s and the encoder checks each against the schema tag
/// in the same position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 string
    Str(String),
    /// Boolean
    Bool(bool),
    /// Signed 32-bit integer
    Int32(i32),
    /// Signed 64-bit integer
    Int64(i64),
    /// Unsigned 32-bit integer
    Uint32(u32),
    /// Object path
    ObjectPath(String),
    /// Sequence of strings
    StrArray(Vec<String>),
    /// Dictionary with plain string values
    Dict(Dictionary),
    /// Dictionary whose values travel wrapped in string variants
    VariantDict(Dictionary),
}

impl Value {
    /// Returns the type tag this value satisfies.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Str(_) => TypeTag::Scalar(ScalarKind::String),
            Value::Bool(_) => TypeTag::Scalar(ScalarKind::Bool),
            Value::Int32(_) => TypeTag::Scalar(ScalarKind::Int32),
            Value::Int64(_) => TypeTag::Scalar(ScalarKind::Int64),
            Value::Uint32(_) => TypeTag::Scalar(ScalarKind::Uint32),
            Value::ObjectPath(_) => TypeTag::Scalar(ScalarKind::ObjectPath),
            Value::StrArray(_) => TypeTag::ArrayOfString,
            Value::Dict(_) => TypeTag::DictStringToString,
            Value::VariantDict(_) => TypeTag::DictStringToVariantString,
        }
    }

    /// Borrows the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Consumes the value into its string payload, if this is a string.
    pub fn into_str(self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the i32 payload, if this is an int32.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 payload, if this is an int64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the u32 payload, if this is a uint32.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrows the object path, if this is an object path.
    pub fn as_object_path(&self) -> Option<&str> {
        match self {
            Value::ObjectPath(p) => Some(p),
            _ => None,
        }
    }

    /// Borrows the string array, if this is one.
    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Value::StrArray(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the dictionary payload of either dictionary kind.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dict(map) | Value::VariantDict(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Uint32(v) => write!(f, "{}", v),
            Value::ObjectPath(p) => write!(f, "{}", p),
            Value::StrArray(items) => write!(f, "[{} strings]", items.len()),
            Value::Dict(map) => write!(f, "{{{} entries}}", map.len()),
            Value::VariantDict(map) => write!(f, "{{{} variant entries}}", map.len()),
        }
    }
}
