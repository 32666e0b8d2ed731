//! [`ArchiveValue`]: the value graph the keyed archive stores.

use std::mem;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::ArchiveError;
use crate::registry::Archive;

/// Ordered string-keyed mapping used by [`ArchiveValue::Map`].
pub type ArchiveMap = IndexMap<String, ArchiveValue>;

/// A value the keyed archive can store.
///
/// The set of variants is closed. Application-defined types travel as
/// [`ArchiveValue::Typed`], identified by a stable type tag that must be
/// registered in a [`crate::TypeRegistry`] on both ends.
///
/// Equality and drop walk nested values with an explicit work list, so a
/// value decoded under a raised depth limit can be compared and dropped on
/// any thread. `Clone`, `Debug` and the serde bridge still recurse.
#[derive(Debug, Clone, Default)]
pub enum ArchiveValue {
    #[default]
    Null,
    Bool(bool),
    /// Any integer that fits in `i64`.
    Integer(i64),
    /// Unsigned integer. Decoding yields this only above `i64::MAX`;
    /// smaller values compare equal to the matching [`ArchiveValue::Integer`].
    UInteger(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Str(String),
    Array(Vec<ArchiveValue>),
    /// String keys in insertion order.
    Map(ArchiveMap),
    Uuid(Uuid),
    /// Seconds since the Unix epoch.
    Date(f64),
    Typed(Box<TypedValue>),
}

/// An application-defined value: its type tag and archived body.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub type_tag: String,
    pub value: ArchiveValue,
}

impl TypedValue {
    pub fn new(type_tag: impl Into<String>, value: ArchiveValue) -> Self {
        Self {
            type_tag: type_tag.into(),
            value,
        }
    }

    /// Rebuilds the application type this value was archived from.
    pub fn rebuild<T: Archive>(&self) -> Result<T, ArchiveError> {
        if self.type_tag != T::TYPE_TAG {
            return Err(ArchiveError::TypeMismatch {
                expected: T::TYPE_TAG.to_owned(),
                found: self.type_tag.clone(),
            });
        }
        T::unarchive(&self.value)
    }
}

impl ArchiveValue {
    /// Wraps an application value as [`ArchiveValue::Typed`].
    pub fn typed<T: Archive>(value: &T) -> Result<Self, ArchiveError> {
        Ok(ArchiveValue::Typed(Box::new(TypedValue::new(
            T::TYPE_TAG,
            value.archive()?,
        ))))
    }

    /// Builds a map from `(key, value)` pairs, keeping their order.
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ArchiveValue)>,
    {
        ArchiveValue::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ArchiveValue::Null => "null",
            ArchiveValue::Bool(_) => "bool",
            ArchiveValue::Integer(_) | ArchiveValue::UInteger(_) => "integer",
            ArchiveValue::Float(_) => "float",
            ArchiveValue::Bytes(_) => "bytes",
            ArchiveValue::Str(_) => "string",
            ArchiveValue::Array(_) => "array",
            ArchiveValue::Map(_) => "map",
            ArchiveValue::Uuid(_) => "uuid",
            ArchiveValue::Date(_) => "date",
            ArchiveValue::Typed(_) => "typed",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArchiveValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArchiveValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArchiveValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArchiveValue::Float(f) | ArchiveValue::Date(f) => Some(*f),
            ArchiveValue::Integer(i) => Some(*i as f64),
            ArchiveValue::UInteger(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArchiveValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ArchiveValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ArchiveValue]> {
        match self {
            ArchiveValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ArchiveMap> {
        match self {
            ArchiveValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            ArchiveValue::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_typed(&self) -> Option<&TypedValue> {
        match self {
            ArchiveValue::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&ArchiveValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    fn is_container(&self) -> bool {
        matches!(
            self,
            ArchiveValue::Array(_) | ArchiveValue::Map(_) | ArchiveValue::Typed(_)
        )
    }

    // Whether the default drop glue could recurse below this value.
    fn has_nested(&self) -> bool {
        match self {
            ArchiveValue::Array(items) => items.iter().any(ArchiveValue::is_container),
            ArchiveValue::Map(map) => map.values().any(ArchiveValue::is_container),
            ArchiveValue::Typed(typed) => typed.value.is_container(),
            _ => false,
        }
    }

    fn take_children(&mut self, out: &mut Vec<ArchiveValue>) {
        match self {
            ArchiveValue::Array(items) => out.append(items),
            ArchiveValue::Map(map) => out.extend(map.drain(..).map(|(_, v)| v)),
            ArchiveValue::Typed(typed) => out.push(mem::take(&mut typed.value)),
            _ => {}
        }
    }
}

impl Drop for ArchiveValue {
    fn drop(&mut self) {
        if !self.has_nested() {
            return;
        }
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.take_children(&mut pending);
        }
    }
}

impl PartialEq for ArchiveValue {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            let same = match pair {
                (Self::Null, Self::Null) => true,
                (Self::Bool(a), Self::Bool(b)) => a == b,
                (Self::Integer(a), Self::Integer(b)) => a == b,
                (Self::UInteger(a), Self::UInteger(b)) => a == b,
                (Self::Integer(i), Self::UInteger(u)) | (Self::UInteger(u), Self::Integer(i)) => {
                    i64::try_from(*u).ok() == Some(*i)
                }
                (Self::Float(a), Self::Float(b)) | (Self::Date(a), Self::Date(b)) => a == b,
                (Self::Bytes(a), Self::Bytes(b)) => a == b,
                (Self::Str(a), Self::Str(b)) => a == b,
                (Self::Uuid(a), Self::Uuid(b)) => a == b,
                (Self::Array(a), Self::Array(b)) => {
                    pending.extend(a.iter().zip(b));
                    a.len() == b.len()
                }
                (Self::Map(a), Self::Map(b)) => {
                    a.len() == b.len()
                        && a.iter().all(|(key, value)| match b.get(key) {
                            Some(rhs) => {
                                pending.push((value, rhs));
                                true
                            }
                            None => false,
                        })
                }
                (Self::Typed(a), Self::Typed(b)) => {
                    pending.push((&a.value, &b.value));
                    a.type_tag == b.type_tag
                }
                _ => false,
            };
            if !same {
                return false;
            }
        }
        true
    }
}

impl From<bool> for ArchiveValue {
    fn from(b: bool) -> Self {
        ArchiveValue::Bool(b)
    }
}

impl From<i32> for ArchiveValue {
    fn from(i: i32) -> Self {
        ArchiveValue::Integer(i64::from(i))
    }
}

impl From<i64> for ArchiveValue {
    fn from(i: i64) -> Self {
        ArchiveValue::Integer(i)
    }
}

impl From<u64> for ArchiveValue {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => ArchiveValue::Integer(i),
            Err(_) => ArchiveValue::UInteger(u),
        }
    }
}

impl From<f64> for ArchiveValue {
    fn from(f: f64) -> Self {
        ArchiveValue::Float(f)
    }
}

impl From<&str> for ArchiveValue {
    fn from(s: &str) -> Self {
        ArchiveValue::Str(s.to_owned())
    }
}

impl From<String> for ArchiveValue {
    fn from(s: String) -> Self {
        ArchiveValue::Str(s)
    }
}

impl From<Vec<u8>> for ArchiveValue {
    fn from(b: Vec<u8>) -> Self {
        ArchiveValue::Bytes(b)
    }
}

impl From<Uuid> for ArchiveValue {
    fn from(id: Uuid) -> Self {
        ArchiveValue::Uuid(id)
    }
}

impl From<Vec<ArchiveValue>> for ArchiveValue {
    fn from(items: Vec<ArchiveValue>) -> Self {
        ArchiveValue::Array(items)
    }
}

impl<T: Into<ArchiveValue>> From<Option<T>> for ArchiveValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArchiveValue::Null, Into::into)
    }
}
