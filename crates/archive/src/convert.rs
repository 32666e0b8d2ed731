//! Bridges between [`ArchiveValue`] and `serde_json::Value` / serde types.

use std::mem;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::ArchiveError;
use crate::value::ArchiveValue;

impl From<Value> for ArchiveValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => ArchiveValue::Null,
            Value::Bool(b) => ArchiveValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ArchiveValue::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    ArchiveValue::UInteger(u)
                } else {
                    ArchiveValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => ArchiveValue::Str(s),
            Value::Array(arr) => ArchiveValue::Array(arr.into_iter().map(ArchiveValue::from).collect()),
            Value::Object(obj) => ArchiveValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, ArchiveValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Lossy in a few places: bytes become a base64 data URI, UUIDs their
/// hyphenated text, dates their epoch seconds, non-finite floats `null`, and
/// typed values their body.
impl From<ArchiveValue> for Value {
    fn from(mut v: ArchiveValue) -> Self {
        match &mut v {
            ArchiveValue::Null => Value::Null,
            ArchiveValue::Bool(b) => Value::Bool(*b),
            ArchiveValue::Integer(i) => Value::Number((*i).into()),
            ArchiveValue::UInteger(u) => Value::Number((*u).into()),
            ArchiveValue::Float(f) | ArchiveValue::Date(f) => {
                Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            ArchiveValue::Bytes(b) => Value::String(format!(
                "data:application/octet-stream;base64,{}",
                STANDARD.encode(b.as_slice())
            )),
            ArchiveValue::Str(s) => Value::String(mem::take(s)),
            ArchiveValue::Uuid(id) => Value::String(id.hyphenated().to_string()),
            ArchiveValue::Array(arr) => {
                Value::Array(mem::take(arr).into_iter().map(Value::from).collect())
            }
            ArchiveValue::Map(map) => Value::Object(
                mem::take(map)
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
            ArchiveValue::Typed(typed) => Value::from(mem::take(&mut typed.value)),
        }
    }
}

/// Converts any serializable value into an [`ArchiveValue`].
///
/// Fails for data JSON cannot hold, such as maps with non-string keys.
/// Recurses once per nesting level, both inside `serde_json` and here.
pub fn to_archive_value<T: Serialize + ?Sized>(value: &T) -> Result<ArchiveValue, ArchiveError> {
    serde_json::to_value(value)
        .map(ArchiveValue::from)
        .map_err(|err| ArchiveError::Serialization(err.to_string()))
}

/// Rebuilds a deserializable value from an [`ArchiveValue`].
///
/// Recurses once per nesting level. Values decoded under the default
/// depth limit are always shallow enough.
pub fn from_archive_value<T: DeserializeOwned>(value: ArchiveValue) -> Result<T, ArchiveError> {
    serde_json::from_value(Value::from(value))
        .map_err(|err| ArchiveError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn json_numbers() {
        assert_eq!(ArchiveValue::from(json!(-3)), ArchiveValue::Integer(-3));
        assert_eq!(
            ArchiveValue::from(json!(u64::MAX)),
            ArchiveValue::UInteger(u64::MAX)
        );
        assert_eq!(ArchiveValue::from(json!(2.5)), ArchiveValue::Float(2.5));
    }

    #[test]
    fn json_object_keeps_order() {
        let value = ArchiveValue::from(json!({"z": 1, "a": [true, null]}));
        let keys: Vec<_> = value.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!(Value::from(value), json!({"z": 1, "a": [true, null]}));
    }

    #[test]
    fn bytes_render_as_data_uri() {
        assert_eq!(
            Value::from(ArchiveValue::Bytes(vec![1, 2, 3])),
            json!("data:application/octet-stream;base64,AQID")
        );
    }

    #[test]
    fn non_finite_float_is_null() {
        assert_eq!(Value::from(ArchiveValue::Float(f64::NAN)), Value::Null);
    }

    #[test]
    fn non_string_keys_are_rejected() {
        let mut map = BTreeMap::new();
        map.insert((1u8, 2u8), "pair");
        assert!(matches!(
            to_archive_value(&map),
            Err(ArchiveError::Serialization(_))
        ));
    }
}
