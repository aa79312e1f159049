//! Tagged argument values carried by transitions.
//!
//! Submitters attach a [`VariantList`] to every event; the same list is
//! handed to guards, transition actions, and state callbacks. The engine
//! never inspects the values itself.
//!
//! Lists are most conveniently built with the [`args!`](crate::args) macro:
//!
//! ```
//! use rshsm_core::{args, Variant};
//!
//! let list = args![true, 42, "reason"];
//! assert_eq!(list[1], Variant::Int(42));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Arguments attached to a single event submission.
pub type VariantList = Vec<Variant>;

/// A single transition argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// No value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// UTF-8 string value.
    Str(String),
    /// Raw byte buffer.
    Bytes(Vec<u8>),
    /// Ordered list of variants.
    List(Vec<Variant>),
    /// String-keyed dictionary of variants.
    Map(BTreeMap<String, Variant>),
}

impl Variant {
    /// Returns true for [`Variant::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    /// Returns the boolean payload, if this is a [`Variant::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is a [`Variant::Int`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Int(value) => Some(*value as f64),
            Variant::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a [`Variant::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the byte payload, if this is a [`Variant::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Variant::Bytes(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Returns the list payload, if this is a [`Variant::List`].
    pub fn as_list(&self) -> Option<&[Variant]> {
        match self {
            Variant::List(value) => Some(value.as_slice()),
            _ => None,
        }
    }

    /// Returns the map payload, if this is a [`Variant::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, Variant>> {
        match self {
            Variant::Map(value) => Some(value),
            _ => None,
        }
    }

    /// Converts the variant into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Variant::Null => serde_json::Value::Null,
            Variant::Bool(value) => serde_json::Value::Bool(*value),
            Variant::Int(value) => serde_json::Value::from(*value),
            Variant::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Variant::Str(value) => serde_json::Value::String(value.clone()),
            Variant::Bytes(value) => {
                serde_json::Value::Array(value.iter().map(|b| (*b).into()).collect())
            }
            Variant::List(value) => {
                serde_json::Value::Array(value.iter().map(Variant::to_json).collect())
            }
            Variant::Map(value) => serde_json::Value::Object(
                value
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i32> for Variant {
    fn from(value: i32) -> Self {
        Variant::Int(value as i64)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Variant::Int(value as i64)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::Str(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::Str(value)
    }
}

impl From<Vec<u8>> for Variant {
    fn from(value: Vec<u8>) -> Self {
        Variant::Bytes(value)
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(value: Vec<Variant>) -> Self {
        Variant::List(value)
    }
}

impl From<BTreeMap<String, Variant>> for Variant {
    fn from(value: BTreeMap<String, Variant>) -> Self {
        Variant::Map(value)
    }
}

impl From<serde_json::Value> for Variant {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Variant::Null,
            serde_json::Value::Bool(b) => Variant::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Variant::Int(i)
                } else {
                    Variant::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Variant::Str(s),
            serde_json::Value::Array(items) => {
                Variant::List(items.into_iter().map(Variant::from).collect())
            }
            serde_json::Value::Object(map) => Variant::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Variant::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Builds a [`VariantList`] from heterogeneous values.
///
/// Every argument must convert into [`Variant`] via `From`.
#[macro_export]
macro_rules! args {
    () => {
        $crate::VariantList::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Variant::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Variant::from(true), Variant::Bool(true));
        assert_eq!(Variant::from(42i64), Variant::Int(42));
        assert_eq!(Variant::from(42u32), Variant::Int(42));
        assert_eq!(Variant::from(1.5), Variant::Float(1.5));
        assert_eq!(Variant::from("hello"), Variant::Str("hello".to_string()));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Variant::Bool(true).as_bool(), Some(true));
        assert_eq!(Variant::Int(7).as_i64(), Some(7));
        assert_eq!(Variant::Int(7).as_f64(), Some(7.0));
        assert_eq!(Variant::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Variant::Str("x".into()).as_str(), Some("x"));
        assert_eq!(Variant::Null.as_bool(), None);
        assert!(Variant::Null.is_null());
    }

    #[test]
    fn test_args_macro() {
        let list = args![true, 1, "two"];
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], Variant::Bool(true));
        assert_eq!(list[1], Variant::Int(1));
        assert_eq!(list[2], Variant::Str("two".to_string()));

        let empty = args![];
        assert!(empty.is_empty());
    }

    #[test]
    fn test_from_json_value() {
        let value = json!({
            "enabled": true,
            "count": 3,
            "rate": 0.25,
            "tags": ["a", "b"],
            "name": "toggle"
        });

        let variant = Variant::from(value);
        let map = variant.as_map().unwrap();
        assert_eq!(map["enabled"], Variant::Bool(true));
        assert_eq!(map["count"], Variant::Int(3));
        assert_eq!(map["rate"], Variant::Float(0.25));
        assert_eq!(
            map["tags"],
            Variant::List(vec![Variant::Str("a".into()), Variant::Str("b".into())])
        );
    }

    #[test]
    fn test_to_json_roundtrip() {
        let variant = Variant::from(json!({"a": [1, 2], "b": null, "c": "s"}));
        assert_eq!(variant.to_json(), json!({"a": [1, 2], "b": null, "c": "s"}));
    }

    #[test]
    fn test_serde_roundtrip() {
        let list: VariantList = args![true, 42, "x", 0.5];
        let encoded = serde_json::to_string(&list).unwrap();
        let decoded: VariantList = serde_json::from_str(&encoded).unwrap();
        assert_eq!(list, decoded);
    }

    #[test]
    fn test_bytes_distinct_from_list() {
        let bytes = Variant::Bytes(vec![1, 2, 3]);
        let list = Variant::List(vec![Variant::Int(1), Variant::Int(2), Variant::Int(3)]);
        assert_ne!(bytes, list);

        let encoded = serde_json::to_string(&bytes).unwrap();
        let decoded: Variant = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, bytes);
    }
}
