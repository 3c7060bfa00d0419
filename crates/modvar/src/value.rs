//! canonical value representation
//!
//! Every value published for a module is one of
//! - string (utf-8)
//! - list (ordered sequence of values)
//! - map (order-preserving, string keys)
//! - pending (the value is only known once some other resource exists)
//!
//! There are no booleans, numbers or `null` at this level. Raw values
//! ([hcl::Value]) are turned into this shape by [crate::normalize].
use indexmap::IndexMap;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// Marker written in place of [Value::Pending] when values are serialized.
///
/// The same marker Terraform uses for unknown variable values.
pub const PENDING_MARKER: &str = "74D93920-ED26-11E3-AC10-0800200C9A66";

/// Variable values of a single module, keyed by variable name
pub type VariableValues = IndexMap<String, Value>;

/// All possible canonical values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    /// Not known yet. Never equal to user data.
    Pending,
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<IndexMap<K, V>> for Value {
    fn from(value: IndexMap<K, V>) -> Self {
        Value::Map(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(value) => serializer.serialize_str(value),
            Value::List(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Map(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
            Value::Pending => serializer.serialize_str(PENDING_MARKER),
        }
    }
}
