//! raw attribute values into [Value]s
//!
//! Each raw value is tried as a string, then as a map, then as a list. The first
//! interpretation that works wins. Decoding is weak: numbers are accepted as
//! strings and a list holding exactly one object stands for that object.
use crate::classify::Classify;
use crate::value::{Value, VariableValues};
use indexmap::IndexMap;

/// Replace the contents of `dest` with the decoded attributes of `raw`
pub fn normalize(
    raw: &IndexMap<String, hcl::Value>,
    dest: &mut VariableValues,
) -> Result<(), ValueShapeError> {
    dest.clear();

    for (key, value) in raw {
        let Some(decoded) = decode(value) else {
            return Err(ValueShapeError {
                attribute: key.clone(),
            });
        };

        tracing::trace!(%key, kind = %decoded.kind(), "decoded attribute");
        dest.insert(key.clone(), decoded);
    }

    Ok(())
}

/// Decode a single raw value into the first matching shape
pub fn decode(value: &hcl::Value) -> Option<Value> {
    decode_string(value)
        .map(Value::String)
        .or_else(|| decode_map(value).map(Value::Map))
        .or_else(|| decode_list(value).map(Value::List))
}

pub fn decode_string(value: &hcl::Value) -> Option<String> {
    match value {
        hcl::Value::String(s) => Some(s.clone()),
        hcl::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn decode_map(value: &hcl::Value) -> Option<IndexMap<String, Value>> {
    match value {
        hcl::Value::Object(object) => object
            .iter()
            .map(|(k, v)| decode(v).map(|v| (k.clone(), v)))
            .collect(),
        hcl::Value::Array(array) => match array.as_slice() {
            [single @ hcl::Value::Object(_)] => decode_map(single),
            _ => None,
        },
        _ => None,
    }
}

pub fn decode_list(value: &hcl::Value) -> Option<Vec<Value>> {
    match value {
        hcl::Value::Array(array) => array.iter().map(decode).collect(),
        _ => None,
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("variable value for {attribute} is not a string, list or map type")]
pub struct ValueShapeError {
    pub attribute: String,
}
