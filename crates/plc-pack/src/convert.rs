//! JSON ↔ document conversion.
//!
//! PLC directory exports carry operations as JSON; per the did:plc data
//! model every value is already the right CBOR type (signatures and CIDs
//! are plain strings), so the mapping is direct. Tagged values have no JSON
//! form and only appear in compressed trees, never in documents fed to or
//! produced by the codec's JSON boundary.

use ciborium::value::Value;
use serde_json::Value as JsonValue;

use crate::error::CodecError;

/// Convert a JSON operation into a document tree.
pub fn json_to_doc(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(arr) => Value::Array(arr.iter().map(json_to_doc).collect()),
        JsonValue::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::Text(k.clone()), json_to_doc(v)))
                .collect(),
        ),
    }
}

/// Convert an uncompressed document back to JSON. Byte strings, tags, and
/// non-text keys have no place in an uncompressed PLC operation and are
/// rejected.
pub fn doc_to_json(v: &Value) -> Result<JsonValue, CodecError> {
    Ok(match v {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Integer(i) => {
            let i = i128::from(*i);
            if let Ok(u) = u64::try_from(i) {
                JsonValue::Number(u.into())
            } else {
                let s = i64::try_from(i).map_err(|_| {
                    CodecError::MalformedCbor("integer out of json range".to_string())
                })?;
                JsonValue::Number(s.into())
            }
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| CodecError::MalformedCbor("non-finite float".to_string()))?,
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(doc_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(entries) => {
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                let Value::Text(key) = k else {
                    return Err(CodecError::MalformedCbor(
                        "uncompressed map keys must be text".to_string(),
                    ));
                };
                out.insert(key.clone(), doc_to_json(v)?);
            }
            JsonValue::Object(out)
        }
        _ => {
            return Err(CodecError::MalformedCbor(
                "value has no json form".to_string(),
            ))
        }
    })
}
