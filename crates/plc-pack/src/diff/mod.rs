//! Edit scripts: the per-step diffs of a compressed chain.
//!
//! A script is a CBOR map with up to four single-character keys: `"u"`
//! (updates), `"d"` (deletes), `"i"` (inserts/appends), `"p"` (prepends).
//! Every index refers to the structural walk of the *previous* uncompressed
//! document (see [`crate::index`]); embedded values may carry semantic tags.

mod apply;
mod compute;

pub use apply::apply;
pub use compute::diff_updates;

use ciborium::value::Value;

use crate::error::CodecError;
use crate::index::{DocIndex, NodeKind, Slot};
use crate::tags;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditScript {
    /// Replace the node at index with the value.
    pub updates: Vec<(u64, Value)>,
    /// Remove the map entry (by entry-marker index) or array element.
    pub deletes: Vec<u64>,
    /// Append to the container at index: `[key, value]` pair for maps, the
    /// element itself for arrays.
    pub inserts: Vec<(u64, Value)>,
    /// Insert the element before the array element at index.
    pub prepends: Vec<(u64, Value)>,
}

impl EditScript {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
            && self.deletes.is_empty()
            && self.inserts.is_empty()
            && self.prepends.is_empty()
    }

    /// Parse the wire form. Absent keys mean empty lists; any other shape
    /// is malformed.
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let Value::Map(entries) = value else {
            return Err(CodecError::MalformedCbor(
                "edit script must be a map".to_string(),
            ));
        };
        let mut script = EditScript::default();
        for (key, ops) in entries {
            let Value::Text(key) = key else {
                return Err(CodecError::MalformedCbor(
                    "edit script keys must be text".to_string(),
                ));
            };
            match key.as_str() {
                "u" => script.updates = indexed_pairs(ops)?,
                "d" => script.deletes = indices(ops)?,
                "i" => script.inserts = indexed_pairs(ops)?,
                "p" => script.prepends = indexed_pairs(ops)?,
                other => {
                    return Err(CodecError::MalformedCbor(format!(
                        "unknown edit script key {other:?}"
                    )))
                }
            }
        }
        Ok(script)
    }

    /// The wire form. Empty edit classes are omitted, so an empty script
    /// serializes as the empty map.
    pub fn to_value(&self) -> Value {
        let mut entries = Vec::new();
        if !self.updates.is_empty() {
            entries.push((Value::Text("u".to_string()), pair_list(&self.updates)));
        }
        if !self.deletes.is_empty() {
            let list = self.deletes.iter().map(|&i| Value::Integer(i.into())).collect();
            entries.push((Value::Text("d".to_string()), Value::Array(list)));
        }
        if !self.inserts.is_empty() {
            entries.push((Value::Text("i".to_string()), pair_list(&self.inserts)));
        }
        if !self.prepends.is_empty() {
            entries.push((Value::Text("p".to_string()), pair_list(&self.prepends)));
        }
        Value::Map(entries)
    }

    /// Apply semantic-tag compression to every embedded value. Payloads
    /// are interpreted by their target in the previous document: update
    /// values at key positions and map-insert keys get key compression,
    /// while array-insert elements and value-position updates never do.
    pub fn compress_values(self, prev: &DocIndex) -> Result<EditScript, CodecError> {
        let mut updates = Vec::with_capacity(self.updates.len());
        for (idx, value) in self.updates {
            let entry = prev.get(idx).ok_or(CodecError::IndexOutOfRange(idx))?;
            let value = if matches!(entry.slot, Slot::Key { .. }) {
                tags::compress_key(value)
            } else {
                tags::compress(value)
            };
            updates.push((idx, value));
        }
        let mut inserts = Vec::with_capacity(self.inserts.len());
        for (idx, payload) in self.inserts {
            let entry = prev.get(idx).ok_or(CodecError::IndexOutOfRange(idx))?;
            let payload = match entry.kind {
                NodeKind::Map => {
                    let (key, value) = split_pair_payload(idx, payload)?;
                    Value::Array(vec![tags::compress_key(key), tags::compress(value)])
                }
                NodeKind::Array => tags::compress(payload),
                _ => return Err(CodecError::WrongContainerKind(idx)),
            };
            inserts.push((idx, payload));
        }
        let prepends = self
            .prepends
            .into_iter()
            .map(|(idx, value)| (idx, tags::compress(value)))
            .collect();
        Ok(EditScript {
            updates,
            deletes: self.deletes,
            inserts,
            prepends,
        })
    }
}

fn split_pair_payload(idx: u64, payload: Value) -> Result<(Value, Value), CodecError> {
    let Value::Array(pair) = payload else {
        return Err(CodecError::MalformedEdit(format!(
            "map insert at index {idx} requires a [key, value] pair"
        )));
    };
    if pair.len() != 2 {
        return Err(CodecError::MalformedEdit(format!(
            "map insert at index {idx} requires a [key, value] pair"
        )));
    }
    let mut pair = pair.into_iter();
    let key = pair.next().unwrap_or(Value::Null);
    let value = pair.next().unwrap_or(Value::Null);
    Ok((key, value))
}

fn pair_list(pairs: &[(u64, Value)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(idx, value)| {
                Value::Array(vec![Value::Integer((*idx).into()), value.clone()])
            })
            .collect(),
    )
}

fn indexed_pairs(ops: Value) -> Result<Vec<(u64, Value)>, CodecError> {
    let Value::Array(items) = ops else {
        return Err(CodecError::MalformedCbor(
            "edit list must be an array".to_string(),
        ));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::Array(pair) = item else {
            return Err(CodecError::MalformedCbor(
                "edit must be an [index, value] pair".to_string(),
            ));
        };
        if pair.len() != 2 {
            return Err(CodecError::MalformedCbor(
                "edit must be an [index, value] pair".to_string(),
            ));
        }
        let mut pair = pair.into_iter();
        let idx = index_from(pair.next().unwrap_or(Value::Null))?;
        out.push((idx, pair.next().unwrap_or(Value::Null)));
    }
    Ok(out)
}

fn indices(ops: Value) -> Result<Vec<u64>, CodecError> {
    let Value::Array(items) = ops else {
        return Err(CodecError::MalformedCbor(
            "delete list must be an array".to_string(),
        ));
    };
    items.into_iter().map(index_from).collect()
}

fn index_from(value: Value) -> Result<u64, CodecError> {
    match value {
        Value::Integer(i) => u64::try_from(i)
            .map_err(|_| CodecError::MalformedCbor("index must be a non-negative integer".to_string())),
        _ => Err(CodecError::MalformedCbor(
            "index must be a non-negative integer".to_string(),
        )),
    }
}
