//! Materializing the next document from the previous one plus a script.
//!
//! All four edit classes address the original walk of `prev`, so the edits
//! behave as if applied simultaneously: deletes never shift the indices
//! seen by sibling edits, and prepends/appends resolve against original
//! positions. The rebuild threads the same counter as [`DocIndex::build`]
//! and consults the collected edits at each index.

use std::collections::{HashMap, HashSet};

use ciborium::value::Value;

use super::{split_pair_payload, EditScript};
use crate::error::CodecError;
use crate::index::{node_span, DocIndex, IndexEntry, NodeKind, Slot};
use crate::tags;

/// Apply `script` against `prev`, returning a fresh uncompressed document.
/// `prev` is never mutated. Embedded script values arrive in compressed
/// form and are expanded before grafting.
pub fn apply(prev: &Value, script: &EditScript) -> Result<Value, CodecError> {
    let index = DocIndex::build(prev);
    let mut rebuild = Rebuild::collect(&index, script)?;
    Ok(rebuild.rebuild(prev))
}

struct Rebuild {
    counter: u64,
    updates: HashMap<u64, Value>,
    deletes: HashSet<u64>,
    map_inserts: HashMap<u64, Vec<(Value, Value)>>,
    array_inserts: HashMap<u64, Vec<Value>>,
    prepends: HashMap<u64, Vec<Value>>,
}

impl Rebuild {
    /// Validate every edit against the address table and expand embedded
    /// tags, before any mutation is visible.
    fn collect(index: &DocIndex, script: &EditScript) -> Result<Self, CodecError> {
        let mut updates = HashMap::new();
        for (idx, value) in &script.updates {
            let entry = lookup(index, *idx)?;
            if entry.kind == NodeKind::EntryMarker {
                return Err(CodecError::WrongContainerKind(*idx));
            }
            // A key-position update carries a map key, which may arrive as
            // a key tag; value tags never apply there.
            let expanded = if matches!(entry.slot, Slot::Key { .. }) {
                tags::expand_key(value.clone())?
            } else {
                tags::expand(value.clone())?
            };
            updates.insert(*idx, expanded);
        }

        let mut deletes = HashSet::new();
        for idx in &script.deletes {
            let entry = lookup(index, *idx)?;
            if !entry.is_deletable() {
                return Err(CodecError::WrongContainerKind(*idx));
            }
            deletes.insert(*idx);
        }

        let mut map_inserts: HashMap<u64, Vec<(Value, Value)>> = HashMap::new();
        let mut array_inserts: HashMap<u64, Vec<Value>> = HashMap::new();
        for (idx, payload) in &script.inserts {
            let entry = lookup(index, *idx)?;
            match entry.kind {
                NodeKind::Map => {
                    let (key, value) = split_pair_payload(*idx, payload.clone())?;
                    map_inserts
                        .entry(*idx)
                        .or_default()
                        .push((tags::expand_key(key)?, tags::expand(value)?));
                }
                NodeKind::Array => {
                    array_inserts
                        .entry(*idx)
                        .or_default()
                        .push(tags::expand(payload.clone())?);
                }
                _ => return Err(CodecError::WrongContainerKind(*idx)),
            }
        }

        let mut prepends: HashMap<u64, Vec<Value>> = HashMap::new();
        for (idx, payload) in &script.prepends {
            let entry = lookup(index, *idx)?;
            if !matches!(entry.slot, Slot::Element { .. }) {
                return Err(CodecError::WrongContainerKind(*idx));
            }
            prepends
                .entry(*idx)
                .or_default()
                .push(tags::expand(payload.clone())?);
        }

        Ok(Rebuild {
            counter: 0,
            updates,
            deletes,
            map_inserts,
            array_inserts,
            prepends,
        })
    }

    fn next(&mut self) -> u64 {
        let idx = self.counter;
        self.counter += 1;
        idx
    }

    fn rebuild(&mut self, node: &Value) -> Value {
        let idx = self.next();
        if let Some(replacement) = self.updates.remove(&idx) {
            // The replacement subtree is grafted whole; subsequent indices
            // still refer to the original, so skip its span.
            self.counter += node_span(node) - 1;
            return replacement;
        }
        match node {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let elem_idx = self.counter;
                    if let Some(front) = self.prepends.remove(&elem_idx) {
                        out.extend(front);
                    }
                    if self.deletes.contains(&elem_idx) {
                        self.counter += node_span(item);
                    } else {
                        out.push(self.rebuild(item));
                    }
                }
                if let Some(tail) = self.array_inserts.remove(&idx) {
                    out.extend(tail);
                }
                Value::Array(out)
            }
            Value::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let marker = self.next();
                    if self.deletes.contains(&marker) {
                        self.counter += node_span(key) + node_span(value);
                        continue;
                    }
                    let key = self.rebuild(key);
                    let value = self.rebuild(value);
                    out.push((key, value));
                }
                if let Some(tail) = self.map_inserts.remove(&idx) {
                    out.extend(tail);
                }
                Value::Map(out)
            }
            Value::Tag(tag, inner) => Value::Tag(*tag, Box::new(self.rebuild(inner))),
            scalar => scalar.clone(),
        }
    }
}

fn lookup(index: &DocIndex, idx: u64) -> Result<IndexEntry, CodecError> {
    index
        .get(idx)
        .copied()
        .ok_or(CodecError::IndexOutOfRange(idx))
}
