//! Flat structural indexing of CBOR documents.
//!
//! A single left-to-right pre-order walk assigns one index to every
//! structural position of a document: containers, array elements, map entry
//! markers, keys, values, tag wrappers. Edit scripts address the *previous*
//! document through these indices, so the walk must be deterministic and the
//! applier must thread the exact same counter (see [`node_span`]).

use ciborium::value::Value;

/// What kind of node an index addresses. Determines which edit kinds are
/// legal against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Map,
    Array,
    /// The slot between a map and one of its keys; the delete handle for the
    /// whole (key, value) pair.
    EntryMarker,
    /// Scalars and tag wrappers.
    Leaf,
}

/// The position a node occupies within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Root,
    Element { parent: u64, pos: usize },
    EntryMarker { parent: u64, pos: usize },
    Key { parent: u64, pos: usize },
    Value { parent: u64, pos: usize },
    TagInner { parent: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: NodeKind,
    pub slot: Slot,
}

impl IndexEntry {
    /// True when this index may be removed by a `"d"` edit: a map entry
    /// marker, or an element slot of an array.
    pub fn is_deletable(&self) -> bool {
        self.kind == NodeKind::EntryMarker || matches!(self.slot, Slot::Element { .. })
    }
}

/// The address table of one document: entry `i` describes the node assigned
/// index `i` by the pre-order walk.
#[derive(Debug, Clone, Default)]
pub struct DocIndex {
    entries: Vec<IndexEntry>,
}

impl DocIndex {
    pub fn build(doc: &Value) -> Self {
        let mut index = DocIndex::default();
        index.walk(doc, Slot::Root);
        index
    }

    /// Number of indices assigned; valid indices are `0..len()`.
    pub fn len(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: u64) -> Option<&IndexEntry> {
        usize::try_from(idx).ok().and_then(|i| self.entries.get(i))
    }

    fn push(&mut self, kind: NodeKind, slot: Slot) -> u64 {
        let idx = self.entries.len() as u64;
        self.entries.push(IndexEntry { kind, slot });
        idx
    }

    fn walk(&mut self, node: &Value, slot: Slot) {
        match node {
            Value::Array(items) => {
                let me = self.push(NodeKind::Array, slot);
                for (pos, item) in items.iter().enumerate() {
                    self.walk(item, Slot::Element { parent: me, pos });
                }
            }
            Value::Map(entries) => {
                let me = self.push(NodeKind::Map, slot);
                for (pos, (key, value)) in entries.iter().enumerate() {
                    self.push(NodeKind::EntryMarker, Slot::EntryMarker { parent: me, pos });
                    self.walk(key, Slot::Key { parent: me, pos });
                    self.walk(value, Slot::Value { parent: me, pos });
                }
            }
            Value::Tag(_, inner) => {
                let me = self.push(NodeKind::Leaf, slot);
                self.walk(inner, Slot::TagInner { parent: me });
            }
            _ => {
                self.push(NodeKind::Leaf, slot);
            }
        }
    }
}

/// Number of indices a subtree consumes in the walk. Used to advance the
/// applier's counter past replaced or deleted subtrees.
pub fn node_span(node: &Value) -> u64 {
    match node {
        Value::Array(items) => 1 + items.iter().map(node_span).sum::<u64>(),
        Value::Map(entries) => {
            1 + entries
                .iter()
                .map(|(k, v)| 1 + node_span(k) + node_span(v))
                .sum::<u64>()
        }
        Value::Tag(_, inner) => 1 + node_span(inner),
        _ => 1,
    }
}

/// Index → node pairs for every non-marker node, in walk order. Entry
/// markers consume an index but carry no value, so they appear as gaps.
pub fn flatten(doc: &Value) -> Vec<(u64, &Value)> {
    let mut out = Vec::new();
    let mut counter = 0;
    flatten_into(doc, &mut counter, &mut out);
    out
}

fn flatten_into<'a>(node: &'a Value, counter: &mut u64, out: &mut Vec<(u64, &'a Value)>) {
    let idx = *counter;
    *counter += 1;
    out.push((idx, node));
    match node {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, counter, out);
            }
        }
        Value::Map(entries) => {
            for (key, value) in entries {
                *counter += 1; // entry marker
                flatten_into(key, counter, out);
                flatten_into(value, counter, out);
            }
        }
        Value::Tag(_, inner) => flatten_into(inner, counter, out),
        _ => {}
    }
}
