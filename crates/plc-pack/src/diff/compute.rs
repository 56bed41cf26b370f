//! Update-only diff computation between consecutive operations.
//!
//! PLC chain steps overwhelmingly change leaf values in place (new
//! signature, new `prev` CID, a swapped rotation key), so the producer side
//! only needs the `"u"` class: flatten both documents and emit an update
//! for every shared index whose previous node is a scalar that differs.
//! Producers with structure-changing steps supply their own scripts; the
//! applier accepts all four classes.

use ciborium::value::Value;

use super::{apply, EditScript};
use crate::error::CodecError;
use crate::index::flatten;

/// Compute the update-only script turning `prev` into `next`.
///
/// Self-checks by applying the script; a step that cannot be expressed as
/// leaf updates (inserted entries, removed elements, reshaped subtrees)
/// fails with [`CodecError::DiffUnrepresentable`].
pub fn diff_updates(prev: &Value, next: &Value) -> Result<EditScript, CodecError> {
    let new_nodes: std::collections::HashMap<u64, &Value> = flatten(next).into_iter().collect();
    let mut script = EditScript::default();
    for (idx, old_node) in flatten(prev) {
        if matches!(old_node, Value::Array(_) | Value::Map(_) | Value::Tag(..)) {
            continue;
        }
        if let Some(new_node) = new_nodes.get(&idx) {
            if *new_node != old_node {
                script.updates.push((idx, (*new_node).clone()));
            }
        }
    }
    if apply(prev, &script)? != *next {
        return Err(CodecError::DiffUnrepresentable);
    }
    Ok(script)
}
