//! Chain → compressed CBOR array.

use ciborium::value::Value;

use super::to_cbor_bytes;
use crate::diff::{diff_updates, EditScript};
use crate::error::{ChainError, CodecError};
use crate::index::DocIndex;
use crate::tags;

/// Encode a chain from its first operation plus caller-supplied edit
/// scripts; `scripts[k]` turns `ops[k]` into `ops[k + 1]`. Every embedded
/// script value is tag-compressed, with insert payloads interpreted by the
/// kind of their target container in the corresponding previous document.
pub fn encode(ops: &[Value], scripts: &[EditScript]) -> Result<Vec<u8>, ChainError> {
    let Some(first) = ops.first() else {
        return Err(ChainError {
            index: 0,
            source: CodecError::MalformedEdit("chain must contain at least one operation".to_string()),
        });
    };
    if ops.len() != scripts.len() + 1 {
        return Err(ChainError {
            index: 0,
            source: CodecError::MalformedEdit(format!(
                "{} operations require {} scripts, got {}",
                ops.len(),
                ops.len() - 1,
                scripts.len()
            )),
        });
    }
    let mut entries = Vec::with_capacity(ops.len());
    entries.push(tags::compress(first.clone()));
    for (k, script) in scripts.iter().enumerate() {
        let prev = DocIndex::build(&ops[k]);
        let compressed = script
            .clone()
            .compress_values(&prev)
            .map_err(ChainError::at(k + 1))?;
        entries.push(compressed.to_value());
    }
    to_cbor_bytes(&Value::Array(entries)).map_err(ChainError::at(0))
}

/// The full producer pipeline: compute update-only scripts between
/// consecutive operations, then encode.
pub fn compress_chain(ops: &[Value]) -> Result<Vec<u8>, ChainError> {
    let mut scripts = Vec::with_capacity(ops.len().saturating_sub(1));
    for k in 1..ops.len() {
        scripts.push(diff_updates(&ops[k - 1], &ops[k]).map_err(ChainError::at(k))?);
    }
    encode(ops, &scripts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn empty_chain_is_rejected() {
        let err = encode(&[], &[]).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(matches!(err.source, CodecError::MalformedEdit(_)));
    }

    #[test]
    fn script_count_must_match_chain_length() {
        let op = Value::Map(vec![(text("a"), Value::Null)]);
        let err = encode(&[op], &[EditScript::default()]).unwrap_err();
        assert!(matches!(err.source, CodecError::MalformedEdit(_)));
    }

    #[test]
    fn script_errors_carry_chain_position() {
        let op = Value::Map(vec![(text("a"), Value::Null)]);
        let bad = EditScript {
            inserts: vec![(99, Value::Null)],
            ..EditScript::default()
        };
        let err = encode(
            &[op.clone(), op.clone(), op],
            &[EditScript::default(), bad],
        )
        .unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.source, CodecError::IndexOutOfRange(99));
    }
}
