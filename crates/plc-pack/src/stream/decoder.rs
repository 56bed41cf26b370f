//! Compressed CBOR array → chain.

use ciborium::value::Value;

use crate::diff::{apply, EditScript};
use crate::error::{ChainError, CodecError};
use crate::tags;

/// Decode a compressed stream back into the original operations, strictly
/// in order: the first element expands to the first operation, and each
/// edit script is applied against the previous uncompressed document.
/// Errors name the position of the failing document; no partial document
/// is yielded for it.
pub fn decode(bytes: &[u8]) -> Result<Vec<Value>, ChainError> {
    let outer = super::from_cbor_bytes(bytes).map_err(ChainError::at(0))?;
    let Value::Array(entries) = outer else {
        return Err(ChainError {
            index: 0,
            source: CodecError::MalformedCbor("compressed stream must be an array".to_string()),
        });
    };
    let mut entries = entries.into_iter();
    let Some(first) = entries.next() else {
        return Err(ChainError {
            index: 0,
            source: CodecError::MalformedCbor("compressed stream is empty".to_string()),
        });
    };
    let mut prev = tags::expand(first).map_err(ChainError::at(0))?;
    let mut ops = vec![prev.clone()];
    for (k, entry) in entries.enumerate() {
        let index = k + 1;
        let script = EditScript::from_value(entry).map_err(ChainError::at(index))?;
        let next = apply(&prev, &script).map_err(ChainError::at(index))?;
        ops.push(next.clone());
        prev = next;
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::to_cbor_bytes;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn garbage_bytes_are_malformed_at_zero() {
        let err = decode(&[0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(matches!(err.source, CodecError::MalformedCbor(_)));
    }

    #[test]
    fn non_array_stream_is_malformed() {
        let bytes = to_cbor_bytes(&Value::Map(vec![])).unwrap();
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.index, 0);
        assert!(matches!(err.source, CodecError::MalformedCbor(_)));
    }

    #[test]
    fn empty_stream_is_malformed() {
        let bytes = to_cbor_bytes(&Value::Array(vec![])).unwrap();
        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.index, 0);
    }

    #[test]
    fn failing_diff_reports_document_position() {
        let first = Value::Map(vec![(text("a"), Value::Null)]);
        let good = Value::Map(vec![]);
        let bad = Value::Map(vec![(
            text("d"),
            Value::Array(vec![Value::Integer(42u64.into())]),
        )]);
        let stream = Value::Array(vec![first, good, bad]);
        let err = decode(&to_cbor_bytes(&stream).unwrap()).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.source, CodecError::IndexOutOfRange(42));
    }

    #[test]
    fn single_document_stream_round_trips() {
        let op = Value::Map(vec![(text("type"), text("plc_operation"))]);
        let bytes = crate::stream::encode(std::slice::from_ref(&op), &[]).unwrap();
        assert_eq!(decode(&bytes).unwrap(), vec![op]);
    }
}
