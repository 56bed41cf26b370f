//! Outer framing of a compressed chain.
//!
//! The wire form is one CBOR array: `[full_op, diff_1, diff_2, ...]`. The
//! first element is the tag-compressed first operation; every further
//! element is an edit-script map applied against the previous uncompressed
//! document.

mod decoder;
mod encoder;

pub use decoder::decode;
pub use encoder::{compress_chain, encode};

use ciborium::value::Value;

use crate::error::CodecError;

/// Serialize one document to CBOR bytes.
pub fn to_cbor_bytes(doc: &Value) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(doc, &mut out)
        .map_err(|e| CodecError::MalformedCbor(e.to_string()))?;
    Ok(out)
}

/// Parse one document from CBOR bytes.
pub fn from_cbor_bytes(bytes: &[u8]) -> Result<Value, CodecError> {
    ciborium::de::from_reader(bytes).map_err(|e| CodecError::MalformedCbor(e.to_string()))
}
