//! Value-tag and key-tag rewrites over CBOR trees.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use base64::Engine;
use ciborium::value::Value;
use multibase::Base;

use super::constants::{
    key_name, key_tag, AT_URI_PREFIX, CID_RAW_LEN, CID_TEXT_LEN, DID_KEY_PREFIX, DID_KEY_RAW_LEN,
    SIG_RAW_LEN, SIG_TEXT_LEN, TAG_AT_URI, TAG_CID, TAG_DID_KEY, TAG_SIG,
};
use crate::error::CodecError;

/// Recursively apply semantic-tag compression to a tree: every text leaf
/// goes through [`compress_leaf`], every map key through [`compress_key`].
pub fn compress(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(compress).collect()),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (compress_key(k), compress(v)))
                .collect(),
        ),
        other => compress_leaf(other),
    }
}

/// Recursively expand semantic tags in a tree back to their textual forms.
pub fn expand(value: Value) -> Result<Value, CodecError> {
    match value {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(expand)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Value::Map(entries) => {
            let mut out = Vec::with_capacity(entries.len());
            for (k, v) in entries {
                out.push((expand_key(k)?, expand(v)?));
            }
            Ok(Value::Map(out))
        }
        other => expand_leaf(other),
    }
}

/// Compress a single value if it matches one of the known shapes; anything
/// else is returned unmodified. Prefix tests run before length tests, in
/// the same order the expansion side distinguishes them.
pub fn compress_leaf(value: Value) -> Value {
    let Value::Text(s) = value else { return value };
    if let Some(tail) = s.strip_prefix(DID_KEY_PREFIX) {
        if let Ok(raw) = bs58::decode(tail).into_vec() {
            if raw.len() == DID_KEY_RAW_LEN {
                return Value::Tag(TAG_DID_KEY, Box::new(Value::Bytes(raw)));
            }
        }
    }
    if let Some(suffix) = s.strip_prefix(AT_URI_PREFIX) {
        let suffix = suffix.to_string();
        return Value::Tag(TAG_AT_URI, Box::new(Value::Text(suffix)));
    }
    if s.len() == CID_TEXT_LEN && s.starts_with('b') {
        if let Ok((Base::Base32Lower, raw)) = multibase::decode(&s) {
            if raw.len() == CID_RAW_LEN {
                return Value::Tag(TAG_CID, Box::new(Value::Bytes(raw)));
            }
        }
    }
    if s.len() == SIG_TEXT_LEN {
        if let Ok(raw) = B64URL.decode(&s) {
            if raw.len() == SIG_RAW_LEN {
                return Value::Tag(TAG_SIG, Box::new(Value::Bytes(raw)));
            }
        }
    }
    Value::Text(s)
}

/// Expand one tagged value back to its original string form. Tags outside
/// 6..=9 pass through untouched.
pub fn expand_leaf(value: Value) -> Result<Value, CodecError> {
    let Value::Tag(tag, inner) = value else {
        return Ok(value);
    };
    match tag {
        TAG_SIG => {
            let raw = payload_bytes(tag, *inner, SIG_RAW_LEN)?;
            Ok(Value::Text(B64URL.encode(raw)))
        }
        TAG_CID => {
            let raw = payload_bytes(tag, *inner, CID_RAW_LEN)?;
            Ok(Value::Text(multibase::encode(Base::Base32Lower, raw)))
        }
        TAG_DID_KEY => {
            let raw = payload_bytes(tag, *inner, DID_KEY_RAW_LEN)?;
            let tail = bs58::encode(raw).into_string();
            Ok(Value::Text(format!("{DID_KEY_PREFIX}{tail}")))
        }
        TAG_AT_URI => match *inner {
            Value::Text(suffix) => Ok(Value::Text(format!("{AT_URI_PREFIX}{suffix}"))),
            _ => Err(CodecError::TagPayloadInvalid {
                tag,
                reason: "expected text payload".to_string(),
            }),
        },
        other => Ok(Value::Tag(other, inner)),
    }
}

/// Replace a well-known text key with its key tag; other keys pass through.
pub fn compress_key(key: Value) -> Value {
    match key {
        Value::Text(s) => match key_tag(&s) {
            Some(tag) => Value::Tag(tag, Box::new(Value::Null)),
            None => Value::Text(s),
        },
        other => other,
    }
}

/// Expand a key-tagged map key back to its field name. Text keys are
/// accepted as-is: producers may emit known keys uncompressed.
pub fn expand_key(key: Value) -> Result<Value, CodecError> {
    match key {
        Value::Tag(tag, inner) => match key_name(tag) {
            Some(name) => Ok(Value::Text(name.to_string())),
            None if (TAG_SIG..=19).contains(&tag) => Err(CodecError::UnknownKeyTag(tag)),
            None => Ok(Value::Tag(tag, inner)),
        },
        other => Ok(other),
    }
}

fn payload_bytes(tag: u64, inner: Value, want: usize) -> Result<Vec<u8>, CodecError> {
    match inner {
        Value::Bytes(raw) if raw.len() == want => Ok(raw),
        Value::Bytes(raw) => Err(CodecError::TagPayloadInvalid {
            tag,
            reason: format!("expected {want} bytes, got {}", raw.len()),
        }),
        _ => Err(CodecError::TagPayloadInvalid {
            tag,
            reason: "expected byte string payload".to_string(),
        }),
    }
}
