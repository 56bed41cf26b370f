//! Semantic-tag substitution for PLC document trees.
//!
//! Verbose textual leaves (base64url signatures, base32lower CIDs,
//! `did:key` strings, `at://` URIs) are rewritten to compact tagged binary
//! forms, and well-known field names to single-byte key tags. DAG-CBOR
//! admits only tag 42, so a stream carrying tags 6..=19 is unambiguously a
//! compressed stream while remaining well-formed CBOR.

mod codec;
mod constants;

pub use codec::{compress, compress_key, compress_leaf, expand, expand_key, expand_leaf};
pub use constants::{
    key_name, key_tag, AT_URI_PREFIX, CID_RAW_LEN, CID_TEXT_LEN, DID_KEY_PREFIX, DID_KEY_RAW_LEN,
    SIG_RAW_LEN, SIG_TEXT_LEN, TAG_AT_URI, TAG_CID, TAG_DID_KEY, TAG_SIG,
};
