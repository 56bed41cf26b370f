//! Tag numbers and shape constants.
//!
//! Tags 0..=5 carry standard CBOR semantics (datetime, bignum) and are
//! avoided; tag 42 is reserved by DAG-CBOR and never emitted.

/// 86-char base64url signature -> 64 raw bytes.
pub const TAG_SIG: u64 = 6;
/// 59-char base32lower multibase CID -> 36 raw bytes.
pub const TAG_CID: u64 = 7;
/// `did:key:z...` string -> 35 raw bytes (multicodec varint + compressed key).
pub const TAG_DID_KEY: u64 = 8;
/// `at://...` URI -> suffix text.
pub const TAG_AT_URI: u64 = 9;

pub const SIG_TEXT_LEN: usize = 86;
pub const SIG_RAW_LEN: usize = 64;
pub const CID_TEXT_LEN: usize = 59;
pub const CID_RAW_LEN: usize = 36;
pub const DID_KEY_RAW_LEN: usize = 35;

pub const DID_KEY_PREFIX: &str = "did:key:z";
pub const AT_URI_PREFIX: &str = "at://";

/// Well-known PLC operation field names, tag-numbered 10..=19.
const KEY_TABLE: [&str; 10] = [
    "sig",
    "prev",
    "type",
    "services",
    "alsoKnownAs",
    "rotationKeys",
    "verificationMethods",
    "atproto_pds",
    "endpoint",
    "atproto",
];

const KEY_TAG_BASE: u64 = 10;

/// Tag number for a well-known field name, if any.
pub fn key_tag(key: &str) -> Option<u64> {
    KEY_TABLE
        .iter()
        .position(|&name| name == key)
        .map(|pos| KEY_TAG_BASE + pos as u64)
}

/// Field name for a key tag in 10..=19, if any.
pub fn key_name(tag: u64) -> Option<&'static str> {
    tag.checked_sub(KEY_TAG_BASE)
        .and_then(|off| usize::try_from(off).ok())
        .and_then(|off| KEY_TABLE.get(off).copied())
}
