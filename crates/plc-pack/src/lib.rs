//! Differential compression for DID:PLC operation chains.
//!
//! A PLC identity's audit log is a chronologically ordered chain of
//! CBOR-encoded operations in which consecutive entries differ only
//! slightly, and whose leaves are verbose textual encodings of binary data
//! (base64url signatures, base32lower CIDs, base58btc `did:key`s, `at://`
//! URIs). This crate packs such a chain into one compact CBOR array:
//!
//! ```text
//! [ full_op, diff_1, diff_2, ... ]
//! ```
//!
//! `full_op` is the first operation with semantic-tag compression applied
//! ([`tags`]); every `diff_N` is an edit script ([`diff::EditScript`])
//! addressing the previous operation through its flat structural indices
//! ([`index`]). Decompression is bit-exact: re-serializing each decoded
//! operation reproduces the ingested bytes, which is what keeps the
//! CID-hash links of the chain intact.
//!
//! Documents are [`ciborium::value::Value`] trees; map entries keep
//! insertion order and order-sensitive equality, both of which the codec
//! depends on.

pub mod convert;
pub mod diff;
pub mod error;
pub mod index;
pub mod stream;
pub mod tags;

pub use ciborium::value::Value;

pub use convert::{doc_to_json, json_to_doc};
pub use diff::{apply, diff_updates, EditScript};
pub use error::{ChainError, CodecError};
pub use index::{flatten, node_span, DocIndex, IndexEntry, NodeKind, Slot};
pub use stream::{compress_chain, decode, encode, from_cbor_bytes, to_cbor_bytes};
