use thiserror::Error;

/// Errors produced while compressing or decompressing a single document or
/// edit script. All are fatal to the current stream; nothing is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed cbor: {0}")]
    MalformedCbor(String),
    #[error("index {0} out of range")]
    IndexOutOfRange(u64),
    #[error("edit kind incompatible with node at index {0}")]
    WrongContainerKind(u64),
    #[error("malformed edit: {0}")]
    MalformedEdit(String),
    #[error("tag {tag} payload invalid: {reason}")]
    TagPayloadInvalid { tag: u64, reason: String },
    #[error("unknown key tag {0}")]
    UnknownKeyTag(u64),
    #[error("chain step is not expressible as leaf updates")]
    DiffUnrepresentable,
}

/// A [`CodecError`] positioned within a chain: `index` is the ordinal of the
/// document whose encode or decode failed (0 is the full operation, 1.. are
/// the diffed operations).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("document {index}: {source}")]
pub struct ChainError {
    pub index: usize,
    #[source]
    pub source: CodecError,
}

impl ChainError {
    pub(crate) fn at(index: usize) -> impl FnOnce(CodecError) -> ChainError {
        move |source| ChainError { index, source }
    }
}
