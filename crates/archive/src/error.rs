use telemetry_buffers::BufferError;
use thiserror::Error;

/// Why an archive could not be produced or read back.
///
/// The public [`crate::archive`]/[`crate::unarchive`] entry points collapse every
/// variant into an absent result; the `try_*` methods on
/// [`crate::KeyedArchiver`] expose it to callers that want the reason.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    // Encode side.
    #[error("type `{0}` is not registered with this archiver")]
    UnsupportedType(String),
    #[error("value cannot be represented in an archive: {0}")]
    Serialization(String),
    #[error("nesting exceeds the depth limit of {0}")]
    DepthLimitExceeded(usize),

    // Decode side.
    #[error("empty archive buffer")]
    Empty,
    #[error("not a keyed archive")]
    BadMagic,
    #[error("unsupported archive format version {0}")]
    UnsupportedVersion(u8),
    #[error("archive buffer is {len} bytes, limit is {max}")]
    BufferTooLarge { len: usize, max: usize },
    #[error("archive buffer ends unexpectedly")]
    Truncated,
    #[error("invalid UTF-8 in archived string")]
    InvalidUtf8,
    #[error("unsupported data item 0x{0:02x}")]
    UnsupportedItem(u8),
    #[error("unknown tag {0}")]
    UnknownTag(u64),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("archived `{type_tag}` is invalid: {reason}")]
    InvalidTypedValue { type_tag: String, reason: String },
    #[error("expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },
    #[error("map keys must be strings")]
    InvalidMapKey,
    #[error("duplicate map key `{0}`")]
    DuplicateKey(String),
    #[error("integer does not fit in 64 bits")]
    IntegerOverflow,
    #[error("{0} trailing bytes after archived value")]
    TrailingBytes(usize),
}

impl From<BufferError> for ArchiveError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => ArchiveError::Truncated,
            BufferError::InvalidUtf8 => ArchiveError::InvalidUtf8,
        }
    }
}
