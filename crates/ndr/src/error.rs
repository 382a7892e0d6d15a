//! NDR error types

use std::sync::Arc;
use thiserror::Error;

/// Upper bound on a single decoded allocation unless configured otherwise.
pub const MAX_NDR_ALLOCATION_SIZE: usize = 16 * 1024 * 1024;

/// NDR encoding/decoding errors
///
/// A codec keeps the first failure and hands a clone of it back from every
/// later call.
#[derive(Debug, Clone, Error)]
pub enum NdrError {
    /// Input ended in the middle of a primitive or header
    #[error("unexpected end of data: needed {needed} bytes, have {have}")]
    UnexpectedEof { needed: usize, have: usize },

    /// The sink accepted fewer bytes than requested
    #[error("short write: requested {requested} bytes, wrote {written}")]
    ShortWrite { requested: usize, written: usize },

    /// Pointer map lookup resolved to something that is not the expected referent
    #[error("unaligned reference: referent ID {0:#x}")]
    UnalignedReference(u64),

    /// A `[ref]` pointer was transmitted as null
    #[error("null reference pointer")]
    NullReference,

    /// Alignment that is not a power of two
    #[error("invalid alignment: {0}")]
    InvalidAlignment(usize),

    /// Invalid string - not null terminated or invalid encoding
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// Conformance/variance header is inconsistent
    #[error("conformance mismatch: max_count={max_count}, offset={offset}, actual_count={actual_count}")]
    ConformanceMismatch { max_count: u64, offset: u64, actual_count: u64 },

    /// Decoded size exceeds the configured limit
    #[error("allocation limit exceeded: requested {requested}, limit {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// Size arithmetic overflowed
    #[error("integer overflow")]
    IntegerOverflow,

    /// Enumeration value does not fit the wire representation
    #[error("invalid enum value: {0}")]
    InvalidEnum(i64),

    /// Type serialization header is malformed
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The other side of a hand-off buffer went away
    #[error("hand-off buffer closed")]
    HandoffClosed,

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// UTF-16 decoding error
    #[error("UTF-16 error: {0}")]
    Utf16(#[from] std::char::DecodeUtf16Error),

    /// Error from the underlying byte source or sink
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

impl From<std::io::Error> for NdrError {
    fn from(err: std::io::Error) -> Self {
        NdrError::Io(Arc::new(err))
    }
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;
