use thiserror::Error;

use grove_container::ContainerError;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid container magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u32),

    #[error("container checksum mismatch")]
    ChecksumMismatch,

    #[error("truncated container at offset {offset}: {reason}")]
    Truncated { offset: usize, reason: String },

    #[error("corrupt node at offset {offset}: {reason}")]
    CorruptNode { offset: usize, reason: String },

    #[error("unknown type class code: {0}")]
    UnknownTypeClass(u8),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

impl From<FormatError> for ContainerError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => ContainerError::Io(e),
            other => ContainerError::Corrupt {
                reason: other.to_string(),
            },
        }
    }
}
