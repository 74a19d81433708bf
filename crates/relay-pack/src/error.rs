use relay_types::Link;
use thiserror::Error;

use crate::kind::BundleKind;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("invalid bundle magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported bundle version: {0}")]
    UnsupportedVersion(u32),

    #[error("unknown bundle kind byte: {0}")]
    UnknownKind(u8),

    #[error("unexpected bundle kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: BundleKind,
        actual: BundleKind,
    },

    #[error("bundle checksum mismatch")]
    ChecksumMismatch,

    #[error("bundle truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("corrupt bundle entry at offset {offset}: {reason}")]
    CorruptEntry { offset: usize, reason: String },

    #[error("CRC32 mismatch for block {link}")]
    CrcMismatch { link: Link },

    #[error("block bytes do not hash to {link}")]
    LinkMismatch { link: Link },

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),
}

pub type PackResult<T> = Result<T, PackError>;
