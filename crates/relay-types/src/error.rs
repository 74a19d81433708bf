use thiserror::Error;

use crate::link::Link;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("block bytes do not match link {expected}: computed {computed}")]
    LinkMismatch { expected: Link, computed: Link },
}
