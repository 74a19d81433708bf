//! Error types for resolver operations.

use thiserror::Error;

/// Errors that can occur during resolver operations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The history identifier is not acceptable.
    #[error("invalid history id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// Serialization or deserialization failure of the resolver file.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lock protecting resolver state was poisoned.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// I/O error during file-based resolver operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for resolver operations.
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;
