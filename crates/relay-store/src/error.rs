use relay_types::Link;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested block was not found.
    #[error("block not found: {0}")]
    NotFound(Link),

    /// Stored bytes no longer hash to their link (data corruption).
    #[error("hash mismatch for {link}: computed {computed}")]
    HashMismatch { link: Link, computed: Link },

    /// Bytes could not be assembled into a valid block.
    #[error("invalid block: {0}")]
    InvalidBlock(#[from] relay_types::TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
