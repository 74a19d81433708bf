use relay_graph::GraphError;
use relay_resolver::ResolverError;
use relay_store::StoreError;
use relay_types::TypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// No durable entry for the requested history, root, or block.
    #[error("not found: {0}")]
    NotFound(String),

    /// An incoming bundle could not be restored. Nothing was written.
    #[error("malformed bundle: {0}")]
    MalformedBundle(#[source] GraphError),

    /// A restored bundle names a history id the resolver cannot hold.
    /// Nothing was written.
    #[error("bundle carries an invalid history id: {0}")]
    InvalidHistoryId(#[source] ResolverError),

    /// A client-supplied link string does not parse.
    #[error("invalid link {input:?}: {source}")]
    InvalidLink {
        input: String,
        #[source]
        source: TypeError,
    },

    #[error("merge failed: {0}")]
    Merge(#[source] GraphError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    #[error("internal error: {0}")]
    Internal(#[from] GraphError),
}

impl SyncError {
    /// Whether the failure was caused by the request rather than the relay.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidLink { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
