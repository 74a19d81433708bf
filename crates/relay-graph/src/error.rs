use relay_pack::PackError;
use relay_store::StoreError;
use relay_types::Link;
use thiserror::Error;

/// Errors from graph, version-store, and packer operations.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("bundle error: {0}")]
    Pack(#[from] PackError),

    #[error("node codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("block not found: {0}")]
    MissingBlock(Link),

    #[error("block {link} is not a {expected} node")]
    UnexpectedNode { link: Link, expected: &'static str },

    #[error("bundle carries no root")]
    MissingRoot,

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("cannot merge version store {theirs} into {ours}")]
    HistoryMismatch { ours: String, theirs: String },

    #[error("version log is empty")]
    EmptyLog,

    #[error("unknown element: {0}")]
    UnknownElement(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
