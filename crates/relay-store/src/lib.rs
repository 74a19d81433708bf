//! Content-addressed block storage for the graph relay.
//!
//! Every piece of relay data (version-store roots, graph versions, chunked
//! collections, raw chunks) is an immutable [`Block`](relay_types::Block)
//! keyed by its [`Link`](relay_types::Link).
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and ephemeral relays
//! - [`FsBlockStore`] -- one file per block under a sharded directory tree
//! - [`StagingStore`] -- per-operation transient store layered over a durable
//!   store; commits wholesale on success, discarded on drop otherwise
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content addressing guarantees this).
//! 2. Stage, validate, then flush: nothing touches the durable store until an
//!    operation has fully succeeded.
//! 3. The store never interprets block contents.

pub mod error;
pub mod fs;
pub mod memory;
pub mod staging;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use staging::StagingStore;
pub use traits::BlockStore;
