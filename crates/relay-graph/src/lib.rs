//! Versioned property graph over content-addressed blocks.
//!
//! This crate supplies the pieces the relay orchestrator drives:
//!
//! - [`Chunker`]: fixed-size splitting of large values into blocks
//! - [`GraphState`]: vertices, edges, and properties of one version
//! - [`VersionStore`]: a replica lineage (history id, version log, head),
//!   with [`VersionStore::merge_versions`] reconciling divergent heads
//! - [`Tx`]: batched graph edits committed as a new version
//! - [`packer`]: bundle packing and restoring for version stores, graph
//!   versions, root indexes, and random block sets
//!
//! Structured blocks are JSON-encoded [`Node`]s; large values are split into
//! raw chunk blocks referenced from a chunk list node.

pub mod chunker;
pub mod error;
pub mod graph;
pub mod node;
pub mod packer;
pub mod tx;
pub mod version;

pub use chunker::{Chunker, DEFAULT_CHUNK_SIZE};
pub use error::{GraphError, GraphResult};
pub use graph::{read_root_index, Edge, GraphState, Prop, Vertex};
pub use node::{Node, RootIndex};
pub use packer::{
    pack_graph_version, pack_random_blocks, pack_root_index, pack_version_store,
    restore_graph_version, restore_random_blocks, restore_root_index, restore_version_store,
};
pub use tx::Tx;
pub use version::{MergeOutcome, Version, VersionStore};
