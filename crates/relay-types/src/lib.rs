//! Foundation types for the graph relay.
//!
//! Every other relay crate depends on `relay-types`.
//!
//! # Key Types
//!
//! - [`Link`]: Content identifier (BLAKE3 digest of a block's bytes)
//! - [`Block`]: Immutable `{link, bytes}` pair; the unit of storage and transfer

pub mod block;
pub mod error;
pub mod link;

pub use block::Block;
pub use error::TypeError;
pub use link::Link;
