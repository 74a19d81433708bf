//! Bundle wire format for the graph relay.
//!
//! A bundle is a self-describing byte sequence carrying a set of blocks and
//! the root links needed to rebuild whatever structure it transports.
//!
//! # Layout
//!
//! ```text
//! "GRLB" | version u32 BE | kind u8 | root count varint | roots (32 bytes each)
//! block count u32 BE
//! per block: link (32) | uncompressed size varint | compressed size varint
//!            | CRC32 of compressed data (u32 BE) | zstd data
//! trailer: BLAKE3 of every preceding byte
//! ```
//!
//! - [`BundleWriter`]: builds bundles, deduplicating blocks
//! - [`Bundle::decode`]: parses and verifies bundles

pub mod error;
pub mod kind;
pub mod reader;
pub mod writer;

pub use error::{PackError, PackResult};
pub use kind::BundleKind;
pub use reader::Bundle;
pub use writer::BundleWriter;
