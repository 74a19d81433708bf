//! Wire protocol for the graph relay.
//!
//! Endpoint paths, JSON request/response messages, and the protocol
//! version descriptor shared by the relay server and its clients. Links
//! cross the wire as their canonical hex string.

pub mod endpoint;
pub mod message;
pub mod version;

pub use endpoint::{endpoints, OCTET_STREAM};
pub use message::{
    IdQuery, PullBlocksRequest, PullStoreQuery, PushBlocksResponse, PushGraphVersionResponse,
    PushStoreQuery, PushStoreResponse,
};
pub use version::{ProtocolVersion, PROTOCOL_VERSION};
