//! HTTP server for the graph relay.
//!
//! Exposes [`RelayStore`](relay_sync::RelayStore) over a small REST API
//! built on axum. Bundles travel as `application/octet-stream` bodies and
//! every other payload as JSON. Failures carry only a status code.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, StorageBackend, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::RelayServer;
pub use state::{build_relay, AppState};
