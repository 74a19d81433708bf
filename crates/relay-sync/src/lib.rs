//! Relay orchestration for the graph relay.
//!
//! [`RelayStore`] implements push and pull of version-store bundles, graph
//! versions, root indexes, and random block sets over a shared durable
//! block store and history resolver.
//!
//! On a version-store push the relay decides between three outcomes:
//! register a history it has never seen, recognize a root it already holds,
//! or merge a divergent head with the one it holds. All writes are staged
//! and committed only when the operation succeeds.

pub mod error;
pub mod relay;
pub mod types;

pub use error::{SyncError, SyncResult};
pub use relay::RelayStore;
pub use types::{PushStatus, PushStoreResult};
