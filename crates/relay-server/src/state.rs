use std::sync::Arc;

use relay_resolver::{FileResolver, HistoryResolver, InMemoryResolver};
use relay_store::{BlockStore, FsBlockStore, InMemoryBlockStore};
use relay_sync::RelayStore;

use crate::config::{ServerConfig, StorageBackend};
use crate::error::{ServerError, ServerResult};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub relay: RelayStore,
}

impl AppState {
    pub fn new(relay: RelayStore) -> Self {
        Self { relay }
    }

    /// Open the storage described by `config`.
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        Ok(Self::new(build_relay(config)?))
    }
}

/// Build a relay over the configured block store and resolver.
pub fn build_relay(config: &ServerConfig) -> ServerResult<RelayStore> {
    let (blocks, resolver): (Arc<dyn BlockStore>, Arc<dyn HistoryResolver>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("using in-memory storage");
                (
                    Arc::new(InMemoryBlockStore::new()),
                    Arc::new(InMemoryResolver::new()),
                )
            }
            StorageBackend::Filesystem => {
                let (Some(blocks_dir), Some(resolver_path)) = (
                    config.storage.blocks_dir(),
                    config.storage.resolver_path(),
                ) else {
                    return Err(ServerError::Config(
                        "filesystem storage requires storage.data_dir".into(),
                    ));
                };
                tracing::info!(blocks = %blocks_dir.display(), resolver = %resolver_path.display(), "using filesystem storage");
                (
                    Arc::new(FsBlockStore::open(blocks_dir)?),
                    Arc::new(FileResolver::open(resolver_path)?),
                )
            }
        };
    Ok(RelayStore::new(blocks, resolver))
}
