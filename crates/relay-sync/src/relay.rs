use std::sync::Arc;

use relay_graph::{
    pack_graph_version, pack_random_blocks, pack_root_index, pack_version_store,
    restore_graph_version, restore_random_blocks, restore_version_store, Chunker, VersionStore,
};
use relay_protocol::{ProtocolVersion, PROTOCOL_VERSION};
use relay_resolver::{validate_history_id, HistoryLocks, HistoryResolver};
use relay_store::{BlockStore, StagingStore};
use relay_types::Link;

use crate::error::{SyncError, SyncResult};
use crate::types::{PushStatus, PushStoreResult};

/// The relay orchestrator.
///
/// Every mutating operation restores its bundle into a fresh
/// [`StagingStore`] and only commits it to the durable store once the whole
/// operation has succeeded; on any error the staging store is dropped and
/// durable state is untouched. Version-store pushes for the same history
/// are serialized through [`HistoryLocks`] from the resolver read until
/// after the resolver write. Pulls read committed state and take no locks.
#[derive(Clone)]
pub struct RelayStore {
    blocks: Arc<dyn BlockStore>,
    resolver: Arc<dyn HistoryResolver>,
    locks: HistoryLocks,
}

impl RelayStore {
    pub fn new(blocks: Arc<dyn BlockStore>, resolver: Arc<dyn HistoryResolver>) -> Self {
        Self {
            blocks,
            resolver,
            locks: HistoryLocks::new(),
        }
    }

    /// The durable block store.
    pub fn blocks(&self) -> &Arc<dyn BlockStore> {
        &self.blocks
    }

    pub fn resolver(&self) -> &Arc<dyn HistoryResolver> {
        &self.resolver
    }

    /// Accept a version-store bundle.
    ///
    /// The first push for a history registers it. A push of the root the
    /// relay already holds is a no-op. Any other push is merged with the
    /// relay's current head for that history, and the merged head becomes
    /// the new entry.
    pub async fn push_version_store(
        &self,
        chunker: &Chunker,
        bundle: &[u8],
    ) -> SyncResult<PushStoreResult> {
        let staging = StagingStore::new(Arc::clone(&self.blocks));
        let mut incoming = restore_version_store(bundle, &staging, *chunker)
            .map_err(SyncError::MalformedBundle)?;
        let incoming_root = incoming.version_store_root();
        let id = incoming.id().to_string();
        validate_history_id(&id).map_err(SyncError::InvalidHistoryId)?;

        let _guard = self.locks.lock(&id).await;

        let existing_root = match self.resolver.resolve(&id)? {
            None => {
                let flushed = flush(staging).await?;
                self.record(&id, incoming_root).await?;
                tracing::info!(history = %id, root = %incoming_root, blocks = flushed, "registered history");
                return Ok(PushStoreResult {
                    store_root: incoming_root,
                    version_root: incoming.current_root(),
                    status: PushStatus::Created,
                });
            }
            Some(root) if root == incoming_root => {
                tracing::debug!(history = %id, root = %incoming_root, "history already at pushed root");
                return Ok(PushStoreResult {
                    store_root: incoming_root,
                    version_root: incoming.current_root(),
                    status: PushStatus::Unchanged,
                });
            }
            Some(root) => root,
        };

        // Bring the relay's current head into the same staging area so both
        // histories' blocks sit side by side for the merge.
        let durable = VersionStore::load(self.blocks.as_ref(), *chunker, existing_root)?;
        let existing_bundle = pack_version_store(self.blocks.as_ref(), &durable)?;
        let existing = restore_version_store(&existing_bundle, &staging, *chunker)?;

        let outcome = incoming
            .merge_versions(&staging, &existing)
            .map_err(SyncError::Merge)?;

        let status = if outcome.store_root == existing_root {
            PushStatus::Unchanged
        } else if outcome.store_root == incoming_root {
            PushStatus::FastForward
        } else {
            PushStatus::Merged
        };

        let flushed = flush(staging).await?;
        if status != PushStatus::Unchanged {
            self.record(&id, outcome.store_root).await?;
        }
        tracing::info!(
            history = %id,
            root = %outcome.store_root,
            previous = %existing_root,
            blocks = flushed,
            merge_blocks = outcome.blocks.len(),
            status = status.as_str(),
            "reconciled pushed history"
        );

        Ok(PushStoreResult {
            store_root: outcome.store_root,
            version_root: outcome.version_root,
            status,
        })
    }

    /// Accept a single graph version. Does not touch the resolver.
    pub async fn push_graph_version(&self, bundle: &[u8]) -> SyncResult<Link> {
        let staging = StagingStore::new(Arc::clone(&self.blocks));
        let root = restore_graph_version(bundle, &staging).map_err(SyncError::MalformedBundle)?;
        let flushed = flush(staging).await?;
        tracing::info!(root = %root, blocks = flushed, "stored graph version");
        Ok(root)
    }

    /// Accept an unordered block set, returning how many blocks it carried.
    pub async fn push_random_blocks(&self, bundle: &[u8]) -> SyncResult<usize> {
        let staging = StagingStore::new(Arc::clone(&self.blocks));
        let links = restore_random_blocks(bundle, &staging).map_err(SyncError::MalformedBundle)?;
        flush(staging).await?;
        tracing::info!(blocks = links.len(), "stored random blocks");
        Ok(links.len())
    }

    /// Bundle the relay's current version store for history `id`.
    pub async fn pull_version_store(&self, chunker: &Chunker, id: &str) -> SyncResult<Vec<u8>> {
        let root = self.resolve(id).await?;
        let versions = VersionStore::load(self.blocks.as_ref(), *chunker, root)?;
        let bundle = pack_version_store(self.blocks.as_ref(), &versions)?;
        tracing::debug!(history = %id, root = %root, bytes = bundle.len(), "packed version store");
        Ok(bundle)
    }

    /// Bundle everything needed to rebuild the graph version at `root`.
    pub async fn pull_graph_version(&self, root: &str) -> SyncResult<Vec<u8>> {
        let root = self.require_stored(root)?;
        Ok(pack_graph_version(self.blocks.as_ref(), &root)?)
    }

    /// Bundle only the root index of the graph version at `root`.
    pub async fn pull_root_index(&self, root: &str) -> SyncResult<Vec<u8>> {
        let root = self.require_stored(root)?;
        Ok(pack_root_index(self.blocks.as_ref(), &root)?)
    }

    /// Bundle the named blocks. Fails as a whole if any link does not parse
    /// or names a block the relay does not hold.
    pub async fn pull_random_blocks(&self, links: &[String]) -> SyncResult<Vec<u8>> {
        let mut blocks = Vec::with_capacity(links.len());
        for input in links {
            let link = Link::parse(input).map_err(|e| {
                tracing::warn!(link = %input, error = %e, "unparsable link in block pull");
                SyncError::NotFound(format!("block {input}"))
            })?;
            let block = self.blocks.get(&link)?.ok_or_else(|| {
                tracing::warn!(link = %link, "block pull names a missing block");
                SyncError::NotFound(format!("block {link}"))
            })?;
            blocks.push(block);
        }
        Ok(pack_random_blocks(blocks)?)
    }

    /// Current version-store root for history `id`.
    pub async fn resolve(&self, id: &str) -> SyncResult<Link> {
        self.resolver
            .resolve(id)?
            .ok_or_else(|| SyncError::NotFound(format!("history {id}")))
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        PROTOCOL_VERSION
    }

    /// Point history `id` at `root` off the async worker threads.
    async fn record(&self, id: &str, root: Link) -> SyncResult<()> {
        let resolver = Arc::clone(&self.resolver);
        let id = id.to_string();
        tokio::task::spawn_blocking(move || resolver.update(&id, root)).await??;
        Ok(())
    }

    fn require_stored(&self, root: &str) -> SyncResult<Link> {
        let link = Link::parse(root).map_err(|source| SyncError::InvalidLink {
            input: root.to_string(),
            source,
        })?;
        if !self.blocks.contains(&link)? {
            return Err(SyncError::NotFound(format!("root {link}")));
        }
        Ok(link)
    }
}

/// Flush a staging area into its durable store on the blocking pool.
async fn flush(staging: StagingStore) -> SyncResult<usize> {
    Ok(tokio::task::spawn_blocking(move || staging.commit()).await??)
}

impl std::fmt::Debug for RelayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayStore")
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}
