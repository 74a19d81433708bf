use std::sync::Arc;

use relay_types::{Block, Link};

use crate::error::StoreResult;
use crate::memory::InMemoryBlockStore;
use crate::traits::BlockStore;

/// Transient block store scoped to a single relay operation.
///
/// Writes land in a private in-memory map. Reads consult the staged blocks
/// first and then fall through, read-only, to the durable store the staging
/// area was opened over. Nothing reaches the durable store until
/// [`commit`](Self::commit) is called; dropping the staging store without
/// committing discards every staged block.
pub struct StagingStore {
    staged: InMemoryBlockStore,
    durable: Arc<dyn BlockStore>,
}

impl StagingStore {
    /// Open an empty staging area over `durable`.
    pub fn new(durable: Arc<dyn BlockStore>) -> Self {
        Self {
            staged: InMemoryBlockStore::new(),
            durable,
        }
    }

    /// Number of blocks written since the last commit.
    pub fn staged_len(&self) -> StoreResult<usize> {
        self.staged.len()
    }

    /// Links of the blocks written since the last commit, sorted.
    pub fn staged_links(&self) -> StoreResult<Vec<Link>> {
        self.staged.links()
    }

    /// Whether `link` was written into this staging area (ignoring the
    /// durable store).
    pub fn is_staged(&self, link: &Link) -> StoreResult<bool> {
        self.staged.contains(link)
    }

    /// Flush every staged block into the durable store.
    ///
    /// Returns the number of blocks flushed. The staging area is empty
    /// afterwards and may be reused.
    pub fn commit(&self) -> StoreResult<usize> {
        let blocks = self.staged.drain()?;
        let count = blocks.len();
        if count > 0 {
            self.durable.put_batch(&blocks)?;
        }
        tracing::debug!(blocks = count, "committed staged blocks");
        Ok(count)
    }
}

impl BlockStore for StagingStore {
    fn get(&self, link: &Link) -> StoreResult<Option<Block>> {
        match self.staged.get(link)? {
            Some(block) => Ok(Some(block)),
            None => self.durable.get(link),
        }
    }

    fn put(&self, block: &Block) -> StoreResult<()> {
        self.staged.put(block)
    }

    fn contains(&self, link: &Link) -> StoreResult<bool> {
        Ok(self.staged.contains(link)? || self.durable.contains(link)?)
    }

    fn put_batch(&self, blocks: &[Block]) -> StoreResult<()> {
        self.staged.put_batch(blocks)
    }
}

impl std::fmt::Debug for StagingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingStore")
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}
