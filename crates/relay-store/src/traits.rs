use relay_types::{Block, Link};

use crate::error::{StoreError, StoreResult};

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same bytes always produce the
///   same link, so writing a block that is already present is a no-op.
/// - Writes are idempotent and commutative for identical content, so
///   overlapping block sets may be flushed concurrently without locking.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read a block by link.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    fn get(&self, link: &Link) -> StoreResult<Option<Block>>;

    /// Write a block. Idempotent.
    fn put(&self, block: &Block) -> StoreResult<()>;

    /// Check whether a block exists.
    fn contains(&self, link: &Link) -> StoreResult<bool>;

    /// Read a block that must exist.
    fn require(&self, link: &Link) -> StoreResult<Block> {
        self.get(link)?.ok_or(StoreError::NotFound(*link))
    }

    /// Read multiple blocks in a batch.
    ///
    /// Default implementation calls `get()` for each link.
    fn get_batch(&self, links: &[Link]) -> StoreResult<Vec<Option<Block>>> {
        links.iter().map(|link| self.get(link)).collect()
    }

    /// Write multiple blocks in a batch.
    ///
    /// Default implementation calls `put()` for each block. Backends may
    /// override for better performance (e.g., single fsync).
    fn put_batch(&self, blocks: &[Block]) -> StoreResult<()> {
        blocks.iter().try_for_each(|block| self.put(block))
    }
}
