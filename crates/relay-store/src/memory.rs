use std::collections::HashMap;
use std::sync::RwLock;

use relay_types::{Block, Link};

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// In-memory, HashMap-based block store.
///
/// Used for tests, for the default ephemeral relay, and as the private map
/// behind every [`StagingStore`](crate::StagingStore). Blocks are held behind
/// a `RwLock` for safe concurrent access and cloned on read.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<Link, Block>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_map()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_map()?.is_empty())
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        Ok(self
            .read_map()?
            .values()
            .map(|block| block.len() as u64)
            .sum())
    }

    /// Return a sorted list of all links in the store.
    pub fn links(&self) -> StoreResult<Vec<Link>> {
        let mut links: Vec<Link> = self.read_map()?.keys().copied().collect();
        links.sort();
        Ok(links)
    }

    /// Snapshot of every stored block, sorted by link.
    pub fn blocks(&self) -> StoreResult<Vec<Block>> {
        let mut blocks: Vec<Block> = self.read_map()?.values().cloned().collect();
        blocks.sort_by_key(|block| block.link());
        Ok(blocks)
    }

    /// Remove and return every stored block, sorted by link.
    pub fn drain(&self) -> StoreResult<Vec<Block>> {
        let mut map = self
            .blocks
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        let mut blocks: Vec<Block> = map.drain().map(|(_, block)| block).collect();
        blocks.sort_by_key(|block| block.link());
        Ok(blocks)
    }

    fn read_map(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, HashMap<Link, Block>>> {
        self.blocks
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, link: &Link) -> StoreResult<Option<Block>> {
        Ok(self.read_map()?.get(link).cloned())
    }

    fn put(&self, block: &Block) -> StoreResult<()> {
        let mut map = self
            .blocks
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        // Same link always means same bytes; keep the first copy.
        map.entry(block.link()).or_insert_with(|| block.clone());
        Ok(())
    }

    fn contains(&self, link: &Link) -> StoreResult<bool> {
        Ok(self.read_map()?.contains_key(link))
    }

    fn put_batch(&self, blocks: &[Block]) -> StoreResult<()> {
        let mut map = self
            .blocks
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        for block in blocks {
            map.entry(block.link()).or_insert_with(|| block.clone());
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.read_map().map(|map| map.len()).unwrap_or_default();
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(content: &[u8]) -> Block {
        Block::new(content.to_vec())
    }

    #[test]
    fn put_and_get() {
        let store = InMemoryBlockStore::new();
        let b = block(b"hello world");
        store.put(&b).unwrap();

        let read_back = store.get(&b.link()).unwrap().expect("should exist");
        assert_eq!(read_back, b);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryBlockStore::new();
        assert!(store.get(&Link::for_bytes(b"missing")).unwrap().is_none());
    }

    #[test]
    fn require_missing_is_not_found() {
        let store = InMemoryBlockStore::new();
        let link = Link::for_bytes(b"missing");
        let err = store.require(&link).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(l) if l == link));
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryBlockStore::new();
        let b = block(b"idempotent");
        store.put(&b).unwrap();
        store.put(&b).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn contains_reflects_writes() {
        let store = InMemoryBlockStore::new();
        let b = block(b"present");
        assert!(!store.contains(&b.link()).unwrap());
        store.put(&b).unwrap();
        assert!(store.contains(&b.link()).unwrap());
    }

    #[test]
    fn batch_roundtrip() {
        let store = InMemoryBlockStore::new();
        let blocks = vec![block(b"batch-1"), block(b"batch-2"), block(b"batch-3")];
        store.put_batch(&blocks).unwrap();
        assert_eq!(store.len().unwrap(), 3);

        let links: Vec<Link> = blocks.iter().map(Block::link).collect();
        let read_back = store.get_batch(&links).unwrap();
        for (expected, got) in blocks.iter().zip(read_back) {
            assert_eq!(got.as_ref(), Some(expected));
        }
    }

    #[test]
    fn total_bytes_and_links() {
        let store = InMemoryBlockStore::new();
        store.put(&block(b"12345")).unwrap();
        store.put(&block(b"123456789")).unwrap();
        assert_eq!(store.total_bytes().unwrap(), 14);

        let links = store.links().unwrap();
        assert_eq!(links.len(), 2);
        assert!(links[0] <= links[1]);
    }

    #[test]
    fn drain_empties_the_store() {
        let store = InMemoryBlockStore::new();
        store.put(&block(b"a")).unwrap();
        store.put(&block(b"b")).unwrap();

        let drained = store.drain().unwrap();
        assert_eq!(drained.len(), 2);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn concurrent_writers_of_same_content() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryBlockStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(&block(b"shared")).unwrap())
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryBlockStore::new();
        store.put(&block(b"x")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryBlockStore"));
        assert!(debug.contains("block_count"));
    }
}
