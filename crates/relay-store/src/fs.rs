use std::io::Write;
use std::path::{Path, PathBuf};

use relay_types::{Block, Link, TypeError};

use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// Durable block store keeping one file per block.
///
/// Blocks live at `{root}/{first two hex chars}/{full hex link}`. Writes go
/// to a temporary file in the shard directory and are renamed into place, so
/// a reader never observes a partially written block.
#[derive(Debug)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened filesystem block store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn shard_dir(&self, link: &Link) -> PathBuf {
        let hex = link.to_hex();
        self.root.join(&hex[..2])
    }

    fn block_path(&self, link: &Link) -> PathBuf {
        self.shard_dir(link).join(link.to_hex())
    }
}

impl BlockStore for FsBlockStore {
    fn get(&self, link: &Link) -> StoreResult<Option<Block>> {
        let path = self.block_path(link);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match Block::from_parts(*link, bytes) {
            Ok(block) => Ok(Some(block)),
            Err(TypeError::LinkMismatch { computed, .. }) => Err(StoreError::HashMismatch {
                link: *link,
                computed,
            }),
            Err(other) => Err(other.into()),
        }
    }

    fn put(&self, block: &Block) -> StoreResult<()> {
        let path = self.block_path(&block.link());
        if path.exists() {
            return Ok(());
        }
        let shard = self.shard_dir(&block.link());
        std::fs::create_dir_all(&shard)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&shard)?;
        tmp.write_all(block.bytes())?;
        tmp.as_file().sync_all()?;
        // A concurrent writer may have landed the same content first; the
        // rename replaces it with identical bytes.
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        tracing::trace!(link = %block.link(), size = block.len(), "stored block");
        Ok(())
    }

    fn contains(&self, link: &Link) -> StoreResult<bool> {
        Ok(self.block_path(link).exists())
    }
}
