//! Resolver persisted as a JSON map file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use relay_types::Link;

use crate::error::{ResolverError, ResolverResult};
use crate::names::validate_history_id;
use crate::traits::HistoryResolver;

/// A [`HistoryResolver`] backed by a JSON file.
///
/// The whole map is held in memory and the file is rewritten on every
/// update: the new contents go to a temporary file next to the target,
/// which is then renamed over it. A crash mid-update leaves the previous
/// file intact.
#[derive(Debug)]
pub struct FileResolver {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Link>>,
}

impl FileResolver {
    /// Open the resolver file at `path`, loading existing entries. A missing
    /// file is treated as an empty resolver.
    pub fn open(path: impl Into<PathBuf>) -> ResolverResult<Self> {
        let path = path.into();
        let entries: BTreeMap<String, Link> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), histories = entries.len(), "opened resolver file");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Link>) -> ResolverResult<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(entries)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| ResolverError::Io(e.error))?;
        Ok(())
    }
}

impl HistoryResolver for FileResolver {
    fn resolve(&self, id: &str) -> ResolverResult<Option<Link>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ResolverError::Poisoned(e.to_string()))?;
        Ok(entries.get(id).copied())
    }

    fn update(&self, id: &str, root: Link) -> ResolverResult<()> {
        validate_history_id(id)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| ResolverError::Poisoned(e.to_string()))?;

        let mut next = entries.clone();
        next.insert(id.to_string(), root);
        self.persist(&next)?;
        *entries = next;

        tracing::trace!(history = %id, root = %root, "resolver entry written");
        Ok(())
    }

    fn len(&self) -> ResolverResult<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| ResolverError::Poisoned(e.to_string()))?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FileResolver::open(dir.path().join("resolver.json")).unwrap();
        assert!(resolver.is_empty().unwrap());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.json");
        let root = Link::for_bytes(b"head");
        {
            let resolver = FileResolver::open(&path).unwrap();
            resolver.update("history-1", root).unwrap();
        }
        let reopened = FileResolver::open(&path).unwrap();
        assert_eq!(reopened.resolve("history-1").unwrap(), Some(root));
        assert!(reopened.contains("history-1").unwrap());
    }

    #[test]
    fn file_is_a_json_map_of_hex_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.json");
        let root = Link::for_bytes(b"head");
        FileResolver::open(&path).unwrap().update("h", root).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["h"], serde_json::Value::String(root.to_hex()));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/resolver.json");
        let resolver = FileResolver::open(&path).unwrap();
        resolver.update("h", Link::for_bytes(b"x")).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            FileResolver::open(&path).unwrap_err(),
            ResolverError::Serialization(_)
        ));
    }
}
