//! The [`HistoryResolver`] trait.

use relay_types::Link;

use crate::error::ResolverResult;

/// Mapping from history identifier to the relay's current root for it.
///
/// One entry per history; an absent entry means no push for that history
/// was ever durably accepted. Only the current root is kept; older roots are
/// reachable through the block graph.
///
/// Individual calls are atomic. Read-decide-write sequences must be
/// serialized by the caller with [`HistoryLocks`](crate::HistoryLocks).
pub trait HistoryResolver: Send + Sync {
    /// Current root for `id`, or `None` if the history is unknown.
    fn resolve(&self, id: &str) -> ResolverResult<Option<Link>>;

    /// Create or replace the entry for `id`.
    fn update(&self, id: &str, root: Link) -> ResolverResult<()>;

    /// Whether an entry exists for `id`.
    fn contains(&self, id: &str) -> ResolverResult<bool> {
        Ok(self.resolve(id)?.is_some())
    }

    /// Number of known histories.
    fn len(&self) -> ResolverResult<usize>;

    fn is_empty(&self) -> ResolverResult<bool> {
        Ok(self.len()? == 0)
    }
}
