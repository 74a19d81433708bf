//! Per-history exclusive sections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Async mutual exclusion keyed by history identifier.
///
/// Guards for the same id are handed out one at a time, in request order.
/// Guards for different ids never contend. A map entry exists only while
/// some guard or waiter for that id is alive.
#[derive(Clone, Debug, Default)]
pub struct HistoryLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl HistoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    pub async fn lock(&self, id: &str) -> HistoryGuard {
        let mutex = {
            let mut map = lock_map(&self.inner);
            Arc::clone(map.entry(id.to_string()).or_default())
        };
        let guard = mutex.lock_owned().await;
        HistoryGuard {
            id: id.to_string(),
            guard: Some(guard),
            locks: Arc::clone(&self.inner),
        }
    }

    /// Number of ids currently held or awaited.
    pub fn active(&self) -> usize {
        lock_map(&self.inner).len()
    }
}

/// Exclusive access to one history; released on drop.
#[derive(Debug)]
pub struct HistoryGuard {
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<Mutex<LockMap>>,
}

impl HistoryGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for HistoryGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = lock_map(&self.locks);
        // Only the map's own reference left: nobody holds or awaits this id.
        if map
            .get(&self.id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            map.remove(&self.id);
        }
    }
}

fn lock_map(map: &Mutex<LockMap>) -> MutexGuard<'_, LockMap> {
    // The map is only touched by short, non-panicking sections.
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
