//! In-memory resolver for tests and ephemeral relays.

use std::collections::HashMap;
use std::sync::RwLock;

use relay_types::Link;

use crate::error::{ResolverError, ResolverResult};
use crate::names::validate_history_id;
use crate::traits::HistoryResolver;

/// An in-memory implementation of [`HistoryResolver`].
///
/// Entries live in a `HashMap` behind a `RwLock` and are lost when the
/// resolver is dropped.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    entries: RwLock<HashMap<String, Link>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryResolver for InMemoryResolver {
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
        entries.insert(id.to_string(), root);
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
