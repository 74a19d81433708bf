//! History resolution for the graph relay.
//!
//! A history identifier names one replica lineage; the resolver maps it to
//! the root the relay currently holds for that lineage.
//!
//! # Modules
//!
//! - [`traits`]: the [`HistoryResolver`] interface
//! - [`memory`]: [`InMemoryResolver`] for tests and ephemeral relays
//! - [`file`]: [`FileResolver`], a JSON map rewritten atomically on update
//! - [`locks`]: [`HistoryLocks`], per-history exclusive sections for
//!   read-decide-write sequences
//! - [`names`]: history id validation

pub mod error;
pub mod file;
pub mod locks;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{ResolverError, ResolverResult};
pub use file::FileResolver;
pub use locks::{HistoryGuard, HistoryLocks};
pub use memory::InMemoryResolver;
pub use names::validate_history_id;
pub use traits::HistoryResolver;
