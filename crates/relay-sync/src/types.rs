use relay_types::Link;

/// How a version-store push changed the relay's head for its history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushStatus {
    /// First push for this history.
    Created,
    /// The relay already held this root, or a descendant of it.
    Unchanged,
    /// The pushed head extends the relay's head and replaces it.
    FastForward,
    /// The heads had diverged; a merged head was stored.
    Merged,
}

impl PushStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Unchanged => "unchanged",
            Self::FastForward => "fast-forward",
            Self::Merged => "merged",
        }
    }
}

/// Outcome of a version-store push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushStoreResult {
    /// Version-store root the relay now holds for the history.
    pub store_root: Link,
    /// Head graph of that version store.
    pub version_root: Link,
    pub status: PushStatus,
}
