use std::fmt;

/// What a bundle carries, recorded in its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BundleKind {
    /// A version-store root, its version log, and the head graph.
    VersionStore,
    /// Everything needed to rebuild one graph version.
    GraphVersion,
    /// A graph version node and the chunk lists of its sub-structures,
    /// without the chunk payloads.
    RootIndex,
    /// An unordered set of named blocks.
    RandomBlocks,
}

impl BundleKind {
    /// Serialize to the header kind byte.
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::VersionStore => 1,
            Self::GraphVersion => 2,
            Self::RootIndex => 3,
            Self::RandomBlocks => 4,
        }
    }

    /// Parse a header kind byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::VersionStore),
            2 => Some(Self::GraphVersion),
            3 => Some(Self::RootIndex),
            4 => Some(Self::RandomBlocks),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VersionStore => "version-store",
            Self::GraphVersion => "graph-version",
            Self::RootIndex => "root-index",
            Self::RandomBlocks => "random-blocks",
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bytes_are_stable() {
        assert_eq!(BundleKind::VersionStore.type_byte(), 1);
        assert_eq!(BundleKind::GraphVersion.type_byte(), 2);
        assert_eq!(BundleKind::RootIndex.type_byte(), 3);
        assert_eq!(BundleKind::RandomBlocks.type_byte(), 4);
    }

    #[test]
    fn from_type_byte_inverts_type_byte() {
        for kind in [
            BundleKind::VersionStore,
            BundleKind::GraphVersion,
            BundleKind::RootIndex,
            BundleKind::RandomBlocks,
        ] {
            assert_eq!(BundleKind::from_type_byte(kind.type_byte()), Some(kind));
        }
    }

    #[test]
    fn from_type_byte_unknown() {
        assert!(BundleKind::from_type_byte(0).is_none());
        assert!(BundleKind::from_type_byte(5).is_none());
        assert!(BundleKind::from_type_byte(255).is_none());
    }

    #[test]
    fn display_names() {
        assert_eq!(BundleKind::RootIndex.to_string(), "root-index");
    }
}
