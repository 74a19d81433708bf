use std::fmt;

use serde::{Deserialize, Serialize};

/// Compatibility descriptor served at `/protocol/version`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// The protocol version this relay speaks.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion {
    major: 0,
    minor: 1,
    patch: 0,
};

impl ProtocolVersion {
    /// Two versions interoperate when their major versions agree, and, for
    /// pre-1.0 versions, their minor versions too.
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        if self.major != other.major {
            return false;
        }
        self.major > 0 || self.minor == other.minor
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        PROTOCOL_VERSION
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
