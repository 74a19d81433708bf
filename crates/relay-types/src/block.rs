use crate::error::TypeError;
use crate::link::Link;

/// An immutable block: content bytes plus the link naming them.
///
/// The link is always the hash of the bytes. Blocks can only be built by
/// hashing ([`Block::new`]) or by verified assembly ([`Block::from_parts`]).
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    link: Link,
    bytes: Vec<u8>,
}

impl Block {
    /// Create a block by hashing its bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        let link = Link::for_bytes(&bytes);
        Self { link, bytes }
    }

    /// Assemble a block from a claimed link and bytes, verifying the hash.
    pub fn from_parts(link: Link, bytes: Vec<u8>) -> Result<Self, TypeError> {
        let computed = Link::for_bytes(&bytes);
        if computed != link {
            return Err(TypeError::LinkMismatch {
                expected: link,
                computed,
            });
        }
        Ok(Self { link, bytes })
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the block, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("link", &self.link)
            .field("len", &self.bytes.len())
            .finish()
    }
}
