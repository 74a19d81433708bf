use std::collections::HashSet;

use relay_types::{Block, Link};

use crate::error::{PackError, PackResult};
use crate::kind::BundleKind;

/// Bundle magic bytes.
pub const MAGIC: &[u8; 4] = b"GRLB";

/// Current bundle format version.
pub const FORMAT_VERSION: u32 = 1;

/// zstd level used for block payloads.
const COMPRESSION_LEVEL: i32 = 3;

/// Builds a bundle from roots and blocks.
///
/// Blocks are written in insertion order; a block added twice is written
/// once.
#[derive(Debug)]
pub struct BundleWriter {
    kind: BundleKind,
    roots: Vec<Link>,
    blocks: Vec<Block>,
    seen: HashSet<Link>,
}

impl BundleWriter {
    /// Create an empty writer for a bundle of `kind`.
    pub fn new(kind: BundleKind) -> Self {
        Self {
            kind,
            roots: Vec::new(),
            blocks: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Record a root link in the bundle header.
    pub fn add_root(&mut self, root: Link) {
        self.roots.push(root);
    }

    /// Queue a block. Returns `false` if it was already queued.
    pub fn add_block(&mut self, block: Block) -> bool {
        if !self.seen.insert(block.link()) {
            return false;
        }
        self.blocks.push(block);
        true
    }

    /// Queue several blocks.
    pub fn extend_blocks(&mut self, blocks: impl IntoIterator<Item = Block>) {
        for block in blocks {
            self.add_block(block);
        }
    }

    /// Whether a block with `link` has been queued.
    pub fn contains(&self, link: &Link) -> bool {
        self.seen.contains(link)
    }

    /// Number of blocks queued.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no blocks are queued.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize the bundle.
    pub fn finish(self) -> PackResult<Vec<u8>> {
        let mut out = Vec::new();

        // Header: magic + version + kind + roots + block count
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        out.push(self.kind.type_byte());
        encode_varint(&mut out, self.roots.len() as u64);
        for root in &self.roots {
            out.extend_from_slice(root.as_bytes());
        }
        out.extend_from_slice(&(self.blocks.len() as u32).to_be_bytes());

        for block in &self.blocks {
            let compressed = zstd::encode_all(block.bytes(), COMPRESSION_LEVEL)
                .map_err(|e| PackError::CompressionFailed(e.to_string()))?;

            out.extend_from_slice(block.link().as_bytes());
            encode_varint(&mut out, block.len() as u64);
            encode_varint(&mut out, compressed.len() as u64);
            out.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
            out.extend_from_slice(&compressed);
        }

        // Trailer: BLAKE3 checksum of everything so far
        let checksum = *blake3::hash(&out).as_bytes();
        out.extend_from_slice(&checksum);

        tracing::trace!(
            kind = %self.kind,
            roots = self.roots.len(),
            blocks = self.blocks.len(),
            bytes = out.len(),
            "wrote bundle"
        );
        Ok(out)
    }
}

/// Encode a u64 as a variable-length integer.
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer. Returns `(value, bytes_consumed)`, or
/// `None` if the input is truncated or overflows a u64.
pub(crate) fn decode_varint(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        if shift >= 64 {
            return None;
        }
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
