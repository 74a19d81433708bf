use relay_types::{Block, Link};

use crate::error::{PackError, PackResult};
use crate::kind::BundleKind;
use crate::writer::{decode_varint, FORMAT_VERSION, MAGIC};

const CHECKSUM_LEN: usize = 32;

/// A decoded and fully verified bundle.
#[derive(Clone, Debug)]
pub struct Bundle {
    kind: BundleKind,
    roots: Vec<Link>,
    blocks: Vec<Block>,
}

impl Bundle {
    /// Decode bundle bytes.
    ///
    /// Verifies magic, version, kind, trailing checksum, per-block CRC and
    /// sizes, and that every block's bytes hash to its recorded link.
    pub fn decode(data: &[u8]) -> PackResult<Self> {
        if data.len() < 9 + CHECKSUM_LEN {
            return Err(PackError::Truncated { offset: data.len() });
        }
        if &data[0..4] != MAGIC {
            return Err(PackError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }

        let body_len = data.len() - CHECKSUM_LEN;
        let (body, trailer) = data.split_at(body_len);
        if blake3::hash(body).as_bytes() != trailer {
            return Err(PackError::ChecksumMismatch);
        }

        let mut cursor = Cursor::new(body, 4);
        let version = cursor.u32()?;
        if version != FORMAT_VERSION {
            return Err(PackError::UnsupportedVersion(version));
        }
        let kind_byte = cursor.byte()?;
        let kind = BundleKind::from_type_byte(kind_byte).ok_or(PackError::UnknownKind(kind_byte))?;

        let root_count = cursor.varint()?;
        let mut roots = Vec::new();
        for _ in 0..root_count {
            roots.push(cursor.link()?);
        }

        let block_count = cursor.u32()?;
        let mut blocks = Vec::new();
        for _ in 0..block_count {
            blocks.push(cursor.block()?);
        }

        if cursor.pos != body.len() {
            return Err(PackError::CorruptEntry {
                offset: cursor.pos,
                reason: "trailing bytes after last block".into(),
            });
        }

        Ok(Self {
            kind,
            roots,
            blocks,
        })
    }

    /// Decode, requiring the bundle to be of `expected` kind.
    pub fn decode_kind(data: &[u8], expected: BundleKind) -> PackResult<Self> {
        let bundle = Self::decode(data)?;
        if bundle.kind != expected {
            return Err(PackError::UnexpectedKind {
                expected,
                actual: bundle.kind,
            });
        }
        Ok(bundle)
    }

    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    pub fn roots(&self) -> &[Link] {
        &self.roots
    }

    /// The first root, if any.
    pub fn root(&self) -> Option<Link> {
        self.roots.first().copied()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks carried.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Find a carried block by link.
    pub fn block(&self, link: &Link) -> Option<&Block> {
        self.blocks.iter().find(|block| block.link() == *link)
    }

    /// Consume the bundle, returning its roots and blocks.
    pub fn into_parts(self) -> (Vec<Link>, Vec<Block>) {
        (self.roots, self.blocks)
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn take(&mut self, len: usize) -> PackResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(PackError::Truncated { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> PackResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> PackResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn varint(&mut self) -> PackResult<u64> {
        let (value, consumed) =
            decode_varint(&self.data[self.pos..]).ok_or(PackError::CorruptEntry {
                offset: self.pos,
                reason: "truncated or oversized varint".into(),
            })?;
        self.pos += consumed;
        Ok(value)
    }

    fn length(&mut self) -> PackResult<usize> {
        let offset = self.pos;
        let value = self.varint()?;
        usize::try_from(value).map_err(|_| PackError::CorruptEntry {
            offset,
            reason: format!("length {value} does not fit in memory"),
        })
    }

    fn link(&mut self) -> PackResult<Link> {
        let mut buf = [0u8; Link::LEN];
        buf.copy_from_slice(self.take(Link::LEN)?);
        Ok(Link::from_hash(buf))
    }

    fn block(&mut self) -> PackResult<Block> {
        let offset = self.pos;
        let link = self.link()?;
        let uncompressed_size = self.length()?;
        let compressed_size = self.length()?;
        let expected_crc = self.u32()?;
        let compressed = self.take(compressed_size)?;

        if crc32fast::hash(compressed) != expected_crc {
            return Err(PackError::CrcMismatch { link });
        }

        let bytes = zstd::decode_all(compressed)
            .map_err(|e| PackError::DecompressionFailed(e.to_string()))?;
        if bytes.len() != uncompressed_size {
            return Err(PackError::CorruptEntry {
                offset,
                reason: format!(
                    "size mismatch: expected {uncompressed_size}, got {}",
                    bytes.len()
                ),
            });
        }

        Block::from_parts(link, bytes).map_err(|_| PackError::LinkMismatch { link })
    }
}
