use std::ops::Range;

use crate::error::{GraphError, GraphResult};

/// Default chunk size when a caller does not supply one.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Fixed-size chunking strategy for large values.
///
/// Concatenating the chunks of a value in order always reproduces the
/// value. An empty value has no chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    /// Build a chunker; `chunk_size` must be non-zero.
    pub fn new(chunk_size: usize) -> GraphResult<Self> {
        if chunk_size == 0 {
            return Err(GraphError::InvalidChunkSize);
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk boundaries for a value of `len` bytes.
    pub fn offsets(&self, len: usize) -> Vec<Range<usize>> {
        (0..len)
            .step_by(self.chunk_size)
            .map(|start| start..(start + self.chunk_size).min(len))
            .collect()
    }

    /// Split `data` into chunks.
    pub fn chunks<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        data.chunks(self.chunk_size)
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            Chunker::new(0).unwrap_err(),
            GraphError::InvalidChunkSize
        ));
    }

    #[test]
    fn offsets_cover_exact_multiple() {
        let chunker = Chunker::new(4).unwrap();
        assert_eq!(chunker.offsets(8), vec![0..4, 4..8]);
    }

    #[test]
    fn offsets_with_tail() {
        let chunker = Chunker::new(4).unwrap();
        assert_eq!(chunker.offsets(10), vec![0..4, 4..8, 8..10]);
    }

    #[test]
    fn empty_value_has_no_chunks() {
        let chunker = Chunker::new(4).unwrap();
        assert!(chunker.offsets(0).is_empty());
        assert_eq!(chunker.chunks(&[]).count(), 0);
    }

    proptest! {
        #[test]
        fn chunks_concatenate_to_input(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            size in 1usize..300,
        ) {
            let chunker = Chunker::new(size).unwrap();
            let joined: Vec<u8> = chunker.chunks(&data).flatten().copied().collect();
            prop_assert_eq!(&joined, &data);
            for chunk in chunker.chunks(&data) {
                prop_assert!(chunk.len() <= size);
            }
        }

        #[test]
        fn offsets_match_chunks(len in 0usize..4096, size in 1usize..300) {
            let chunker = Chunker::new(size).unwrap();
            let data = vec![0u8; len];
            let from_offsets: Vec<usize> = chunker.offsets(len).into_iter().map(|r| r.len()).collect();
            let from_chunks: Vec<usize> = chunker.chunks(&data).map(<[u8]>::len).collect();
            prop_assert_eq!(from_offsets, from_chunks);
        }
    }
}
