use relay_store::BlockStore;
use relay_types::{Block, Link};
use serde::{Deserialize, Serialize};

use crate::chunker::Chunker;
use crate::error::{GraphError, GraphResult};

/// Links to the three sub-structures of one graph version.
///
/// A graph version's block *is* its root index: clients that only need to
/// discover which chunks they are missing fetch this and the chunk lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootIndex {
    pub vertex_root: Link,
    pub edge_root: Link,
    pub prop_root: Link,
}

impl RootIndex {
    pub fn links(&self) -> [Link; 3] {
        [self.vertex_root, self.edge_root, self.prop_root]
    }
}

/// Structured block payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A byte value split into chunk blocks.
    Chunks { size: u64, chunks: Vec<Link> },
    /// One graph version.
    Graph(RootIndex),
    /// Root of a version store: history id, head graph, and version log.
    VersionStore {
        id: String,
        current: Link,
        log: Link,
    },
}

impl Node {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chunks { .. } => "chunks",
            Self::Graph(_) => "graph",
            Self::VersionStore { .. } => "version_store",
        }
    }

    pub fn to_block(&self) -> GraphResult<Block> {
        Ok(Block::new(serde_json::to_vec(self)?))
    }

    pub fn from_block(block: &Block) -> GraphResult<Self> {
        Ok(serde_json::from_slice(block.bytes())?)
    }

    /// Read and decode the node at `link`.
    pub fn load(store: &dyn BlockStore, link: &Link) -> GraphResult<Self> {
        let block = store.get(link)?.ok_or(GraphError::MissingBlock(*link))?;
        Self::from_block(&block)
    }
}

/// Decode a block as a chunk list, returning `(size, chunks)`.
pub(crate) fn expect_chunks(link: Link, node: Node) -> GraphResult<(u64, Vec<Link>)> {
    match node {
        Node::Chunks { size, chunks } => Ok((size, chunks)),
        _ => Err(GraphError::UnexpectedNode {
            link,
            expected: "chunks",
        }),
    }
}

pub(crate) fn expect_graph(link: Link, node: Node) -> GraphResult<RootIndex> {
    match node {
        Node::Graph(index) => Ok(index),
        _ => Err(GraphError::UnexpectedNode {
            link,
            expected: "graph",
        }),
    }
}

/// Read back a chunked value.
pub(crate) fn read_value(store: &dyn BlockStore, link: &Link) -> GraphResult<Vec<u8>> {
    let (size, chunks) = expect_chunks(*link, Node::load(store, link)?)?;
    let size_mismatch = GraphError::UnexpectedNode {
        link: *link,
        expected: "chunks of the recorded size",
    };
    // `size` is untrusted; only the chunks actually held decide the length.
    let mut blocks = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        blocks.push(store.get(chunk)?.ok_or(GraphError::MissingBlock(*chunk))?);
    }
    let total: usize = blocks.iter().map(Block::len).sum();
    if usize::try_from(size).ok() != Some(total) {
        return Err(size_mismatch);
    }
    let mut out = Vec::with_capacity(total);
    for block in &blocks {
        out.extend_from_slice(block.bytes());
    }
    Ok(out)
}

/// Every block making up a chunked value: the chunk list node, then the
/// chunks.
pub(crate) fn value_blocks(store: &dyn BlockStore, link: &Link) -> GraphResult<Vec<Block>> {
    let node_block = store.get(link)?.ok_or(GraphError::MissingBlock(*link))?;
    let (_, chunks) = expect_chunks(*link, Node::from_block(&node_block)?)?;
    let mut blocks = vec![node_block];
    for chunk in &chunks {
        blocks.push(store.get(chunk)?.ok_or(GraphError::MissingBlock(*chunk))?);
    }
    Ok(blocks)
}

/// Writes blocks into a store and remembers what it wrote.
pub(crate) struct BlockWriter<'a> {
    store: &'a dyn BlockStore,
    chunker: Chunker,
    written: Vec<Block>,
}

impl<'a> BlockWriter<'a> {
    pub(crate) fn new(store: &'a dyn BlockStore, chunker: Chunker) -> Self {
        Self {
            store,
            chunker,
            written: Vec::new(),
        }
    }

    pub(crate) fn put(&mut self, block: Block) -> GraphResult<Link> {
        let link = block.link();
        self.store.put(&block)?;
        self.written.push(block);
        Ok(link)
    }

    pub(crate) fn put_node(&mut self, node: &Node) -> GraphResult<Link> {
        self.put(node.to_block()?)
    }

    /// Chunk and store a byte value, returning the chunk list link.
    pub(crate) fn put_value(&mut self, bytes: &[u8]) -> GraphResult<Link> {
        let mut chunks = Vec::new();
        for chunk in self.chunker.chunks(bytes) {
            chunks.push(self.put(Block::new(chunk.to_vec()))?);
        }
        self.put_node(&Node::Chunks {
            size: bytes.len() as u64,
            chunks,
        })
    }

    pub(crate) fn into_written(self) -> Vec<Block> {
        self.written
    }
}
