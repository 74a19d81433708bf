//! Packing graph structures into bundles and restoring them.
//!
//! Restorers check the bundle kind and the type of the root node before any
//! block is written to the target store.

use relay_pack::{Bundle, BundleKind, BundleWriter};
use relay_store::BlockStore;
use relay_types::{Block, Link};

use crate::chunker::Chunker;
use crate::error::{GraphError, GraphResult};
use crate::graph::{read_root_index, GraphState};
use crate::node::{expect_graph, value_blocks, Node, RootIndex};
use crate::version::VersionStore;

/// Pack a version store: its root node, its version log, and every block
/// of the head graph.
pub fn pack_version_store(store: &dyn BlockStore, versions: &VersionStore) -> GraphResult<Vec<u8>> {
    let root = versions.version_store_root();
    let root_block = require(store, &root)?;
    let log = match Node::from_block(&root_block)? {
        Node::VersionStore { log, .. } => log,
        _ => {
            return Err(GraphError::UnexpectedNode {
                link: root,
                expected: "version_store",
            })
        }
    };

    let mut writer = BundleWriter::new(BundleKind::VersionStore);
    writer.add_root(root);
    writer.add_block(root_block);
    writer.extend_blocks(value_blocks(store, &log)?);
    writer.extend_blocks(graph_blocks(store, &versions.current_root())?);
    Ok(writer.finish()?)
}

/// Pack everything needed to rebuild the graph version at `root`.
pub fn pack_graph_version(store: &dyn BlockStore, root: &Link) -> GraphResult<Vec<u8>> {
    let mut writer = BundleWriter::new(BundleKind::GraphVersion);
    writer.add_root(*root);
    writer.extend_blocks(graph_blocks(store, root)?);
    Ok(writer.finish()?)
}

/// Pack the graph node at `root` and the chunk lists of its three
/// sub-structures, leaving out the chunks themselves.
pub fn pack_root_index(store: &dyn BlockStore, root: &Link) -> GraphResult<Vec<u8>> {
    let graph_block = require(store, root)?;
    let index = expect_graph(*root, Node::from_block(&graph_block)?)?;

    let mut writer = BundleWriter::new(BundleKind::RootIndex);
    writer.add_root(*root);
    writer.add_block(graph_block);
    for link in index.links() {
        writer.add_block(require(store, &link)?);
    }
    Ok(writer.finish()?)
}

/// Pack an arbitrary set of blocks.
pub fn pack_random_blocks(blocks: impl IntoIterator<Item = Block>) -> GraphResult<Vec<u8>> {
    let mut writer = BundleWriter::new(BundleKind::RandomBlocks);
    writer.extend_blocks(blocks);
    Ok(writer.finish()?)
}

/// Restore a version-store bundle into `target` and open a handle on it.
pub fn restore_version_store(
    data: &[u8],
    target: &dyn BlockStore,
    chunker: Chunker,
) -> GraphResult<VersionStore> {
    let bundle = Bundle::decode_kind(data, BundleKind::VersionStore)?;
    let (root, node) = root_node(&bundle)?;
    if !matches!(node, Node::VersionStore { .. }) {
        return Err(GraphError::UnexpectedNode {
            link: root,
            expected: "version_store",
        });
    }
    target.put_batch(bundle.blocks())?;

    let versions = VersionStore::load(target, chunker, root)?;
    // the head graph must be complete
    versions.graph(target)?;
    Ok(versions)
}

/// Restore a graph-version bundle into `target`, returning its root.
pub fn restore_graph_version(data: &[u8], target: &dyn BlockStore) -> GraphResult<Link> {
    let bundle = Bundle::decode_kind(data, BundleKind::GraphVersion)?;
    let (root, node) = root_node(&bundle)?;
    expect_graph(root, node)?;
    target.put_batch(bundle.blocks())?;

    GraphState::read(target, &root)?;
    Ok(root)
}

/// Restore a root-index bundle into `target`, returning the root and the
/// decoded index.
pub fn restore_root_index(data: &[u8], target: &dyn BlockStore) -> GraphResult<(Link, RootIndex)> {
    let bundle = Bundle::decode_kind(data, BundleKind::RootIndex)?;
    let (root, node) = root_node(&bundle)?;
    let index = expect_graph(root, node)?;
    for link in index.links() {
        if bundle.block(&link).is_none() {
            return Err(GraphError::MissingBlock(link));
        }
    }
    target.put_batch(bundle.blocks())?;

    Ok((root, read_root_index(target, &root)?))
}

/// Restore a random-blocks bundle into `target`, returning the links of
/// the restored blocks.
pub fn restore_random_blocks(data: &[u8], target: &dyn BlockStore) -> GraphResult<Vec<Link>> {
    let bundle = Bundle::decode_kind(data, BundleKind::RandomBlocks)?;
    target.put_batch(bundle.blocks())?;
    Ok(bundle.blocks().iter().map(Block::link).collect())
}

/// The graph node at `root` followed by the blocks of its three values.
fn graph_blocks(store: &dyn BlockStore, root: &Link) -> GraphResult<Vec<Block>> {
    let graph_block = require(store, root)?;
    let index = expect_graph(*root, Node::from_block(&graph_block)?)?;
    let mut blocks = vec![graph_block];
    for link in index.links() {
        blocks.extend(value_blocks(store, &link)?);
    }
    Ok(blocks)
}

fn root_node(bundle: &Bundle) -> GraphResult<(Link, Node)> {
    let root = bundle.root().ok_or(GraphError::MissingRoot)?;
    let block = bundle.block(&root).ok_or(GraphError::MissingBlock(root))?;
    Ok((root, Node::from_block(block)?))
}

fn require(store: &dyn BlockStore, link: &Link) -> GraphResult<Block> {
    store.get(link)?.ok_or(GraphError::MissingBlock(*link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_pack::PackError;
    use relay_store::InMemoryBlockStore;

    fn chunker() -> Chunker {
        Chunker::new(32).unwrap()
    }

    fn populated() -> (InMemoryBlockStore, VersionStore) {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, chunker()).unwrap();
        let mut tx = vs.tx(&store).unwrap();
        let folder = tx.add_vertex("folder");
        let file = tx.add_vertex("file");
        tx.add_edge(&folder, &file, "contains").unwrap();
        tx.set_prop(&file, "content", serde_json::json!("hello world from v3"), "data")
            .unwrap();
        tx.commit().unwrap();
        (store, vs)
    }

    #[test]
    fn version_store_bundle_restores_same_handle() {
        let (store, vs) = populated();
        let bytes = pack_version_store(&store, &vs).unwrap();

        let target = InMemoryBlockStore::new();
        let restored = restore_version_store(&bytes, &target, chunker()).unwrap();
        assert_eq!(restored.id(), vs.id());
        assert_eq!(restored.version_store_root(), vs.version_store_root());
        assert_eq!(restored.current_root(), vs.current_root());
        assert_eq!(restored.graph(&target).unwrap(), vs.graph(&store).unwrap());
    }

    #[test]
    fn graph_version_bundle_restores_graph() {
        let (store, vs) = populated();
        let bytes = pack_graph_version(&store, &vs.current_root()).unwrap();

        let target = InMemoryBlockStore::new();
        let root = restore_graph_version(&bytes, &target).unwrap();
        assert_eq!(root, vs.current_root());
        assert_eq!(
            GraphState::read(&target, &root).unwrap(),
            vs.graph(&store).unwrap()
        );
    }

    #[test]
    fn root_index_bundle_omits_chunks() {
        let (store, vs) = populated();
        let bytes = pack_root_index(&store, &vs.current_root()).unwrap();
        assert_eq!(Bundle::decode(&bytes).unwrap().len(), 4);

        let target = InMemoryBlockStore::new();
        let (root, index) = restore_root_index(&bytes, &target).unwrap();
        assert_eq!(root, vs.current_root());
        assert_eq!(index, read_root_index(&store, &root).unwrap());
        // chunk lists are present, payload chunks are not
        assert!(GraphState::read(&target, &root).is_err());
    }

    #[test]
    fn random_blocks_roundtrip() {
        let blocks: Vec<Block> = (0..4).map(|i| Block::new(vec![i; 10])).collect();
        let bytes = pack_random_blocks(blocks.clone()).unwrap();

        let target = InMemoryBlockStore::new();
        let links = restore_random_blocks(&bytes, &target).unwrap();
        assert_eq!(links.len(), 4);
        for block in &blocks {
            assert_eq!(target.get(&block.link()).unwrap().as_ref(), Some(block));
        }
    }

    #[test]
    fn wrong_kind_writes_nothing() {
        let (store, vs) = populated();
        let bytes = pack_graph_version(&store, &vs.current_root()).unwrap();

        let target = InMemoryBlockStore::new();
        let err = restore_version_store(&bytes, &target, chunker()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Pack(PackError::UnexpectedKind { .. })
        ));
        assert!(target.is_empty().unwrap());
    }

    #[test]
    fn wrong_root_node_writes_nothing() {
        let (store, vs) = populated();
        // graph-version bundle rooted at a chunk list
        let index = read_root_index(&store, &vs.current_root()).unwrap();
        let mut writer = BundleWriter::new(BundleKind::GraphVersion);
        writer.add_root(index.vertex_root);
        writer.extend_blocks(value_blocks(&store, &index.vertex_root).unwrap());
        let bytes = writer.finish().unwrap();

        let target = InMemoryBlockStore::new();
        assert!(matches!(
            restore_graph_version(&bytes, &target).unwrap_err(),
            GraphError::UnexpectedNode { expected: "graph", .. }
        ));
        assert!(target.is_empty().unwrap());
    }

    #[test]
    fn huge_recorded_value_size_is_an_error() {
        let (store, vs) = populated();
        let index = read_root_index(&store, &vs.current_root()).unwrap();
        let bogus = Node::Chunks {
            size: u64::MAX,
            chunks: Vec::new(),
        }
        .to_block()
        .unwrap();
        let graph = Node::Graph(RootIndex {
            vertex_root: bogus.link(),
            ..index
        })
        .to_block()
        .unwrap();

        let mut writer = BundleWriter::new(BundleKind::GraphVersion);
        writer.add_root(graph.link());
        writer.add_block(graph);
        writer.add_block(bogus);
        writer.extend_blocks(value_blocks(&store, &index.edge_root).unwrap());
        writer.extend_blocks(value_blocks(&store, &index.prop_root).unwrap());
        let bytes = writer.finish().unwrap();

        let target = InMemoryBlockStore::new();
        assert!(matches!(
            restore_graph_version(&bytes, &target).unwrap_err(),
            GraphError::UnexpectedNode { .. }
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let target = InMemoryBlockStore::new();
        assert!(restore_random_blocks(b"definitely not a bundle", &target).is_err());
        assert!(target.is_empty().unwrap());
    }

    #[test]
    fn packing_missing_root_fails() {
        let store = InMemoryBlockStore::new();
        let err = pack_graph_version(&store, &Link::for_bytes(b"nowhere")).unwrap_err();
        assert!(matches!(err, GraphError::MissingBlock(_)));
    }
}
