use std::collections::BTreeMap;

use relay_store::BlockStore;
use relay_types::Link;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::GraphResult;
use crate::node::{expect_graph, read_value, BlockWriter, Node, RootIndex};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: String,
}

/// A keyed value attached to a vertex or an edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub target: String,
    pub key: String,
    pub value: serde_json::Value,
    pub kind: String,
}

impl Prop {
    /// Map key under which a property is stored.
    pub fn map_key(target: &str, key: &str) -> String {
        format!("{target}/{key}")
    }
}

/// Full contents of one graph version.
///
/// Ordered maps keep the serialized form, and therefore the version link,
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphState {
    pub vertices: BTreeMap<String, Vertex>,
    pub edges: BTreeMap<String, Edge>,
    pub props: BTreeMap<String, Prop>,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.props.is_empty()
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn prop(&self, target: &str, key: &str) -> Option<&Prop> {
        self.props.get(&Prop::map_key(target, key))
    }

    /// Properties attached to `target`, ordered by key.
    pub fn props_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Prop> + 'a {
        self.props.values().filter(move |prop| prop.target == target)
    }

    /// Whether any property anywhere carries `key`.
    pub fn has_prop_key(&self, key: &str) -> bool {
        self.props.values().any(|prop| prop.key == key)
    }

    /// Store this graph, returning the link of its graph node.
    pub(crate) fn write(&self, writer: &mut BlockWriter<'_>) -> GraphResult<Link> {
        let index = RootIndex {
            vertex_root: writer.put_value(&serde_json::to_vec(&self.vertices)?)?,
            edge_root: writer.put_value(&serde_json::to_vec(&self.edges)?)?,
            prop_root: writer.put_value(&serde_json::to_vec(&self.props)?)?,
        };
        writer.put_node(&Node::Graph(index))
    }

    /// Load the graph whose graph node is `root`.
    pub fn read(store: &dyn BlockStore, root: &Link) -> GraphResult<Self> {
        let index = read_root_index(store, root)?;
        Ok(Self {
            vertices: read_map(store, &index.vertex_root)?,
            edges: read_map(store, &index.edge_root)?,
            props: read_map(store, &index.prop_root)?,
        })
    }

    /// Three-way merge of `ours` and `theirs` against their common `base`.
    ///
    /// Per key: if both sides agree the agreed value wins; if one side left
    /// the base value untouched the other side's value wins; otherwise the
    /// value with the greater canonical JSON encoding wins, and a present
    /// value beats a deletion. The result does not depend on argument order
    /// of `ours` and `theirs`.
    pub fn merge3(base: &Self, ours: &Self, theirs: &Self) -> GraphResult<Self> {
        Ok(Self {
            vertices: merge_map(&base.vertices, &ours.vertices, &theirs.vertices)?,
            edges: merge_map(&base.edges, &ours.edges, &theirs.edges)?,
            props: merge_map(&base.props, &ours.props, &theirs.props)?,
        })
    }
}

/// Decode the root index stored at a graph node.
pub fn read_root_index(store: &dyn BlockStore, root: &Link) -> GraphResult<RootIndex> {
    expect_graph(*root, Node::load(store, root)?)
}

fn read_map<V: DeserializeOwned>(
    store: &dyn BlockStore,
    link: &Link,
) -> GraphResult<BTreeMap<String, V>> {
    Ok(serde_json::from_slice(&read_value(store, link)?)?)
}

fn merge_map<V>(
    base: &BTreeMap<String, V>,
    ours: &BTreeMap<String, V>,
    theirs: &BTreeMap<String, V>,
) -> GraphResult<BTreeMap<String, V>>
where
    V: Clone + PartialEq + Serialize,
{
    let mut keys: Vec<&String> = base.keys().chain(ours.keys()).chain(theirs.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut merged = BTreeMap::new();
    for key in keys {
        let b = base.get(key);
        let o = ours.get(key);
        let t = theirs.get(key);
        let winner = if o == t {
            o
        } else if o == b {
            t
        } else if t == b {
            o
        } else {
            resolve_conflict(o, t)?
        };
        if let Some(value) = winner {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(merged)
}

fn resolve_conflict<'v, V: Serialize>(
    ours: Option<&'v V>,
    theirs: Option<&'v V>,
) -> GraphResult<Option<&'v V>> {
    match (ours, theirs) {
        (Some(o), Some(t)) => {
            if serde_json::to_vec(o)? >= serde_json::to_vec(t)? {
                Ok(Some(o))
            } else {
                Ok(Some(t))
            }
        }
        (Some(o), None) => Ok(Some(o)),
        (None, t) => Ok(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunker;
    use relay_store::InMemoryBlockStore;

    fn vertex(kind: &str) -> Vertex {
        Vertex { kind: kind.into() }
    }

    fn prop(target: &str, key: &str, value: serde_json::Value) -> (String, Prop) {
        (
            Prop::map_key(target, key),
            Prop {
                target: target.into(),
                key: key.into(),
                value,
                kind: "meta".into(),
            },
        )
    }

    fn sample() -> GraphState {
        let mut graph = GraphState::new();
        graph.vertices.insert("v1".into(), vertex("folder"));
        graph.vertices.insert("v2".into(), vertex("file"));
        graph.edges.insert(
            "e1".into(),
            Edge {
                source: "v1".into(),
                target: "v2".into(),
                kind: "contains".into(),
            },
        );
        let (k, p) = prop("v1", "name", serde_json::json!("root-folder"));
        graph.props.insert(k, p);
        graph
    }

    #[test]
    fn write_read_roundtrip() {
        let store = InMemoryBlockStore::new();
        let mut writer = BlockWriter::new(&store, Chunker::new(16).unwrap());
        let graph = sample();
        let root = graph.write(&mut writer).unwrap();

        assert_eq!(GraphState::read(&store, &root).unwrap(), graph);
        assert_eq!(
            graph.prop("v1", "name").map(|p| p.value.clone()),
            Some(serde_json::json!("root-folder"))
        );
    }

    #[test]
    fn equal_graphs_share_a_link() {
        let store = InMemoryBlockStore::new();
        let mut writer = BlockWriter::new(&store, Chunker::default());
        let a = sample().write(&mut writer).unwrap();
        let b = sample().write(&mut writer).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn merge_takes_both_sides_additions() {
        let base = sample();
        let mut ours = base.clone();
        let (k, p) = prop("v1", "A", serde_json::json!(1));
        ours.props.insert(k, p);
        let mut theirs = base.clone();
        let (k, p) = prop("v2", "B", serde_json::json!(2));
        theirs.props.insert(k, p);

        let merged = GraphState::merge3(&base, &ours, &theirs).unwrap();
        assert!(merged.has_prop_key("A"));
        assert!(merged.has_prop_key("B"));
        assert!(merged.has_prop_key("name"));
    }

    #[test]
    fn merge_respects_one_sided_deletion() {
        let base = sample();
        let mut ours = base.clone();
        ours.edges.remove("e1");
        let merged = GraphState::merge3(&base, &ours, &base).unwrap();
        assert!(merged.edge("e1").is_none());
    }

    #[test]
    fn conflicting_updates_resolve_symmetrically() {
        let base = sample();
        let mut ours = base.clone();
        let (k, p) = prop("v1", "name", serde_json::json!("alpha"));
        ours.props.insert(k, p);
        let mut theirs = base.clone();
        let (k, p) = prop("v1", "name", serde_json::json!("omega"));
        theirs.props.insert(k, p);

        let left = GraphState::merge3(&base, &ours, &theirs).unwrap();
        let right = GraphState::merge3(&base, &theirs, &ours).unwrap();
        assert_eq!(left, right);
        assert_eq!(
            left.prop("v1", "name").map(|p| p.value.clone()),
            Some(serde_json::json!("omega"))
        );
    }

    #[test]
    fn update_beats_concurrent_delete() {
        let base = sample();
        let mut ours = base.clone();
        let (k, p) = prop("v1", "name", serde_json::json!("renamed"));
        ours.props.insert(k, p);
        let mut theirs = base.clone();
        theirs.props.clear();

        let merged = GraphState::merge3(&base, &ours, &theirs).unwrap();
        assert_eq!(
            merged.prop("v1", "name").map(|p| p.value.clone()),
            Some(serde_json::json!("renamed"))
        );
    }

    #[test]
    fn merge_with_empty_base_unions() {
        let merged = GraphState::merge3(&GraphState::new(), &sample(), &GraphState::new()).unwrap();
        assert_eq!(merged, sample());
    }

    #[test]
    fn read_root_index_rejects_non_graph() {
        let store = InMemoryBlockStore::new();
        let mut writer = BlockWriter::new(&store, Chunker::default());
        let value = writer.put_value(b"[]").unwrap();
        assert!(read_root_index(&store, &value).is_err());
    }
}
