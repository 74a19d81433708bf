use relay_store::BlockStore;
use relay_types::Link;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, GraphState, Prop, Vertex};
use crate::version::VersionStore;

/// Pending changes on top of a version store's head graph.
///
/// Nothing is written until [`commit`](Self::commit).
pub struct Tx<'a> {
    versions: &'a mut VersionStore,
    store: &'a dyn BlockStore,
    graph: GraphState,
}

impl<'a> Tx<'a> {
    pub(crate) fn new(
        versions: &'a mut VersionStore,
        store: &'a dyn BlockStore,
        graph: GraphState,
    ) -> Self {
        Self {
            versions,
            store,
            graph,
        }
    }

    /// The graph as modified so far.
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Add a vertex, returning its id.
    pub fn add_vertex(&mut self, kind: impl Into<String>) -> String {
        let id = new_element_id();
        self.graph
            .vertices
            .insert(id.clone(), Vertex { kind: kind.into() });
        id
    }

    /// Add an edge between two existing vertices, returning its id.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        kind: impl Into<String>,
    ) -> GraphResult<String> {
        for end in [source, target] {
            if !self.graph.vertices.contains_key(end) {
                return Err(GraphError::UnknownElement(end.to_string()));
            }
        }
        let id = new_element_id();
        self.graph.edges.insert(
            id.clone(),
            Edge {
                source: source.to_string(),
                target: target.to_string(),
                kind: kind.into(),
            },
        );
        Ok(id)
    }

    /// Set a property on an existing vertex or edge, replacing any previous
    /// value under the same key.
    pub fn set_prop(
        &mut self,
        target: &str,
        key: &str,
        value: serde_json::Value,
        kind: impl Into<String>,
    ) -> GraphResult<()> {
        if !self.graph.vertices.contains_key(target) && !self.graph.edges.contains_key(target) {
            return Err(GraphError::UnknownElement(target.to_string()));
        }
        self.graph.props.insert(
            Prop::map_key(target, key),
            Prop {
                target: target.to_string(),
                key: key.to_string(),
                value,
                kind: kind.into(),
            },
        );
        Ok(())
    }

    /// Remove a property. Returns whether it existed.
    pub fn remove_prop(&mut self, target: &str, key: &str) -> bool {
        self.graph.props.remove(&Prop::map_key(target, key)).is_some()
    }

    /// Record the modified graph as the new head. Returns its graph root.
    pub fn commit(self) -> GraphResult<Link> {
        self.versions.commit(self.store, &self.graph)
    }
}

fn new_element_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunker;
    use relay_store::InMemoryBlockStore;

    #[test]
    fn builds_a_small_tree() {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, Chunker::default()).unwrap();
        let mut tx = vs.tx(&store).unwrap();
        let root = tx.add_vertex("folder");
        let file = tx.add_vertex("file");
        let edge = tx.add_edge(&root, &file, "contains").unwrap();
        tx.set_prop(&file, "name", serde_json::json!("nested-file"), "meta")
            .unwrap();
        tx.set_prop(&edge, "weight", serde_json::json!(3), "data")
            .unwrap();
        let committed = tx.commit().unwrap();

        assert_eq!(vs.current_root(), committed);
        let graph = vs.graph(&store).unwrap();
        assert_eq!(graph.vertices.len(), 2);
        assert_eq!(graph.edge(&edge).map(|e| e.source.as_str()), Some(root.as_str()));
        assert_eq!(graph.props_of(&file).count(), 1);
    }

    #[test]
    fn edge_requires_known_vertices() {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, Chunker::default()).unwrap();
        let mut tx = vs.tx(&store).unwrap();
        let v = tx.add_vertex("folder");
        assert!(matches!(
            tx.add_edge(&v, "ghost", "contains").unwrap_err(),
            GraphError::UnknownElement(id) if id == "ghost"
        ));
    }

    #[test]
    fn prop_requires_known_target() {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, Chunker::default()).unwrap();
        let mut tx = vs.tx(&store).unwrap();
        assert!(tx
            .set_prop("ghost", "name", serde_json::json!("x"), "meta")
            .is_err());
    }

    #[test]
    fn dropped_tx_changes_nothing() {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, Chunker::default()).unwrap();
        let before = vs.version_store_root();
        {
            let mut tx = vs.tx(&store).unwrap();
            tx.add_vertex("discarded");
        }
        assert_eq!(vs.version_store_root(), before);
    }

    #[test]
    fn remove_prop_reports_presence() {
        let store = InMemoryBlockStore::new();
        let mut vs = VersionStore::create(&store, Chunker::default()).unwrap();
        let mut tx = vs.tx(&store).unwrap();
        let v = tx.add_vertex("folder");
        tx.set_prop(&v, "name", serde_json::json!("x"), "meta").unwrap();
        assert!(tx.remove_prop(&v, "name"));
        assert!(!tx.remove_prop(&v, "name"));
    }
}
