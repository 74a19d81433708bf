use std::collections::{HashMap, HashSet, VecDeque};

use relay_store::BlockStore;
use relay_types::{Block, Link};
use serde::{Deserialize, Serialize};

use crate::chunker::Chunker;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphState;
use crate::node::{read_value, BlockWriter, Node};
use crate::tx::Tx;

/// One entry in a version log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Graph node of this version.
    pub root: Link,
    /// Links of the parent versions (empty for genesis).
    pub parents: Vec<Link>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Version {
    /// Identity of this version within a log.
    ///
    /// Distinct from `root`: two versions may carry identical graphs.
    pub fn link(&self) -> GraphResult<Link> {
        Ok(Link::for_bytes(&serde_json::to_vec(self)?))
    }
}

/// What a merge produced.
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    /// New version-store root.
    pub store_root: Link,
    /// New head graph.
    pub version_root: Link,
    /// Blocks created by the merge.
    pub blocks: Vec<Block>,
}

/// Handle on one replica lineage: its history id, version log, and head.
///
/// The handle owns no storage; every operation takes the block store to
/// read from and write to.
#[derive(Clone, Debug)]
pub struct VersionStore {
    id: String,
    chunker: Chunker,
    root: Link,
    log: Vec<Version>,
}

impl VersionStore {
    /// Start a new lineage with an empty genesis graph.
    pub fn create(store: &dyn BlockStore, chunker: Chunker) -> GraphResult<Self> {
        let id = uuid::Uuid::now_v7().to_string();
        let mut writer = BlockWriter::new(store, chunker);
        let genesis = GraphState::new().write(&mut writer)?;
        let log = vec![Version {
            root: genesis,
            parents: Vec::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }];
        let root = write_root(&mut writer, &id, &log)?;
        tracing::debug!(history = %id, root = %root, "created version store");
        Ok(Self {
            id,
            chunker,
            root,
            log,
        })
    }

    /// Reconstruct a handle from its root node.
    pub fn load(store: &dyn BlockStore, chunker: Chunker, root: Link) -> GraphResult<Self> {
        let (id, current, log_link) = match Node::load(store, &root)? {
            Node::VersionStore { id, current, log } => (id, current, log),
            _ => {
                return Err(GraphError::UnexpectedNode {
                    link: root,
                    expected: "version_store",
                })
            }
        };
        let log: Vec<Version> = serde_json::from_slice(&read_value(store, &log_link)?)?;
        match log.last() {
            Some(head) if head.root == current => {}
            Some(_) => {
                return Err(GraphError::UnexpectedNode {
                    link: root,
                    expected: "version_store whose head matches its log",
                })
            }
            None => return Err(GraphError::EmptyLog),
        }
        Ok(Self {
            id,
            chunker,
            root,
            log,
        })
    }

    /// History identifier, stable for the life of the lineage.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chunker(&self) -> Chunker {
        self.chunker
    }

    /// Link of the version-store root node.
    pub fn version_store_root(&self) -> Link {
        self.root
    }

    /// Graph node of the current head.
    pub fn current_root(&self) -> Link {
        self.head().root
    }

    pub fn log(&self) -> &[Version] {
        &self.log
    }

    pub fn head(&self) -> &Version {
        // load and create both guarantee a non-empty log
        &self.log[self.log.len() - 1]
    }

    /// Load the head graph.
    pub fn graph(&self, store: &dyn BlockStore) -> GraphResult<GraphState> {
        GraphState::read(store, &self.current_root())
    }

    /// Open a transaction on top of the head graph.
    pub fn tx<'a>(&'a mut self, store: &'a dyn BlockStore) -> GraphResult<Tx<'a>> {
        let graph = self.graph(store)?;
        Ok(Tx::new(self, store, graph))
    }

    /// Append `graph` as a new head version. Returns the new graph root.
    pub fn commit(&mut self, store: &dyn BlockStore, graph: &GraphState) -> GraphResult<Link> {
        let mut writer = BlockWriter::new(store, self.chunker);
        let graph_root = graph.write(&mut writer)?;
        let version = Version {
            root: graph_root,
            parents: vec![self.head().link()?],
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        let mut log = self.log.clone();
        log.push(version);
        self.root = write_root(&mut writer, &self.id, &log)?;
        self.log = log;
        tracing::debug!(history = %self.id, root = %self.root, version = %graph_root, "committed version");
        Ok(graph_root)
    }

    /// Reconcile `other` (another replica of the same lineage) into this
    /// handle.
    ///
    /// - If `other`'s head is already part of this history, nothing changes.
    /// - If this head is an ancestor of `other`'s head, this handle
    ///   fast-forwards to it.
    /// - Otherwise the two head graphs are merged three ways against their
    ///   lowest common ancestor and a merge version with both heads as
    ///   parents becomes the new head.
    ///
    /// Graphs are read from `store`, which must hold both heads. A common
    /// ancestor whose graph is unavailable is treated as empty.
    pub fn merge_versions(
        &mut self,
        store: &dyn BlockStore,
        other: &VersionStore,
    ) -> GraphResult<MergeOutcome> {
        if self.id != other.id {
            return Err(GraphError::HistoryMismatch {
                ours: self.id.clone(),
                theirs: other.id.clone(),
            });
        }

        let ours_head = self.head().link()?;
        let theirs_head = other.head().link()?;

        let mut by_link: HashMap<Link, &Version> = HashMap::new();
        let mut known: HashSet<Link> = HashSet::new();
        for version in &self.log {
            let link = version.link()?;
            known.insert(link);
            by_link.insert(link, version);
        }
        let mut appended = Vec::new();
        for version in &other.log {
            let link = version.link()?;
            if !known.contains(&link) {
                appended.push(version.clone());
            }
            by_link.entry(link).or_insert(version);
        }

        let ours_ancestors = ancestors(&by_link, ours_head);
        if ours_ancestors.contains(&theirs_head) {
            tracing::debug!(history = %self.id, "incoming head already included");
            return Ok(MergeOutcome {
                store_root: self.root,
                version_root: self.current_root(),
                blocks: Vec::new(),
            });
        }

        let theirs_ancestors = ancestors(&by_link, theirs_head);
        if theirs_ancestors.contains(&ours_head) {
            // Adopt the descendant unchanged so its root stays stable.
            tracing::debug!(history = %self.id, "fast-forwarding to incoming head");
            self.root = other.root;
            self.log = other.log.clone();
            return Ok(MergeOutcome {
                store_root: self.root,
                version_root: self.current_root(),
                blocks: Vec::new(),
            });
        }

        let mut writer = BlockWriter::new(store, self.chunker);
        let mut log = self.log.clone();
        log.extend(appended);

        let base = lowest_common_ancestor(&by_link, ours_head, &theirs_ancestors)
            .and_then(|link| by_link.get(&link).map(|version| version.root));
        let base_graph = match base {
            Some(root) => read_or_empty(store, &root)?,
            None => GraphState::new(),
        };
        let ours_graph = self.graph(store)?;
        let theirs_graph = other.graph(store)?;
        let merged = GraphState::merge3(&base_graph, &ours_graph, &theirs_graph)?;
        let merged_root = merged.write(&mut writer)?;

        let timestamp = self.head().timestamp.max(other.head().timestamp);
        log.push(Version {
            root: merged_root,
            parents: vec![ours_head, theirs_head],
            timestamp,
        });

        self.root = write_root(&mut writer, &self.id, &log)?;
        self.log = log;
        tracing::debug!(history = %self.id, root = %self.root, "merged version stores");

        Ok(MergeOutcome {
            store_root: self.root,
            version_root: self.current_root(),
            blocks: writer.into_written(),
        })
    }
}

fn write_root(writer: &mut BlockWriter<'_>, id: &str, log: &[Version]) -> GraphResult<Link> {
    let current = log.last().ok_or(GraphError::EmptyLog)?.root;
    let log_link = writer.put_value(&serde_json::to_vec(log)?)?;
    writer.put_node(&Node::VersionStore {
        id: id.to_string(),
        current,
        log: log_link,
    })
}

/// `start` and every version reachable from it through parent links.
fn ancestors(by_link: &HashMap<Link, &Version>, start: Link) -> HashSet<Link> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(link) = queue.pop_front() {
        if !seen.insert(link) {
            continue;
        }
        if let Some(version) = by_link.get(&link) {
            queue.extend(version.parents.iter().copied());
        }
    }
    seen
}

/// Breadth-first from `start`, the first version that is also in `other`.
fn lowest_common_ancestor(
    by_link: &HashMap<Link, &Version>,
    start: Link,
    other: &HashSet<Link>,
) -> Option<Link> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(link) = queue.pop_front() {
        if !seen.insert(link) {
            continue;
        }
        if other.contains(&link) {
            return Some(link);
        }
        if let Some(version) = by_link.get(&link) {
            queue.extend(version.parents.iter().copied());
        }
    }
    None
}

fn read_or_empty(store: &dyn BlockStore, root: &Link) -> GraphResult<GraphState> {
    match GraphState::read(store, root) {
        Ok(graph) => Ok(graph),
        Err(GraphError::MissingBlock(link)) => {
            tracing::debug!(base = %root, missing = %link, "merge base unavailable, using empty graph");
            Ok(GraphState::new())
        }
        Err(e) => Err(e),
    }
}
