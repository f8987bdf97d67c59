//! Arena-backed candidate forest.
//!
//! Nodes live in one `Vec`, addressed by index; children are index lists.
//! A node may be referenced by several parents (shared subtrees), but the
//! child relation must be acyclic. [`ForestBuilder::build`] enforces this.

use std::collections::BTreeMap;
use std::fmt;

use super::node::CandidateNode;
use crate::proof::canon::{canonical_digest, CanonError};
use crate::proof::hash::{ContentHash, HashDomain};

/// Schema tag written into the arena forest's canonical JSON.
pub const CANDIDATE_FOREST_SCHEMA_VERSION: &str = "candidate_forest.v1";

/// Typed failure for forest construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestError {
    /// A node with this name was already added.
    DuplicateNode { name: String },
    /// An edge or root referenced a name that was never added.
    UnknownNode { name: String },
    /// A node was declared as its own child.
    SelfEdge { name: String },
    /// The child relation contains a cycle through `name`.
    Cycle { name: String },
    /// No roots were declared.
    Empty,
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { name } => write!(f, "duplicate node: {name}"),
            Self::UnknownNode { name } => write!(f, "unknown node: {name}"),
            Self::SelfEdge { name } => write!(f, "node {name} is its own child"),
            Self::Cycle { name } => write!(f, "child relation has a cycle through {name}"),
            Self::Empty => write!(f, "forest has no roots"),
        }
    }
}

impl std::error::Error for ForestError {}

#[derive(Debug, Clone)]
struct NodeEntry {
    name: String,
    children: Vec<usize>,
}

/// An immutable, validated forest.
#[derive(Debug, Clone)]
pub struct CandidateForestV1 {
    nodes: Vec<NodeEntry>,
    roots: Vec<usize>,
    index: BTreeMap<String, usize>,
}

impl CandidateForestV1 {
    /// Root handles in declaration order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeRef<'_>> {
        self.roots
            .iter()
            .map(|&index| NodeRef {
                forest: self,
                index,
            })
            .collect()
    }

    /// Look up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<NodeRef<'_>> {
        self.index.get(name).map(|&index| NodeRef {
            forest: self,
            index,
        })
    }

    /// Total number of distinct nodes (reachable or not).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Render the node table: one entry per arena node with its child
    /// indices, plus the root indices. Each node appears exactly once, so
    /// the size is linear in nodes plus edges however much is shared.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let nodes: Vec<serde_json::Value> = self
            .nodes
            .iter()
            .map(|n| {
                serde_json::json!({
                    "children": n.children,
                    "id": n.name,
                })
            })
            .collect();
        serde_json::json!({
            "nodes": nodes,
            "roots": self.roots,
            "schema_version": CANDIDATE_FOREST_SCHEMA_VERSION,
        })
    }

    /// Content digest of the node table.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_digest(HashDomain::CandidateForest, &self.to_json_value())
    }
}

/// A cheap handle to one node of a [`CandidateForestV1`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    forest: &'a CandidateForestV1,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// The node's name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        let forest: &'a CandidateForestV1 = self.forest;
        forest.nodes[self.index].name.as_str()
    }

    /// Arena index of the node.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.name()).finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.index == other.index
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> CandidateNode for NodeRef<'a> {
    type Id = &'a str;

    fn id(&self) -> &'a str {
        self.name()
    }

    fn children(&self) -> Vec<Self> {
        let forest: &'a CandidateForestV1 = self.forest;
        forest.nodes[self.index]
            .children
            .iter()
            .map(|&index| NodeRef { forest, index })
            .collect()
    }
}

/// Incremental forest construction with fail-closed validation.
///
/// Adding an edge or root that already exists is a no-op.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    nodes: Vec<NodeEntry>,
    roots: Vec<usize>,
    index: BTreeMap<String, usize>,
}

impl ForestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its arena index.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::DuplicateNode`] if `name` was already added.
    pub fn add_node(&mut self, name: &str) -> Result<usize, ForestError> {
        if self.index.contains_key(name) {
            return Err(ForestError::DuplicateNode {
                name: name.to_string(),
            });
        }
        let index = self.nodes.len();
        self.nodes.push(NodeEntry {
            name: name.to_string(),
            children: Vec::new(),
        });
        self.index.insert(name.to_string(), index);
        Ok(index)
    }

    /// Whether a node named `name` has been added.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Append `child` to `parent`'s ordered child list.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UnknownNode`] if either name is missing and
    /// [`ForestError::SelfEdge`] if they are equal.
    pub fn add_child(&mut self, parent: &str, child: &str) -> Result<(), ForestError> {
        let parent_index = self.lookup(parent)?;
        let child_index = self.lookup(child)?;
        if parent_index == child_index {
            return Err(ForestError::SelfEdge {
                name: parent.to_string(),
            });
        }
        let children = &mut self.nodes[parent_index].children;
        if !children.contains(&child_index) {
            children.push(child_index);
        }
        Ok(())
    }

    /// Declare `name` as the next root.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::UnknownNode`] if `name` was never added.
    pub fn add_root(&mut self, name: &str) -> Result<(), ForestError> {
        let index = self.lookup(name)?;
        if !self.roots.contains(&index) {
            self.roots.push(index);
        }
        Ok(())
    }

    /// Validate and freeze the forest.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::Empty`] if there are no roots and
    /// [`ForestError::Cycle`] if any node can reach itself.
    pub fn build(self) -> Result<CandidateForestV1, ForestError> {
        if self.roots.is_empty() {
            return Err(ForestError::Empty);
        }
        if let Some(index) = find_cycle(&self.nodes) {
            return Err(ForestError::Cycle {
                name: self.nodes[index].name.clone(),
            });
        }
        Ok(CandidateForestV1 {
            nodes: self.nodes,
            roots: self.roots,
            index: self.index,
        })
    }

    fn lookup(&self, name: &str) -> Result<usize, ForestError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ForestError::UnknownNode {
                name: name.to_string(),
            })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Iterative three-colour DFS over every node. Returns a node on a cycle.
fn find_cycle(nodes: &[NodeEntry]) -> Option<usize> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        // (node, next child position)
        let mut path: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::OnPath;
        while let Some(top) = path.last_mut() {
            let (node, position) = *top;
            if let Some(&child) = nodes[node].children.get(position) {
                top.1 += 1;
                match marks[child] {
                    Mark::OnPath => return Some(child),
                    Mark::Unvisited => {
                        marks[child] = Mark::OnPath;
                        path.push((child, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                path.pop();
            }
        }
    }
    None
}
