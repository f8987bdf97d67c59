//! The `CandidateNode` trait and the owned recursive node type.

use std::fmt;

use crate::proof::canon::{canonical_digest, CanonError};
use crate::proof::hash::{ContentHash, HashDomain};

/// A unit of the search space.
///
/// Implementors are cheap handles (`&T`, index handles, `Rc`s): the bisector
/// clones them freely into candidate sets and never owns node data.
///
/// # Contract
///
/// - `id()` is stable for the lifetime of the handle.
/// - `children()` returns the same ordered sequence on every call.
/// - The child relation is finite and acyclic.
pub trait CandidateNode: Clone {
    /// Stable identity (comparable, orderable, printable).
    type Id: Clone + Ord + fmt::Debug + fmt::Display;

    /// The identity of this node.
    fn id(&self) -> Self::Id;

    /// Ordered children; empty for a leaf.
    fn children(&self) -> Vec<Self>;
}

/// An owned tree node: a name and its ordered children.
///
/// Convenient for fixtures and small in-memory forests. `&TreeNodeV1`
/// implements [`CandidateNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNodeV1 {
    pub name: String,
    pub children: Vec<TreeNodeV1>,
}

impl TreeNodeV1 {
    /// A node without children.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// A node with the given children.
    #[must_use]
    pub fn branch(name: impl Into<String>, children: Vec<TreeNodeV1>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl<'a> CandidateNode for &'a TreeNodeV1 {
    type Id = &'a str;

    fn id(&self) -> &'a str {
        let node: &'a TreeNodeV1 = *self;
        node.name.as_str()
    }

    fn children(&self) -> Vec<Self> {
        let node: &'a TreeNodeV1 = *self;
        node.children.iter().collect()
    }
}

/// Render a forest as nested `{"children": [...], "id": "..."}` objects.
///
/// Shared children are rendered under every parent that references them, so
/// the output grows with the number of paths. Digest a DAG through
/// [`CandidateForestV1::digest`](super::CandidateForestV1::digest) instead.
#[must_use]
pub fn forest_to_json<N: CandidateNode>(roots: &[N]) -> serde_json::Value {
    serde_json::Value::Array(roots.iter().map(node_to_json).collect())
}

fn node_to_json<N: CandidateNode>(node: &N) -> serde_json::Value {
    let children: Vec<serde_json::Value> = node.children().iter().map(node_to_json).collect();
    serde_json::json!({
        "children": children,
        "id": node.id().to_string(),
    })
}

/// Content digest of a forest's canonical JSON rendering.
///
/// # Errors
///
/// Returns [`CanonError`] if canonicalization fails.
pub fn forest_digest<N: CandidateNode>(roots: &[N]) -> Result<ContentHash, CanonError> {
    canonical_digest(HashDomain::CandidateForest, &forest_to_json(roots))
}

/// Identities of every leaf reachable from `roots`, in depth-first order.
///
/// A leaf reachable along several paths is listed once per path.
#[must_use]
pub fn leaf_ids<N: CandidateNode>(roots: &[N]) -> Vec<N::Id> {
    let mut out = Vec::new();
    let mut pending: Vec<N> = roots.iter().rev().cloned().collect();
    while let Some(node) = pending.pop() {
        let children = node.children();
        if children.is_empty() {
            out.push(node.id());
        } else {
            pending.extend(children.into_iter().rev());
        }
    }
    out
}
