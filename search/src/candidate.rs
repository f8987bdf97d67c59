//! Candidate sets: ordered, non-empty sibling sets under simultaneous test.

use bisect_kernel::tree::CandidateNode;

/// An ordered, non-empty sequence of sibling nodes.
///
/// Halving always splits at `len / 2` (floor): the first half holds
/// `⌊n/2⌋` nodes and the second half the remaining `⌈n/2⌉`.
///
/// Two sets are at the same split stage iff their leading identities match
/// (see [`CandidateSet::same_split_stage`]). A first half shares its leading
/// node with its parent; disjoint siblings never do.
#[derive(Debug, Clone)]
pub struct CandidateSet<N> {
    nodes: Vec<N>,
}

impl<N: CandidateNode> CandidateSet<N> {
    /// Wrap `nodes`. Returns `None` if `nodes` is empty.
    #[must_use]
    pub fn new(nodes: Vec<N>) -> Option<Self> {
        if nodes.is_empty() {
            None
        } else {
            Some(Self { nodes })
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A constructed set is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether this set holds exactly one node.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.nodes.len() == 1
    }

    #[must_use]
    pub fn as_slice(&self) -> &[N] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }

    /// The first node of the set.
    #[must_use]
    pub fn leading(&self) -> &N {
        &self.nodes[0]
    }

    #[must_use]
    pub fn leading_id(&self) -> N::Id {
        self.leading().id()
    }

    /// Identities in set order.
    #[must_use]
    pub fn ids(&self) -> Vec<N::Id> {
        self.nodes.iter().map(CandidateNode::id).collect()
    }

    /// Identities rendered with `Display`, for logs and snapshots.
    #[must_use]
    pub fn id_strings(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id().to_string()).collect()
    }

    #[must_use]
    pub fn contains_id(&self, id: &N::Id) -> bool {
        self.nodes.iter().any(|n| &n.id() == id)
    }

    /// Index at which the set is halved (`len / 2`).
    #[must_use]
    pub fn split_point(&self) -> usize {
        self.nodes.len() / 2
    }

    /// `self[0 .. len/2]`, or `None` for a singleton.
    #[must_use]
    pub fn first_half(&self) -> Option<Self> {
        if self.is_singleton() {
            return None;
        }
        Some(Self {
            nodes: self.nodes[..self.split_point()].to_vec(),
        })
    }

    /// `self[len/2 ..]`, or `None` for a singleton.
    #[must_use]
    pub fn second_half(&self) -> Option<Self> {
        if self.is_singleton() {
            return None;
        }
        Some(Self {
            nodes: self.nodes[self.split_point()..].to_vec(),
        })
    }

    /// Whether `other` is at the same split stage as `self`, i.e. both
    /// start with the same node identity.
    #[must_use]
    pub fn same_split_stage(&self, other: &Self) -> bool {
        self.leading_id() == other.leading_id()
    }

    /// First identity that occurs more than once, if any.
    #[must_use]
    pub fn duplicate_id(&self) -> Option<N::Id> {
        let mut seen = std::collections::BTreeSet::new();
        self.nodes.iter().map(CandidateNode::id).find(|id| !seen.insert(id.clone()))
    }
}

impl<'s, N> IntoIterator for &'s CandidateSet<N> {
    type Item = &'s N;
    type IntoIter = std::slice::Iter<'s, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
