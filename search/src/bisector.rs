//! The hierarchical bisector.
//!
//! # Protocol
//!
//! The current candidate is the top entry of the top frame: the whole forest
//! before any call, afterwards the last set returned by a transition. The
//! driver tests it and reports the verdict:
//!
//! - [`HierarchicalBisector::failed`]: the candidate still reproduces the
//!   failure. A multi-node set is halved; a singleton with children opens a
//!   new frame over them; a childless singleton is confirmed guilty
//!   ([`FailedOutcome::LeafConfirmed`]) and the state is left unchanged.
//! - [`HierarchicalBisector::passed`]: the candidate is innocent (or was
//!   just confirmed guilty and is now considered fixed). A pending first half
//!   is swapped for its complement; resolved entries and frames are popped
//!   until such a complement exists. `Ok(None)` signals global exhaustion.
//!
//! After exhaustion the stack is empty and every further transition is a
//! [`BisectError::ProtocolViolation`].

use bisect_kernel::tree::CandidateNode;

use crate::candidate::CandidateSet;
use crate::error::BisectError;
use crate::frame::{Frame, FrameAdvance, TraversalStack};
use crate::policy::BisectPolicyV1;
use crate::snapshot::TraversalSnapshotV1;

/// Result of a `failed()` transition.
#[derive(Debug, Clone)]
pub enum FailedOutcome<N> {
    /// Test this set next.
    Next(CandidateSet<N>),
    /// This leaf is irreducible and guilty. Record it, then call `passed()`.
    LeafConfirmed(N),
}

impl<N> FailedOutcome<N> {
    /// The next candidate, if this outcome is not a confirmed leaf.
    #[must_use]
    pub fn next(self) -> Option<CandidateSet<N>> {
        match self {
            Self::Next(set) => Some(set),
            Self::LeafConfirmed(_) => None,
        }
    }

    /// The confirmed leaf, if any.
    #[must_use]
    pub fn leaf(self) -> Option<N> {
        match self {
            Self::Next(_) => None,
            Self::LeafConfirmed(node) => Some(node),
        }
    }
}

/// Adaptive bisection over a forest of candidates.
///
/// Owns only its [`TraversalStack`]; nodes are cloned handles borrowed from
/// the caller's forest. Not internally synchronized: one driver per instance.
#[derive(Debug, Clone)]
pub struct HierarchicalBisector<N> {
    stack: TraversalStack<N>,
    policy: BisectPolicyV1,
}

impl<N: CandidateNode> HierarchicalBisector<N> {
    /// Start a search over `forest` (the ordered root nodes).
    ///
    /// # Errors
    ///
    /// Returns [`BisectError::InvalidInput`] if the forest is empty or two
    /// roots share an identity.
    pub fn new(
        forest: impl IntoIterator<Item = N>,
        policy: BisectPolicyV1,
    ) -> Result<Self, BisectError> {
        let Some(roots) = CandidateSet::new(forest.into_iter().collect()) else {
            return Err(BisectError::InvalidInput {
                detail: "forest is empty".into(),
            });
        };
        reject_duplicate_siblings(&roots, "root")?;
        Ok(Self {
            stack: TraversalStack::new(roots),
            policy,
        })
    }

    /// [`HierarchicalBisector::new`] with only the child-split flag given.
    ///
    /// # Errors
    ///
    /// Same as [`HierarchicalBisector::new`].
    pub fn with_split_children(
        forest: impl IntoIterator<Item = N>,
        split_children_immediately: bool,
    ) -> Result<Self, BisectError> {
        Self::new(
            forest,
            BisectPolicyV1 {
                split_children_immediately,
            },
        )
    }

    #[must_use]
    pub fn policy(&self) -> &BisectPolicyV1 {
        &self.policy
    }

    /// The candidate the driver should be testing, or `None` once exhausted.
    #[must_use]
    pub fn current(&self) -> Option<&CandidateSet<N>> {
        self.stack.current()
    }

    /// Number of open frames (tree depths).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }

    #[must_use]
    pub fn stack(&self) -> &TraversalStack<N> {
        &self.stack
    }

    #[must_use]
    pub fn snapshot(&self) -> TraversalSnapshotV1 {
        TraversalSnapshotV1::capture(&self.stack)
    }

    /// The current candidate still reproduces the failure.
    ///
    /// # Errors
    ///
    /// Returns [`BisectError::ProtocolViolation`] after exhaustion and
    /// [`BisectError::InvalidInput`] if a descended-into node has two
    /// children with the same identity (the stack is left unchanged).
    pub fn failed(&mut self) -> Result<FailedOutcome<N>, BisectError> {
        let split_children = self.policy.split_children_immediately;
        let Some(frame) = self.stack.top_mut() else {
            return Err(exhausted("failed"));
        };

        if let Some(first) = frame.top().first_half() {
            frame.push(first.clone());
            return Ok(FailedOutcome::Next(first));
        }

        let node = frame.top().leading().clone();
        let Some(children) = CandidateSet::new(node.children()) else {
            return Ok(FailedOutcome::LeafConfirmed(node));
        };
        reject_duplicate_siblings(&children, "child")?;

        let child_frame = if split_children {
            Frame::pre_split(children)
        } else {
            Frame::new(children)
        };
        let next = child_frame.top().clone();
        self.stack.push(child_frame);
        Ok(FailedOutcome::Next(next))
    }

    /// The current candidate does not reproduce the failure.
    ///
    /// Returns the next candidate, or `Ok(None)` when every candidate at
    /// every depth has been accounted for.
    ///
    /// # Errors
    ///
    /// Returns [`BisectError::ProtocolViolation`] if a previous call already
    /// returned `Ok(None)`.
    pub fn passed(&mut self) -> Result<Option<CandidateSet<N>>, BisectError> {
        if self.stack.is_empty() {
            return Err(exhausted("passed"));
        }
        // Each iteration pops one entry or one frame, so this terminates.
        while let Some(frame) = self.stack.top_mut() {
            match frame.advance() {
                FrameAdvance::Complement(next) => return Ok(Some(next)),
                FrameAdvance::Popped => {}
                FrameAdvance::Cleared => self.stack.pop(),
            }
        }
        Ok(None)
    }
}

fn exhausted(transition: &str) -> BisectError {
    BisectError::ProtocolViolation {
        detail: format!("{transition}() called after the search was exhausted"),
    }
}

fn reject_duplicate_siblings<N: CandidateNode>(
    set: &CandidateSet<N>,
    level: &str,
) -> Result<(), BisectError> {
    match set.duplicate_id() {
        Some(id) => Err(BisectError::InvalidInput {
            detail: format!("duplicate {level} identity: {id}"),
        }),
        None => Ok(()),
    }
}
