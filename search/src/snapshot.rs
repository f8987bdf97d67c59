//! Identity-only snapshot of a traversal stack.
//!
//! The snapshot carries no node handles, so it can outlive the forest and be
//! compared, logged or digested.

use bisect_kernel::proof::canon::{canonical_digest, canonical_json_bytes, CanonError};
use bisect_kernel::proof::hash::{ContentHash, HashDomain};
use bisect_kernel::tree::CandidateNode;

use crate::frame::TraversalStack;

/// Frames → entries → identities, bottom frame first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraversalSnapshotV1 {
    pub frames: Vec<Vec<Vec<String>>>,
}

impl TraversalSnapshotV1 {
    #[must_use]
    pub fn capture<N: CandidateNode>(stack: &TraversalStack<N>) -> Self {
        let frames = stack
            .frames()
            .iter()
            .map(|frame| frame.entries().map(|set| set.id_strings()).collect())
            .collect();
        Self { frames }
    }

    /// Identities of the current candidate, if any.
    #[must_use]
    pub fn current(&self) -> Option<&[String]> {
        self.frames
            .last()
            .and_then(|frame| frame.last())
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "frames": self.frames,
            "schema_version": "traversal_snapshot.v1",
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_digest(HashDomain::TraversalSnapshot, &self.to_json_value())
    }
}
