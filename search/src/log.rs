//! `BisectionLogV1`: transition audit log.
//!
//! One event per bisector transition, in call order: either an oracle
//! verdict, or the `passed()` call that resumes the search after a leaf was
//! confirmed. The log is identity-only (no node handles) and renders to canonical JSON, so
//! two runs over the same forest with the same verdicts produce identical
//! bytes.

use bisect_kernel::proof::canon::{canonical_digest, canonical_json_bytes, CanonError};
use bisect_kernel::proof::hash::{ContentHash, HashDomain};

/// Oracle verdict for one candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate does not reproduce the failure.
    Pass,
    /// The candidate reproduces the failure.
    Fail,
}

impl Verdict {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

/// Why a transition was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCauseV1 {
    /// The oracle judged the tested candidate.
    Oracle(Verdict),
    /// The tested leaf was just confirmed guilty; it is now treated as
    /// fixed and the search resumes via `passed()`.
    LeafFixed,
}

impl TransitionCauseV1 {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oracle(verdict) => verdict.as_str(),
            Self::LeafFixed => "leaf_fixed",
        }
    }
}

/// What the bisector returned for a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcomeV1 {
    /// A new candidate to test.
    Next { candidate: Vec<String> },
    /// `failed()` confirmed an irreducible guilty leaf.
    LeafConfirmed { leaf: String },
    /// `passed()` reported global exhaustion.
    Exhausted,
}

/// A single verdict + transition event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEventV1 {
    /// Zero-based position in the log.
    pub index: u64,
    /// Identities of the candidate the transition is about.
    pub tested: Vec<String>,
    pub cause: TransitionCauseV1,
    pub outcome: TransitionOutcomeV1,
    /// Traversal stack depth after the transition.
    pub depth_after: u64,
}

/// Ordered transition events of one bisection run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BisectionLogV1 {
    events: Vec<TransitionEventV1>,
}

impl BisectionLogV1 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; `index` is assigned from the current length.
    pub fn record(
        &mut self,
        tested: Vec<String>,
        cause: TransitionCauseV1,
        outcome: TransitionOutcomeV1,
        depth_after: usize,
    ) {
        self.events.push(TransitionEventV1 {
            index: self.events.len() as u64,
            tested,
            cause,
            outcome,
            depth_after: depth_after as u64,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[TransitionEventV1] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Leaves confirmed during the run, in confirmation order.
    #[must_use]
    pub fn confirmed_leaves(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match &e.outcome {
                TransitionOutcomeV1::LeafConfirmed { leaf } => Some(leaf.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the last event reports exhaustion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(
            self.events.last().map(|e| &e.outcome),
            Some(TransitionOutcomeV1::Exhausted)
        )
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "event_count": self.events.len(),
            "events": self.events.iter().map(event_to_json).collect::<Vec<_>>(),
            "schema_version": "bisection_log.v1",
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
        canonical_digest(HashDomain::BisectionLog, &self.to_json_value())
    }
}

fn event_to_json(e: &TransitionEventV1) -> serde_json::Value {
    serde_json::json!({
        "cause": e.cause.as_str(),
        "depth_after": e.depth_after,
        "index": e.index,
        "outcome": outcome_to_json(&e.outcome),
        "tested": e.tested,
    })
}

fn outcome_to_json(o: &TransitionOutcomeV1) -> serde_json::Value {
    match o {
        TransitionOutcomeV1::Next { candidate } => {
            serde_json::json!({"candidate": candidate, "type": "next"})
        }
        TransitionOutcomeV1::LeafConfirmed { leaf } => {
            serde_json::json!({"leaf": leaf, "type": "leaf_confirmed"})
        }
        TransitionOutcomeV1::Exhausted => serde_json::json!({"type": "exhausted"}),
    }
}
