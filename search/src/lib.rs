//! Bisect Search: the hierarchical bisection state machine.
//!
//! This crate depends only on `bisect_kernel`. It does NOT depend on
//! `bisect_harness`. It performs no I/O and never consults an oracle; the
//! caller feeds it verdicts one transition at a time.
//!
//! # Crate dependency graph
//!
//! ```text
//! bisect_kernel  ←  bisect_search  ←  bisect_harness
//! (tree, proof)     (bisector, log)    (manifest, oracle, runner)
//! ```
//!
//! # Key types
//!
//! - [`HierarchicalBisector`]: the state machine (`failed()` / `passed()`)
//! - [`CandidateSet`]: ordered, non-empty sibling set under test
//! - [`Frame`] / [`TraversalStack`]: the entire mutable state
//! - [`FailedOutcome`]: next candidate, or a confirmed guilty leaf
//! - [`BisectPolicyV1`]: bisection configuration
//! - [`BisectionLogV1`]: transition audit log

#![forbid(unsafe_code)]

pub mod bisector;
pub mod candidate;
pub mod error;
pub mod frame;
pub mod log;
pub mod policy;
pub mod snapshot;

pub use bisector::{FailedOutcome, HierarchicalBisector};
pub use candidate::CandidateSet;
pub use error::BisectError;
pub use frame::{Frame, TraversalStack};
pub use log::{
    BisectionLogV1, TransitionCauseV1, TransitionEventV1, TransitionOutcomeV1, Verdict,
};
pub use policy::BisectPolicyV1;
pub use snapshot::TraversalSnapshotV1;
