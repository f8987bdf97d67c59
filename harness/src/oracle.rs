//! Stock oracles.
//!
//! [`GroundTruthOracle`] knows the guilty set up front and is what the
//! exhaustiveness tests and benchmarks drive the runner with. [`FnOracle`]
//! adapts a closure, for callers whose test procedure is a function.

use std::collections::BTreeSet;

use bisect_kernel::tree::CandidateNode;
use bisect_search::candidate::CandidateSet;
use bisect_search::log::Verdict;

use crate::contract::{Oracle, OracleError};

/// Fails iff some tested node, or a descendant of one, is guilty.
///
/// Releasing a node releases everything beneath it, so a branch fails
/// whenever its subtree holds a guilty leaf. Guilty identities should name
/// leaves. Identities are compared by their `Display` rendering, so one
/// oracle works for any [`CandidateNode`] handle type. Each identity is
/// visited once per evaluation, so shared dependencies cost one visit.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthOracle {
    guilty: BTreeSet<String>,
    invocations: u64,
}

impl GroundTruthOracle {
    #[must_use]
    pub fn new<S: Into<String>>(guilty: impl IntoIterator<Item = S>) -> Self {
        Self {
            guilty: guilty.into_iter().map(Into::into).collect(),
            invocations: 0,
        }
    }

    /// The guilty identities, sorted.
    #[must_use]
    pub fn guilty(&self) -> &BTreeSet<String> {
        &self.guilty
    }

    /// Number of `evaluate` calls so far.
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

impl<N: CandidateNode> Oracle<N> for GroundTruthOracle {
    fn evaluate(&mut self, candidate: &CandidateSet<N>) -> Result<Verdict, OracleError> {
        self.invocations += 1;
        let mut visited: BTreeSet<N::Id> = BTreeSet::new();
        let mut pending: Vec<N> = candidate.iter().cloned().collect();
        while let Some(node) = pending.pop() {
            if !visited.insert(node.id()) {
                continue;
            }
            if self.guilty.contains(&node.id().to_string()) {
                return Ok(Verdict::Fail);
            }
            pending.extend(node.children());
        }
        Ok(Verdict::Pass)
    }
}

/// Wraps `FnMut(&CandidateSet<N>) -> Result<Verdict, OracleError>`.
pub struct FnOracle<F> {
    f: F,
}

impl<F> FnOracle<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> std::fmt::Debug for FnOracle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOracle").finish_non_exhaustive()
    }
}

impl<N, F> Oracle<N> for FnOracle<F>
where
    N: CandidateNode,
    F: FnMut(&CandidateSet<N>) -> Result<Verdict, OracleError>,
{
    fn evaluate(&mut self, candidate: &CandidateSet<N>) -> Result<Verdict, OracleError> {
        (self.f)(candidate)
    }
}
