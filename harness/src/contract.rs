//! Oracle contract: the minimal trait a test procedure must implement.
//!
//! An oracle judges one candidate set at a time. Oracles may NOT drive the
//! bisector, record culprits, or retry on their own; those are runner
//! concerns.

use bisect_kernel::tree::CandidateNode;
use bisect_search::candidate::CandidateSet;
use bisect_search::log::Verdict;

/// Typed failure for an oracle evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Transient failure of the test infrastructure (resolver timeout,
    /// network error). The runner retries these.
    Infrastructure { detail: String },
    /// The oracle cannot judge this candidate at all. Never retried.
    Fatal { detail: String },
}

impl OracleError {
    /// Whether the runner may re-evaluate the same candidate.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Infrastructure { .. })
    }
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infrastructure { detail } => write!(f, "oracle infrastructure error: {detail}"),
            Self::Fatal { detail } => write!(f, "oracle fatal error: {detail}"),
        }
    }
}

impl std::error::Error for OracleError {}

/// The contract a test procedure must implement to be driven by the runner.
///
/// `evaluate` is called once per candidate the bisector proposes (plus any
/// retries after [`OracleError::Infrastructure`]). Returning
/// [`Verdict::Fail`] means the failure reproduces with the candidate set
/// released; [`Verdict::Pass`] means it does not.
pub trait Oracle<N: CandidateNode> {
    /// Judge `candidate`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] if the candidate could not be judged.
    fn evaluate(&mut self, candidate: &CandidateSet<N>) -> Result<Verdict, OracleError>;
}

impl<N: CandidateNode, O: Oracle<N> + ?Sized> Oracle<N> for &mut O {
    fn evaluate(&mut self, candidate: &CandidateSet<N>) -> Result<Verdict, OracleError> {
        (**self).evaluate(candidate)
    }
}
