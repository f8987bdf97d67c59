//! Harness runner: drives a bisector to exhaustion against an oracle.
//!
//! The runner uses ONLY the public bisector protocol (`new`, `failed`,
//! `passed`). It does not implement any traversal logic itself.
//!
//! # Pipeline
//!
//! ```text
//! validate config → digest forest + policy → HierarchicalBisector::new
//!   → loop { oracle(current) → failed() | passed() → log }
//!   → BisectionReportV1
//! ```
//!
//! After each confirmed leaf the runner records it and calls `passed()`,
//! treating the leaf as fixed. The loop ends when `passed()` reports
//! exhaustion.

use tracing::{debug, info, info_span, warn};

use bisect_kernel::proof::canon::CanonError;
use bisect_kernel::proof::hash::ContentHash;
use bisect_kernel::tree::{forest_digest, CandidateForestV1, CandidateNode, NodeRef};
use bisect_search::bisector::{FailedOutcome, HierarchicalBisector};
use bisect_search::candidate::CandidateSet;
use bisect_search::error::BisectError;
use bisect_search::log::{BisectionLogV1, TransitionCauseV1, TransitionOutcomeV1, Verdict};
use bisect_search::policy::BisectPolicyV1;

use crate::contract::{Oracle, OracleError};
use crate::policy::{ConfigError, RunConfig};
use crate::report::BisectionReportV1;

/// Error during a bisection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Run configuration is unusable.
    InvalidConfig(ConfigError),
    /// The bisector rejected its input or a transition.
    Bisect(BisectError),
    /// The oracle could not judge a candidate: a fatal error, or
    /// infrastructure errors on every allowed attempt.
    OracleUnavailable {
        candidate: Vec<String>,
        attempts: u32,
        error: OracleError,
    },
    /// The run hit `max_transitions` before exhaustion.
    TransitionBudgetExceeded { max_transitions: u64 },
    /// Canonical JSON serialization failed.
    CanonFailed { detail: String },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(e) => write!(f, "invalid run config: {e}"),
            Self::Bisect(e) => write!(f, "{e}"),
            Self::OracleUnavailable {
                candidate,
                attempts,
                error,
            } => write!(
                f,
                "oracle unavailable for [{}] after {attempts} attempt(s): {error}",
                candidate.join(", ")
            ),
            Self::TransitionBudgetExceeded { max_transitions } => {
                write!(f, "transition budget exceeded: max_transitions={max_transitions}")
            }
            Self::CanonFailed { detail } => write!(f, "canonicalization failed: {detail}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<BisectError> for RunError {
    fn from(e: BisectError) -> Self {
        Self::Bisect(e)
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::InvalidConfig(e)
    }
}

fn canon_failed(e: &CanonError) -> RunError {
    RunError::CanonFailed {
        detail: e.to_string(),
    }
}

/// Run a full bisection over `forest` (the ordered roots).
///
/// # Errors
///
/// Returns [`RunError`] if the config is invalid, the forest is rejected,
/// the oracle is unavailable, or the transition budget is exhausted.
pub fn run_bisection<N, O>(
    forest: &[N],
    oracle: &mut O,
    policy: BisectPolicyV1,
    config: &RunConfig,
) -> Result<BisectionReportV1, RunError>
where
    N: CandidateNode,
    O: Oracle<N> + ?Sized,
{
    config.validate()?;
    let forest_digest = forest_digest(forest).map_err(|e| canon_failed(&e))?;
    bisect_with_forest_digest(forest, forest_digest, oracle, policy, config)
}

/// [`run_bisection`] over every root of an arena forest.
///
/// The report binds the forest's node-table digest
/// ([`CandidateForestV1::digest`]), which stays linear in size when
/// dependencies are shared.
///
/// # Errors
///
/// Same as [`run_bisection`].
pub fn run_forest_bisection<'f, O>(
    forest: &'f CandidateForestV1,
    oracle: &mut O,
    policy: BisectPolicyV1,
    config: &RunConfig,
) -> Result<BisectionReportV1, RunError>
where
    O: Oracle<NodeRef<'f>> + ?Sized,
{
    config.validate()?;
    let forest_digest = forest.digest().map_err(|e| canon_failed(&e))?;
    bisect_with_forest_digest(&forest.roots(), forest_digest, oracle, policy, config)
}

fn bisect_with_forest_digest<N, O>(
    forest: &[N],
    forest_digest: ContentHash,
    oracle: &mut O,
    policy: BisectPolicyV1,
    config: &RunConfig,
) -> Result<BisectionReportV1, RunError>
where
    N: CandidateNode,
    O: Oracle<N> + ?Sized,
{
    let _span = info_span!(
        "bisection",
        roots = forest.len(),
        split_children_immediately = policy.split_children_immediately
    )
    .entered();

    let policy_digest = policy.digest().map_err(|e| canon_failed(&e))?;
    let mut bisector = HierarchicalBisector::new(forest.iter().cloned(), policy)?;

    let max_transitions = config.max_transitions();
    let max_attempts = config.max_oracle_attempts();
    let mut log = BisectionLogV1::new();
    let mut culprits: Vec<String> = Vec::new();
    let mut oracle_invocations: u64 = 0;

    let mut candidate = match bisector.current() {
        Some(set) => set.clone(),
        None => {
            return Err(RunError::Bisect(BisectError::ProtocolViolation {
                detail: "fresh bisector has no candidate".into(),
            }))
        }
    };

    loop {
        check_budget(&log, max_transitions)?;
        let tested = candidate.id_strings();
        let verdict = evaluate_with_retry(
            oracle,
            &candidate,
            max_attempts,
            &mut oracle_invocations,
        )?;
        let cause = TransitionCauseV1::Oracle(verdict);

        let next = match verdict {
            Verdict::Fail => match bisector.failed()? {
                FailedOutcome::Next(set) => {
                    log.record(
                        tested,
                        cause,
                        TransitionOutcomeV1::Next {
                            candidate: set.id_strings(),
                        },
                        bisector.depth(),
                    );
                    Some(set)
                }
                FailedOutcome::LeafConfirmed(leaf) => {
                    let leaf_id = leaf.id().to_string();
                    log.record(
                        tested.clone(),
                        cause,
                        TransitionOutcomeV1::LeafConfirmed {
                            leaf: leaf_id.clone(),
                        },
                        bisector.depth(),
                    );
                    if culprits.contains(&leaf_id) {
                        debug!(leaf = %leaf_id, "culprit confirmed again via another path");
                    } else {
                        info!(leaf = %leaf_id, "culprit confirmed");
                        culprits.push(leaf_id);
                    }
                    check_budget(&log, max_transitions)?;
                    let resumed = bisector.passed()?;
                    record_passed(
                        &mut log,
                        tested,
                        TransitionCauseV1::LeafFixed,
                        resumed.as_ref(),
                        bisector.depth(),
                    );
                    resumed
                }
            },
            Verdict::Pass => {
                let next = bisector.passed()?;
                record_passed(&mut log, tested, cause, next.as_ref(), bisector.depth());
                next
            }
        };

        debug!(
            transitions = log.len(),
            tested = candidate.len(),
            verdict = verdict.as_str(),
            depth = bisector.depth(),
            "transition"
        );

        match next {
            Some(set) => candidate = set,
            None => break,
        }
    }

    info!(
        culprits = culprits.len(),
        transitions = log.len(),
        oracle_invocations,
        "bisection complete"
    );

    Ok(BisectionReportV1 {
        culprits,
        log,
        oracle_invocations,
        forest_digest,
        policy_digest,
        config: *config,
    })
}

fn check_budget(log: &BisectionLogV1, max_transitions: u64) -> Result<(), RunError> {
    if log.len() as u64 >= max_transitions {
        warn!(max_transitions, "transition budget exhausted");
        return Err(RunError::TransitionBudgetExceeded { max_transitions });
    }
    Ok(())
}

fn record_passed<N: CandidateNode>(
    log: &mut BisectionLogV1,
    tested: Vec<String>,
    cause: TransitionCauseV1,
    next: Option<&CandidateSet<N>>,
    depth_after: usize,
) {
    let outcome = match next {
        Some(set) => TransitionOutcomeV1::Next {
            candidate: set.id_strings(),
        },
        None => TransitionOutcomeV1::Exhausted,
    };
    log.record(tested, cause, outcome, depth_after);
}

fn evaluate_with_retry<N, O>(
    oracle: &mut O,
    candidate: &CandidateSet<N>,
    max_attempts: u32,
    invocations: &mut u64,
) -> Result<Verdict, RunError>
where
    N: CandidateNode,
    O: Oracle<N> + ?Sized,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        *invocations += 1;
        match oracle.evaluate(candidate) {
            Ok(verdict) => return Ok(verdict),
            Err(error) if error.is_retryable() && attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    candidate = candidate.len(),
                    error = %error,
                    "oracle infrastructure failure, retrying"
                );
            }
            Err(error) => {
                return Err(RunError::OracleUnavailable {
                    candidate: candidate.id_strings(),
                    attempts: attempt,
                    error,
                })
            }
        }
    }
}
