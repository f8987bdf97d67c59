//! Resolver feedback: widen the unpinned set until the manifest resolves.
//!
//! Releasing a candidate can leave the remaining pins unsatisfiable. The
//! resolver (pip-compile) then names the packages in conflict on stderr.
//! [`ConflictScanner`] reads those names, [`UnpinRetryV1`] adds them to the
//! unpinned set, and [`resolve_unpinned`] re-renders and retries. A round
//! that names nothing new is a hard failure: unpinning cannot help.
//!
//! ```text
//! render_unpinned(unpinned) → Resolver::compile
//!   Resolved           → ResolutionV1
//!   Conflict(stderr)   → scan → absorb (new names?) → retry
//! ```

use std::collections::BTreeSet;

use regex::Regex;
use tracing::{info, warn};

use crate::contract::OracleError;
use crate::manifest::{leading_name_len, normalize_name, RequirementsManifestV1};

/// `Could not find a version that matches six<1.10,>=1.13 (...)`
pub const NO_MATCHING_VERSION_PATTERN: &str =
    r"^Could not find a version that matches ([^<>=\^~]+)";

/// `  six<1.10 (from graphene==2.1.9->-r requirements.in (line 2))`
pub const INCOMPATIBLE_REQUIREMENT_PATTERN: &str = r"^.*\(from ([^<>=\^~]+)[<>=\^~]";

/// Typed failure for conflict-driven re-resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A conflict pattern failed to compile.
    Pattern { detail: String },
    /// The resolver reported conflicts but named nothing that is still
    /// pinned.
    Unresolvable {
        conflicts: Vec<String>,
        unpinned: Vec<String>,
    },
    /// `max_rounds` compile attempts all ended in conflict.
    RoundLimit { rounds: u32 },
    /// The resolver itself could not run.
    Resolver { detail: String },
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern { detail } => write!(f, "invalid conflict pattern: {detail}"),
            Self::Unresolvable { conflicts, .. } => write!(
                f,
                "cannot resolve version conflicts: [{}]",
                conflicts.join(", ")
            ),
            Self::RoundLimit { rounds } => {
                write!(f, "still conflicting after {rounds} resolve round(s)")
            }
            Self::Resolver { detail } => write!(f, "resolver failed: {detail}"),
        }
    }
}

impl std::error::Error for ResolveError {}

/// A resolver that cannot run is transient; a manifest that cannot be
/// resolved will not resolve on retry either.
impl From<ResolveError> for OracleError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Resolver { detail } => Self::Infrastructure { detail },
            other => Self::Fatal {
                detail: other.to_string(),
            },
        }
    }
}

/// Extracts conflicting package keys from resolver output.
#[derive(Debug, Clone)]
pub struct ConflictScanner {
    no_matching_version: Regex,
    incompatible_requirement: Regex,
}

impl ConflictScanner {
    /// # Errors
    ///
    /// Returns [`ResolveError::Pattern`] if a pattern does not compile.
    pub fn new() -> Result<Self, ResolveError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ResolveError::Pattern {
                detail: e.to_string(),
            })
        };
        Ok(Self {
            no_matching_version: compile(NO_MATCHING_VERSION_PATTERN)?,
            incompatible_requirement: compile(INCOMPATIBLE_REQUIREMENT_PATTERN)?,
        })
    }

    /// Normalized keys named by a conflict line, sorted. At most one name
    /// per line; the "no matching version" form wins.
    #[must_use]
    pub fn scan(&self, output: &str) -> BTreeSet<String> {
        output
            .lines()
            .filter_map(|line| {
                self.no_matching_version
                    .captures(line)
                    .or_else(|| self.incompatible_requirement.captures(line))
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| {
                        let name = m.as_str().trim();
                        let len = leading_name_len(name);
                        (len > 0).then(|| normalize_name(&name[..len]))
                    })
            })
            .collect()
    }
}

/// The unpinned set and how many conflict rounds widened it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnpinRetryV1 {
    unpinned: BTreeSet<String>,
    rounds: u32,
}

impl UnpinRetryV1 {
    /// Start from the keys released by the candidate under test.
    pub fn new<S: AsRef<str>>(released: impl IntoIterator<Item = S>) -> Self {
        Self {
            unpinned: released
                .into_iter()
                .map(|s| normalize_name(s.as_ref()))
                .collect(),
            rounds: 0,
        }
    }

    #[must_use]
    pub fn unpinned(&self) -> &BTreeSet<String> {
        &self.unpinned
    }

    /// Conflict rounds absorbed so far.
    #[must_use]
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Unpin every conflicting key and return the newly released ones.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolvable`] if no conflict is still
    /// pinned, including when `conflicts` is empty.
    pub fn absorb(&mut self, conflicts: &BTreeSet<String>) -> Result<Vec<String>, ResolveError> {
        let fresh: Vec<String> = conflicts.difference(&self.unpinned).cloned().collect();
        if fresh.is_empty() {
            return Err(ResolveError::Unresolvable {
                conflicts: conflicts.iter().cloned().collect(),
                unpinned: self.unpinned.iter().cloned().collect(),
            });
        }
        self.unpinned.extend(fresh.iter().cloned());
        self.rounds += 1;
        Ok(fresh)
    }
}

/// What one resolver run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveAttemptV1 {
    /// The input resolved; `output` is the compiled manifest.
    Resolved { output: String },
    /// The input did not resolve; `stderr` is the resolver's report.
    Conflict { stderr: String },
}

/// One resolver invocation over a rendered input manifest.
pub trait Resolver {
    /// # Errors
    ///
    /// Returns [`ResolveError::Resolver`] if the resolver could not run.
    fn compile(&mut self, requirements_in: &str) -> Result<ResolveAttemptV1, ResolveError>;
}

impl<F> Resolver for F
where
    F: FnMut(&str) -> Result<ResolveAttemptV1, ResolveError>,
{
    fn compile(&mut self, requirements_in: &str) -> Result<ResolveAttemptV1, ResolveError> {
        self(requirements_in)
    }
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionV1 {
    /// The resolver's compiled output.
    pub output: String,
    /// The input manifest that resolved.
    pub requirements_in: String,
    /// Everything released in the end: the candidate plus conflict unpins.
    pub unpinned: BTreeSet<String>,
    /// Conflict rounds before success.
    pub rounds: u32,
}

/// Render `manifest` with `released` unpinned and resolve it, unpinning
/// the resolver's conflicts and retrying for at most `max_rounds` compile
/// attempts.
///
/// # Errors
///
/// - [`ResolveError::Unresolvable`] when a conflict round names nothing new.
/// - [`ResolveError::RoundLimit`] when `max_rounds` attempts all conflict
///   (immediately for `max_rounds == 0`).
/// - [`ResolveError::Resolver`] from the resolver itself.
pub fn resolve_unpinned<S, R>(
    manifest: &RequirementsManifestV1,
    released: impl IntoIterator<Item = S>,
    resolver: &mut R,
    scanner: &ConflictScanner,
    max_rounds: u32,
) -> Result<ResolutionV1, ResolveError>
where
    S: AsRef<str>,
    R: Resolver + ?Sized,
{
    let mut retry = UnpinRetryV1::new(released);
    for _ in 0..max_rounds {
        let requirements_in = manifest.render_unpinned(retry.unpinned());
        match resolver.compile(&requirements_in)? {
            ResolveAttemptV1::Resolved { output } => {
                info!(
                    unpinned = retry.unpinned().len(),
                    rounds = retry.rounds(),
                    "requirements resolved"
                );
                return Ok(ResolutionV1 {
                    output,
                    requirements_in,
                    unpinned: retry.unpinned().clone(),
                    rounds: retry.rounds(),
                });
            }
            ResolveAttemptV1::Conflict { stderr } => {
                let conflicts = scanner.scan(&stderr);
                let fresh = retry.absorb(&conflicts)?;
                warn!(
                    round = retry.rounds(),
                    unpinned = ?fresh,
                    "version conflict, unpinning and retrying"
                );
            }
        }
    }
    Err(ResolveError::RoundLimit { rounds: max_rounds })
}
