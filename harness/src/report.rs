//! `BisectionReportV1`: the auditable result of one run.
//!
//! The report commits to its inputs through digests (forest, policy) and
//! carries the full transition log, so two runs over identical inputs with
//! a deterministic oracle produce byte-identical canonical JSON.

use bisect_kernel::proof::canon::{canonical_digest, canonical_json_bytes, CanonError};
use bisect_kernel::proof::hash::{ContentHash, HashDomain};
use bisect_search::log::BisectionLogV1;

use crate::policy::RunConfig;

/// Schema tag written into the report's canonical JSON.
pub const BISECTION_REPORT_SCHEMA_VERSION: &str = "bisection_report.v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BisectionReportV1 {
    /// Confirmed guilty leaves, deduplicated, in first-confirmation order.
    pub culprits: Vec<String>,
    pub log: BisectionLogV1,
    /// Oracle calls including retries.
    pub oracle_invocations: u64,
    pub forest_digest: ContentHash,
    pub policy_digest: ContentHash,
    pub config: RunConfig,
}

impl BisectionReportV1 {
    #[must_use]
    pub fn is_culprit(&self, id: &str) -> bool {
        self.culprits.iter().any(|c| c == id)
    }

    /// Number of bisector transitions taken.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "config": self.config.to_json_value(),
            "culprits": self.culprits,
            "forest_digest": self.forest_digest.as_str(),
            "log": self.log.to_json_value(),
            "oracle_invocations": self.oracle_invocations,
            "policy_digest": self.policy_digest.as_str(),
            "schema_version": BISECTION_REPORT_SCHEMA_VERSION,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// `canonical_hash(BisectionReport, canonical_json_bytes(report))`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_digest(HashDomain::BisectionReport, &self.to_json_value())
    }
}
