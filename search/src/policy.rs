//! Bisection policy.

use bisect_kernel::proof::canon::{canonical_digest, canonical_json_bytes, CanonError};
use bisect_kernel::proof::hash::{ContentHash, HashDomain};

/// Schema tag written into the policy's canonical JSON.
pub const BISECT_POLICY_SCHEMA_VERSION: &str = "bisect_policy.v1";

/// Bisector configuration.
///
/// The policy is echoed into reports so that a report digest commits to
/// the exact protocol variant that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BisectPolicyV1 {
    /// When a failing singleton is descended into, test the first half of
    /// its children immediately instead of the whole child set.
    ///
    /// Default: `false` (children are first tested together).
    pub split_children_immediately: bool,
}

impl BisectPolicyV1 {
    /// Policy with immediate child splitting enabled.
    #[must_use]
    pub fn eager_child_split() -> Self {
        Self {
            split_children_immediately: true,
        }
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "schema_version": BISECT_POLICY_SCHEMA_VERSION,
            "split_children_immediately": self.split_children_immediately,
        })
    }

    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// `canonical_hash(BisectPolicy, canonical_json_bytes(policy))`.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if canonicalization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_digest(HashDomain::BisectPolicy, &self.to_json_value())
    }
}
