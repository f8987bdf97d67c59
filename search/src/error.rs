//! Typed bisection errors.
//!
//! A confirmed guilty leaf is NOT an error: it is the
//! [`crate::bisector::FailedOutcome::LeafConfirmed`] variant of `failed()`'s
//! return type. `BisectError` covers construction failures and misuse only.

/// Typed failure for bisector construction and transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BisectError {
    /// The forest (or a sibling set discovered during descent) is unusable:
    /// empty, or containing two siblings with the same identity.
    InvalidInput { detail: String },
    /// A transition was called after `passed()` reported exhaustion.
    ProtocolViolation { detail: String },
}

impl std::fmt::Display for BisectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { detail } => write!(f, "invalid bisection input: {detail}"),
            Self::ProtocolViolation { detail } => {
                write!(f, "bisection protocol violation: {detail}")
            }
        }
    }
}

impl std::error::Error for BisectError {}
