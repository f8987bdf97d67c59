//! Run configuration: budgets the runner enforces around a bisection.
//!
//! The bisector itself has no budgets; it terminates on any finite forest.
//! These limits bound what an unreliable or adversarial oracle can cost.
//! The resolved configuration is echoed into the report.

/// Default cap on bisector transitions per run.
pub const DEFAULT_MAX_TRANSITIONS: u64 = 10_000;
/// Default number of oracle attempts per candidate (first try included).
pub const DEFAULT_MAX_ORACLE_ATTEMPTS: u32 = 3;

/// Configuration that can override defaults.
///
/// `None` fields resolve to the `DEFAULT_*` constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum number of `failed()`/`passed()` transitions.
    pub max_transitions: Option<u64>,
    /// Total oracle attempts per candidate before giving up on
    /// infrastructure errors.
    pub max_oracle_attempts: Option<u32>,
}

/// A configuration value that can never allow progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ZeroTransitions,
    ZeroOracleAttempts,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroTransitions => write!(f, "max_transitions must be at least 1"),
            Self::ZeroOracleAttempts => write!(f, "max_oracle_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RunConfig {
    #[must_use]
    pub fn max_transitions(&self) -> u64 {
        self.max_transitions.unwrap_or(DEFAULT_MAX_TRANSITIONS)
    }

    #[must_use]
    pub fn max_oracle_attempts(&self) -> u32 {
        self.max_oracle_attempts
            .unwrap_or(DEFAULT_MAX_ORACLE_ATTEMPTS)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if a resolved budget is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transitions() == 0 {
            return Err(ConfigError::ZeroTransitions);
        }
        if self.max_oracle_attempts() == 0 {
            return Err(ConfigError::ZeroOracleAttempts);
        }
        Ok(())
    }

    /// Resolved budgets as JSON (defaults filled in).
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "max_oracle_attempts": self.max_oracle_attempts(),
            "max_transitions": self.max_transitions(),
        })
    }
}
