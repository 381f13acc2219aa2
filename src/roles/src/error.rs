//! Error types for role derivation

use thiserror::Error;

/// Role derivation errors
///
/// Missing attributes, non-matching values and roles left unassigned are
/// normal outcomes and never produce an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// Rule set, filter configuration or attribute bag is structurally invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Accepted value is not a valid pattern while pattern matching is active
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// The accepted value as configured
        pattern: String,
        /// Why it was rejected
        reason: String,
    },
}

impl RoleError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the rule or bag shape
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether this error came from an uncompilable pattern
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}

impl From<serde_json::Error> for RoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for role derivation
pub type Result<T> = std::result::Result<T, RoleError>;
