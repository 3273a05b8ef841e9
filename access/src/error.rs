use gate_types::TypesError;
use thiserror::Error;

use crate::retry::Elapsed;

/// Shown when the user has no wallet to check.
pub const REASON_IDENTIFIER_REQUIRED: &str = "identifier required";
/// Shown when a check exceeds its time budget.
pub const REASON_TIMEOUT: &str = "verification is taking too long";
/// Shown on transport failures.
pub const REASON_NETWORK: &str = "check your connection and retry";
/// Shown for every other backend failure.
pub const REASON_UNAVAILABLE: &str = "service unavailable, try later";

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AccessError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("strategy {0} is not registered")]
    UnknownStrategy(String),

    #[error("strategy {0} is already registered")]
    DuplicateStrategy(String),

    #[error("invalid access config: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Unknown(String),
}

impl AccessError {
    /// Timeouts and transport failures are worth retrying; everything else
    /// would fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(self, AccessError::Timeout { .. } | AccessError::Network(_))
    }

    /// Misuse of the registry or configuration, as opposed to a runtime
    /// failure of a check.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            AccessError::UnknownStrategy(_)
                | AccessError::DuplicateStrategy(_)
                | AccessError::InvalidConfig(_)
        )
    }

    /// The summary shown to users. Never contains transport detail.
    pub fn user_reason(&self) -> &'static str {
        match self {
            AccessError::Timeout { .. } => REASON_TIMEOUT,
            AccessError::Network(_) => REASON_NETWORK,
            _ => REASON_UNAVAILABLE,
        }
    }
}

impl From<Elapsed> for AccessError {
    fn from(e: Elapsed) -> Self {
        AccessError::Timeout {
            after_ms: e.after.as_millis() as u64,
        }
    }
}

impl From<TypesError> for AccessError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::UnknownStrategy(id) => AccessError::UnknownStrategy(id),
            TypesError::DuplicateStrategy(id) => AccessError::DuplicateStrategy(id),
            other => AccessError::InvalidConfig(other.to_string()),
        }
    }
}
