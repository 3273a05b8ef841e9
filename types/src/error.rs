//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while constructing or validating gate types.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("unknown strategy id: {0}")]
    UnknownStrategy(String),

    #[error("duplicate strategy id: {0}")]
    DuplicateStrategy(String),

    #[error("config for {id} does not match its strategy")]
    ConfigMismatch { id: String },

    #[error("invalid config for {id}: {reason}")]
    InvalidConfig { id: String, reason: String },

    #[error("invalid survey window: start {start} is after end {end}")]
    InvalidWindow { start: u64, end: u64 },
}
