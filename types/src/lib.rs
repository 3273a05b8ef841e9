//! Fundamental types for survey access gating.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! wallet addresses, users, surveys, strategy identifiers and configs, per-strategy
//! access results, and the aggregate eligibility state.

pub mod access;
pub mod address;
pub mod eligibility;
pub mod error;
pub mod strategy;
pub mod survey;
pub mod time;
pub mod user;

pub use access::{AccessCheckResult, AccessDecision, ActionKind, RequiredAction};
pub use address::WalletAddress;
pub use eligibility::{EligibilityState, StrategyResult};
pub use error::TypesError;
pub use strategy::{
    AllowlistConfig, CombineMode, ReputationConfig, ResourceAccessConfig, StrategyConfig,
    StrategyId,
};
pub use survey::{Survey, SurveyKind};
pub use time::Timestamp;
pub use user::{Role, User};
