//! Survey access verification.
//!
//! Access is decided by a closed set of verification strategies:
//! 1. **Allowlist**: the wallet is on the survey's access list.
//! 2. **Reputation** (BringId): the wallet's score and humanity proof meet the
//!    configured minimums.
//!
//! A survey names the strategies it uses and how to combine them (AND/OR).
//! Every strategy call goes through a bounded [`RetryPolicy`]; failures turn
//! into denials with a user-safe reason, never into errors.

pub mod backend;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod registry;
pub mod retry;
pub mod spans;
pub mod strategy;
pub mod tracker;

pub use backend::{AllowlistStatus, EligibilityBackend, EligibilityResponse, ReputationReport};
pub use error::AccessError;
pub use evaluator::{combine, CombinedAccessEvaluator, Participation, StrategyOutcome};
pub use metrics::AccessMetrics;
pub use registry::StrategyRegistry;
pub use retry::{with_timeout, Elapsed, RetryPolicy};
pub use strategy::{AllowlistStrategy, ReputationStrategy, Strategy, StrategyContext};
pub use tracker::{EligibilityTracker, RequestTicket, TrackerSnapshot};
