//! Verification strategies.
//!
//! The strategy set is closed: [`Strategy`] is an enum over the built-ins,
//! constructed once at startup and registered in a
//! [`StrategyRegistry`](crate::StrategyRegistry). Each strategy decides access
//! for one criterion and never fails: backend errors become denials with a
//! user-safe reason.

mod allowlist;
mod reputation;

pub use allowlist::AllowlistStrategy;
pub use reputation::ReputationStrategy;

use gate_types::{AccessCheckResult, StrategyConfig, StrategyId, Survey, User, WalletAddress};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::error::REASON_IDENTIFIER_REQUIRED;
use crate::metrics::AccessMetrics;
use crate::{AccessError, EligibilityBackend, RetryPolicy};

/// Collaborators shared by every strategy.
pub struct StrategyContext<B> {
    pub backend: Arc<B>,
    pub policy: RetryPolicy,
    pub metrics: Option<Arc<AccessMetrics>>,
}

impl<B> StrategyContext<B> {
    pub fn new(backend: Arc<B>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AccessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Observer passed to the retry policy.
    fn on_retry(&self, id: StrategyId, attempt: u32, err: &AccessError, delay: Duration) {
        tracing::warn!(
            strategy = %id,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "strategy check failed, retrying"
        );
        if let Some(metrics) = &self.metrics {
            metrics.retries.with_label_values(&[id.as_str()]).inc();
        }
        self.count_timeout(id, err);
    }

    fn count_timeout(&self, id: StrategyId, err: &AccessError) {
        if let (Some(metrics), AccessError::Timeout { .. }) = (&self.metrics, err) {
            metrics.timeouts.with_label_values(&[id.as_str()]).inc();
        }
    }

    /// Translate the final backend failure into a denial. Detail goes to the
    /// log only.
    fn denial_for_error(&self, id: StrategyId, err: &AccessError) -> AccessCheckResult {
        tracing::warn!(strategy = %id, error = %err, "strategy check failed");
        self.count_timeout(id, err);
        AccessCheckResult::denied(err.user_reason())
    }

    fn record(&self, id: StrategyId, result: &AccessCheckResult) {
        if let Some(metrics) = &self.metrics {
            let outcome = if result.is_allowed() {
                "allowed"
            } else if result.is_pending() {
                "pending"
            } else {
                "denied"
            };
            metrics
                .strategy_checks
                .with_label_values(&[id.as_str(), outcome])
                .inc();
        }
    }
}

impl<B> Clone for StrategyContext<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            policy: self.policy.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

/// One of the built-in verification strategies.
pub enum Strategy<B> {
    Allowlist(AllowlistStrategy<B>),
    Reputation(ReputationStrategy<B>),
}

impl<B: EligibilityBackend> Strategy<B> {
    /// Unique id under which the strategy is registered.
    pub fn id(&self) -> StrategyId {
        match self {
            Strategy::Allowlist(_) => StrategyId::Allowlist,
            Strategy::Reputation(_) => StrategyId::BringId,
        }
    }

    /// Higher priorities are consulted first when surfacing a denial reason.
    pub fn priority(&self) -> i32 {
        match self {
            Strategy::Allowlist(s) => s.priority(),
            Strategy::Reputation(s) => s.priority(),
        }
    }

    /// Replace the strategy's default parameters. The config is validated here,
    /// not at check time.
    pub fn configure(&mut self, config: StrategyConfig) -> Result<(), AccessError> {
        config.validate_for(self.id())?;
        match (self, config) {
            (Strategy::Allowlist(s), StrategyConfig::Allowlist(cfg)) => s.configure(cfg),
            (Strategy::Reputation(s), StrategyConfig::Reputation(cfg)) => s.configure(cfg),
            (strategy, _) => {
                return Err(AccessError::InvalidConfig(format!(
                    "config does not match strategy {}",
                    strategy.id()
                )))
            }
        }
        Ok(())
    }

    /// Decide access for `user` on `survey`. Never fails.
    pub async fn check_access(&self, user: &User, survey: &Survey) -> AccessCheckResult {
        let span = crate::spans::strategy_check_span(self.id().as_str(), &survey.id);
        async move {
            match self {
                Strategy::Allowlist(s) => s.check_access(user, survey).await,
                Strategy::Reputation(s) => s.check_access(user, survey).await,
            }
        }
        .instrument(span)
        .await
    }
}

/// The wallet a strategy needs, or the fail-fast denial when it is missing.
fn require_wallet(user: &User) -> Result<&WalletAddress, AccessCheckResult> {
    user.wallet_address
        .as_ref()
        .ok_or_else(|| AccessCheckResult::denied(REASON_IDENTIFIER_REQUIRED))
}
