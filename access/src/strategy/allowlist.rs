//! Allowlist strategy: binary membership on a per-survey access list.

use gate_types::{AccessCheckResult, AllowlistConfig, StrategyConfig, StrategyId, Survey, User};

use super::{require_wallet, StrategyContext};
use crate::{AccessError, EligibilityBackend};

/// Default reason when the service denies without one.
pub const NOT_LISTED_REASON: &str = "not on the access list";

const PRIORITY: i32 = 100;

pub struct AllowlistStrategy<B> {
    ctx: StrategyContext<B>,
    config: AllowlistConfig,
}

impl<B: EligibilityBackend> AllowlistStrategy<B> {
    pub fn new(ctx: StrategyContext<B>) -> Self {
        Self {
            ctx,
            config: AllowlistConfig::default(),
        }
    }

    pub fn priority(&self) -> i32 {
        PRIORITY
    }

    pub fn configure(&mut self, config: AllowlistConfig) {
        self.config = config;
    }

    /// Survey override if present, else the registry-wide default.
    fn effective_config<'a>(&'a self, survey: &'a Survey) -> &'a AllowlistConfig {
        match survey.access.per_strategy.get(&StrategyId::Allowlist) {
            Some(StrategyConfig::Allowlist(cfg)) => cfg,
            _ => &self.config,
        }
    }

    pub async fn check_access(&self, user: &User, survey: &Survey) -> AccessCheckResult {
        let wallet = match require_wallet(user) {
            Ok(wallet) => wallet,
            Err(denial) => return denial,
        };

        let status = self
            .ctx
            .policy
            .run_if(
                || self.ctx.backend.allowlist_status(&survey.id, wallet),
                AccessError::is_transient,
                |attempt, err, delay| {
                    self.ctx
                        .on_retry(StrategyId::Allowlist, attempt, err, delay)
                },
            )
            .await;

        let result = match status {
            Ok(status) if status.listed => AccessCheckResult::allowed(),
            Ok(status) => {
                let reason = status
                    .reason
                    .or_else(|| self.effective_config(survey).denial_reason.clone())
                    .unwrap_or_else(|| NOT_LISTED_REASON.to_string());
                tracing::debug!(survey = %survey.id, wallet = %wallet, %reason, "wallet not on allowlist");
                AccessCheckResult::denied(reason)
            }
            Err(err) => self.ctx.denial_for_error(StrategyId::Allowlist, &err),
        };
        self.ctx.record(StrategyId::Allowlist, &result);
        result
    }
}
