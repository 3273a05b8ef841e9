//! Reputation strategy (BringId): score floor plus an optional humanity proof.
//!
//! The score floor (`min_score`) and the humanity requirement (`min_points`)
//! are independent checks. When both are configured they combine with the
//! strategy's own [`CombineMode`](gate_types::CombineMode), which is unrelated
//! to the survey-level mode that combines strategies.

use gate_types::{
    AccessCheckResult, RequiredAction, ReputationConfig, StrategyConfig, StrategyId, Survey, User,
};

use super::{require_wallet, StrategyContext};
use crate::{AccessError, EligibilityBackend, ReputationReport};

pub const SCORE_TOO_LOW_REASON: &str = "reputation score is below the required minimum";
pub const HUMANITY_REQUIRED_REASON: &str = "humanity verification required";
pub const HUMANITY_PENDING_REASON: &str = "humanity verification in progress";
pub const DEFAULT_INSTRUCTIONS: &str = "Verify your humanity with BringId to continue";

const PRIORITY: i32 = 50;

pub struct ReputationStrategy<B> {
    ctx: StrategyContext<B>,
    config: ReputationConfig,
}

impl<B: EligibilityBackend> ReputationStrategy<B> {
    pub fn new(ctx: StrategyContext<B>) -> Self {
        Self {
            ctx,
            config: ReputationConfig::default(),
        }
    }

    pub fn priority(&self) -> i32 {
        PRIORITY
    }

    pub fn configure(&mut self, config: ReputationConfig) {
        self.config = config;
    }

    fn effective_config<'a>(&'a self, survey: &'a Survey) -> &'a ReputationConfig {
        match survey.access.per_strategy.get(&StrategyId::BringId) {
            Some(StrategyConfig::Reputation(cfg)) => cfg,
            _ => &self.config,
        }
    }

    pub async fn check_access(&self, user: &User, survey: &Survey) -> AccessCheckResult {
        let wallet = match require_wallet(user) {
            Ok(wallet) => wallet,
            Err(denial) => return denial,
        };

        let report = self
            .ctx
            .policy
            .run_if(
                || self.ctx.backend.reputation(wallet),
                AccessError::is_transient,
                |attempt, err, delay| self.ctx.on_retry(StrategyId::BringId, attempt, err, delay),
            )
            .await;

        let result = match report {
            Ok(report) => evaluate_report(self.effective_config(survey), &report),
            Err(err) => self.ctx.denial_for_error(StrategyId::BringId, &err),
        };
        if !result.is_allowed() {
            tracing::debug!(
                survey = %survey.id,
                wallet = %wallet,
                reason = result.reason().unwrap_or_default(),
                "reputation check did not pass"
            );
        }
        self.ctx.record(StrategyId::BringId, &result);
        result
    }
}

/// Apply `config` to a report. With no requirement configured, any wallet the
/// service knows passes.
pub fn evaluate_report(config: &ReputationConfig, report: &ReputationReport) -> AccessCheckResult {
    let score_ok = config.min_score.map(|min| report.score >= min);
    let humanity_ok = config.min_points.map(|min| report.points >= min);

    let passed = match (score_ok, humanity_ok) {
        (None, None) => true,
        (Some(score), None) => score,
        (None, Some(humanity)) => humanity,
        (Some(score), Some(humanity)) => config.combine_mode.fold([score, humanity]),
    };
    if passed {
        return AccessCheckResult::allowed().with_score(report.score);
    }

    // A proof is only worth offering when it alone would turn the verdict.
    let humanity_blocks = humanity_ok == Some(false)
        && score_ok.map_or(true, |score| config.combine_mode.fold([score, true]));
    if humanity_blocks && report.verification_pending {
        return AccessCheckResult::pending(HUMANITY_PENDING_REASON).with_score(report.score);
    }

    let reason = if humanity_blocks {
        HUMANITY_REQUIRED_REASON
    } else {
        SCORE_TOO_LOW_REASON
    };
    if humanity_blocks && report.verification_available {
        let instructions = match &report.verification_url {
            Some(url) => format!("{DEFAULT_INSTRUCTIONS}: {url}"),
            None => DEFAULT_INSTRUCTIONS.to_string(),
        };
        return AccessCheckResult::denied_with_action(
            reason,
            RequiredAction::humanity_verification(instructions),
        )
        .with_score(report.score);
    }
    AccessCheckResult::denied(reason).with_score(report.score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_types::{ActionKind, CombineMode};

    fn report(score: f64, points: u32) -> ReputationReport {
        ReputationReport {
            score,
            points,
            ..Default::default()
        }
    }

    fn config(min_score: Option<f64>, min_points: Option<u32>, mode: CombineMode) -> ReputationConfig {
        ReputationConfig {
            min_score,
            min_points,
            combine_mode: mode,
        }
    }

    #[test]
    fn no_requirements_allows() {
        let result = evaluate_report(&ReputationConfig::default(), &report(0.0, 0));
        assert!(result.is_allowed());
        assert_eq!(result.score, Some(0.0));
    }

    #[test]
    fn score_floor_alone() {
        let cfg = config(Some(20.0), None, CombineMode::And);
        assert!(evaluate_report(&cfg, &report(20.0, 0)).is_allowed());
        let denied = evaluate_report(&cfg, &report(19.5, 0));
        assert_eq!(denied.reason(), Some(SCORE_TOO_LOW_REASON));
        assert!(denied.action().is_none());
    }

    #[test]
    fn and_mode_needs_both() {
        let cfg = config(Some(20.0), Some(5), CombineMode::And);
        assert!(!evaluate_report(&cfg, &report(30.0, 1)).is_allowed());
        assert!(!evaluate_report(&cfg, &report(10.0, 9)).is_allowed());
        assert!(evaluate_report(&cfg, &report(30.0, 9)).is_allowed());
    }

    #[test]
    fn or_mode_needs_either() {
        let cfg = config(Some(20.0), Some(5), CombineMode::Or);
        assert!(evaluate_report(&cfg, &report(30.0, 1)).is_allowed());
        assert!(evaluate_report(&cfg, &report(10.0, 9)).is_allowed());
        assert!(!evaluate_report(&cfg, &report(10.0, 1)).is_allowed());
    }

    #[test]
    fn actionable_humanity_failure_carries_action() {
        let cfg = config(None, Some(5), CombineMode::And);
        let mut r = report(50.0, 0);
        r.verification_available = true;
        r.verification_url = Some("https://verify.example/abc".into());
        let result = evaluate_report(&cfg, &r);
        let action = result.action().expect("action expected");
        assert_eq!(action.kind, ActionKind::HumanityVerification);
        assert!(action.instructions.contains("https://verify.example/abc"));
        assert_eq!(result.reason(), Some(HUMANITY_REQUIRED_REASON));
    }

    #[test]
    fn pending_humanity_proof_is_pending() {
        let cfg = config(None, Some(5), CombineMode::And);
        let mut r = report(50.0, 0);
        r.verification_pending = true;
        r.verification_available = true;
        let result = evaluate_report(&cfg, &r);
        assert!(result.is_pending());
        assert!(!result.is_allowed());
    }

    #[test]
    fn score_failure_never_offers_humanity_action() {
        let cfg = config(Some(20.0), Some(5), CombineMode::And);
        let mut r = report(1.0, 10);
        r.verification_available = true;
        let result = evaluate_report(&cfg, &r);
        assert!(result.action().is_none());
        assert_eq!(result.reason(), Some(SCORE_TOO_LOW_REASON));
    }

    #[test]
    fn humanity_action_needs_a_passing_score_in_and_mode() {
        let cfg = config(Some(20.0), Some(5), CombineMode::And);
        let mut r = report(10.0, 0);
        r.verification_available = true;
        let result = evaluate_report(&cfg, &r);
        assert!(result.action().is_none());
        assert_eq!(result.reason(), Some(SCORE_TOO_LOW_REASON));

        r.verification_pending = true;
        assert!(!evaluate_report(&cfg, &r).is_pending());
    }

    #[test]
    fn humanity_action_offered_in_or_mode_when_both_fail() {
        let cfg = config(Some(20.0), Some(5), CombineMode::Or);
        let mut r = report(10.0, 0);
        r.verification_available = true;
        let result = evaluate_report(&cfg, &r);
        assert_eq!(result.reason(), Some(HUMANITY_REQUIRED_REASON));
        assert_eq!(
            result.action().map(|a| a.kind),
            Some(ActionKind::HumanityVerification)
        );
    }
}
