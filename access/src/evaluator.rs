//! Combined access evaluation.
//!
//! Every configured strategy runs (no short-circuiting) so that
//! `per_strategy_results` is always complete for remediation UIs. Results fold
//! with the survey's [`CombineMode`]; the aggregate reason comes from the
//! highest-priority denial.

use futures_util::future::join_all;
use gate_types::{
    AccessCheckResult, CombineMode, EligibilityState, StrategyId, StrategyResult, Survey, User,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Instrument;

use crate::metrics::AccessMetrics;
use crate::{AccessError, EligibilityBackend, StrategyRegistry};

/// Progress of the user on the survey, supplied by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub has_started: bool,
    pub has_completed: bool,
}

/// One strategy's verdict together with what is needed to fold it.
#[derive(Clone, Debug, PartialEq)]
pub struct StrategyOutcome {
    pub id: StrategyId,
    pub priority: i32,
    pub result: AccessCheckResult,
}

/// Fold strategy outcomes into an [`EligibilityState`]. Pure.
pub fn combine(
    mode: CombineMode,
    outcomes: &[StrategyOutcome],
    progress: Participation,
) -> EligibilityState {
    let is_eligible = mode.fold(outcomes.iter().map(|o| o.result.is_allowed()));

    let reason = if is_eligible {
        None
    } else {
        let mut denials: Vec<&StrategyOutcome> =
            outcomes.iter().filter(|o| !o.result.is_allowed()).collect();
        denials.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        denials
            .first()
            .and_then(|o| o.result.reason())
            .map(str::to_string)
    };

    let per_strategy_results: BTreeMap<StrategyId, StrategyResult> = outcomes
        .iter()
        .map(|o| (o.id, StrategyResult::from(&o.result)))
        .collect();

    EligibilityState {
        is_eligible,
        has_started: progress.has_started,
        has_completed: progress.has_completed,
        reason,
        per_strategy_results,
    }
}

/// Resolve `ids`, run all of them concurrently, and fold with `mode`.
///
/// Every id is resolved before any backend call, so an unknown id fails
/// without side effects.
pub(crate) async fn evaluate_ids<B: EligibilityBackend>(
    registry: &StrategyRegistry<B>,
    user: &User,
    survey: &Survey,
    ids: &[StrategyId],
    mode: CombineMode,
    progress: Participation,
) -> Result<EligibilityState, AccessError> {
    let mut strategies = Vec::with_capacity(ids.len());
    for id in ids {
        if strategies.iter().any(|s: &&crate::Strategy<B>| s.id() == *id) {
            return Err(AccessError::InvalidConfig(format!("strategy {id} listed twice")));
        }
        strategies.push(registry.get(*id)?);
    }

    let results = join_all(strategies.iter().map(|s| s.check_access(user, survey))).await;

    let outcomes: Vec<StrategyOutcome> = strategies
        .iter()
        .zip(results)
        .map(|(strategy, result)| StrategyOutcome {
            id: strategy.id(),
            priority: strategy.priority(),
            result,
        })
        .collect();

    Ok(combine(mode, &outcomes, progress))
}

/// Applies a survey's access configuration through an injected registry.
pub struct CombinedAccessEvaluator<B> {
    registry: Arc<StrategyRegistry<B>>,
    metrics: Option<Arc<AccessMetrics>>,
}

impl<B: EligibilityBackend> CombinedAccessEvaluator<B> {
    pub fn new(registry: Arc<StrategyRegistry<B>>) -> Self {
        Self {
            registry,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<AccessMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &StrategyRegistry<B> {
        &self.registry
    }

    /// Evaluate `user` on `survey` for a user with no recorded progress.
    pub async fn evaluate(&self, user: &User, survey: &Survey) -> Result<EligibilityState, AccessError> {
        self.evaluate_with_progress(user, survey, Participation::default())
            .await
    }

    /// Evaluate `user` on `survey`, carrying the caller's progress flags into
    /// the resulting state.
    pub async fn evaluate_with_progress(
        &self,
        user: &User,
        survey: &Survey,
        progress: Participation,
    ) -> Result<EligibilityState, AccessError> {
        survey.access.validate()?;

        let span = crate::spans::access_check_span(&survey.id, &user.id);
        async move {
            let started = tokio::time::Instant::now();
            let state = evaluate_ids(
                &self.registry,
                user,
                survey,
                &survey.access.strategy_ids,
                survey.access.combine_mode,
                progress,
            )
            .await?;

            if let Some(metrics) = &self.metrics {
                metrics.evaluations.inc();
                if !state.is_eligible {
                    metrics.evaluations_denied.inc();
                }
                metrics
                    .evaluation_latency_ms
                    .observe(started.elapsed().as_secs_f64() * 1000.0);
            }
            tracing::info!(
                eligible = state.is_eligible,
                strategies = survey.access.strategy_ids.len(),
                mode = ?survey.access.combine_mode,
                "access evaluated"
            );
            Ok(state)
        }
        .instrument(span)
        .await
    }
}
