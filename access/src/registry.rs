//! Strategy registry: the catalog of strategies keyed by id.
//!
//! Populated once at startup through `&mut self`, then shared read-only
//! (usually behind an `Arc`) by every evaluation. Lookups of ids that were
//! never registered are programmer errors and surface as
//! [`AccessError::UnknownStrategy`] rather than as denials.

use gate_types::{EligibilityState, StrategyConfig, StrategyId, Survey, User};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::evaluator::{evaluate_ids, Participation};
use crate::metrics::AccessMetrics;
use crate::strategy::{AllowlistStrategy, ReputationStrategy, Strategy, StrategyContext};
use crate::{AccessError, EligibilityBackend, RetryPolicy};

pub struct StrategyRegistry<B> {
    strategies: BTreeMap<StrategyId, Strategy<B>>,
}

impl<B> Default for StrategyRegistry<B> {
    fn default() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }
}

impl<B: EligibilityBackend> StrategyRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in strategy with default parameters.
    pub fn with_builtins(
        backend: Arc<B>,
        policy: RetryPolicy,
        metrics: Option<Arc<AccessMetrics>>,
    ) -> Result<Self, AccessError> {
        let mut ctx = StrategyContext::new(backend, policy);
        if let Some(metrics) = metrics {
            ctx = ctx.with_metrics(metrics);
        }
        let mut registry = Self::new();
        registry.register(Strategy::Allowlist(AllowlistStrategy::new(ctx.clone())))?;
        registry.register(Strategy::Reputation(ReputationStrategy::new(ctx)))?;
        Ok(registry)
    }

    /// Add a strategy. Each id may be registered once.
    pub fn register(&mut self, strategy: Strategy<B>) -> Result<(), AccessError> {
        let id = strategy.id();
        if self.strategies.contains_key(&id) {
            return Err(AccessError::DuplicateStrategy(id.to_string()));
        }
        tracing::debug!(strategy = %id, priority = strategy.priority(), "strategy registered");
        self.strategies.insert(id, strategy);
        Ok(())
    }

    /// Look up a strategy by id.
    pub fn get(&self, id: StrategyId) -> Result<&Strategy<B>, AccessError> {
        self.strategies
            .get(&id)
            .ok_or_else(|| AccessError::UnknownStrategy(id.to_string()))
    }

    /// Look up a strategy by its string id, as found in stored survey config.
    pub fn get_by_name(&self, name: &str) -> Result<&Strategy<B>, AccessError> {
        let id: StrategyId = name.parse()?;
        self.get(id)
    }

    /// Replace the default parameters of a registered strategy.
    pub fn configure(&mut self, id: StrategyId, config: StrategyConfig) -> Result<(), AccessError> {
        let strategy = self
            .strategies
            .get_mut(&id)
            .ok_or_else(|| AccessError::UnknownStrategy(id.to_string()))?;
        strategy.configure(config)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = StrategyId> + '_ {
        self.strategies.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Evaluate an explicit list of strategies for `user` on `survey`, folded
    /// with the survey's combine mode.
    pub async fn check_access(
        &self,
        user: &User,
        survey: &Survey,
        ids: &[StrategyId],
    ) -> Result<EligibilityState, AccessError> {
        evaluate_ids(
            self,
            user,
            survey,
            ids,
            survey.access.combine_mode,
            Participation::default(),
        )
        .await
    }
}
