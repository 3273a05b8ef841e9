//! Strategy identifiers, per-strategy configuration, and the survey-level
//! access configuration that ties them together.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The closed set of verification strategies.
///
/// Ordering follows declaration order so that maps keyed by `StrategyId`
/// iterate deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyId {
    /// Binary membership on a per-survey access list.
    Allowlist,
    /// BringId reputation score with optional humanity proof.
    BringId,
}

impl StrategyId {
    pub const ALL: [StrategyId; 2] = [StrategyId::Allowlist, StrategyId::BringId];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Allowlist => "allowlist",
            StrategyId::BringId => "bringid",
        }
    }

    /// Name shown to users on remediation prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyId::Allowlist => "Allowlist",
            StrategyId::BringId => "BringId",
        }
    }

    /// Whether a denial from this strategy can be remedied by the user
    /// (e.g. by completing a humanity proof) rather than being final.
    pub fn supports_remediation(&self) -> bool {
        matches!(self, StrategyId::BringId)
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allowlist" => Ok(StrategyId::Allowlist),
            "bringid" => Ok(StrategyId::BringId),
            _ => Err(TypesError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for StrategyId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StrategyId> for String {
    fn from(id: StrategyId) -> Self {
        id.as_str().to_string()
    }
}

/// How multiple pass/fail results fold into one verdict.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Every result must pass.
    #[default]
    And,
    /// At least one result must pass.
    Or,
}

impl CombineMode {
    /// Fold a sequence of pass/fail results. An empty sequence passes in both
    /// modes: no configured requirement means open access.
    pub fn fold<I: IntoIterator<Item = bool>>(&self, results: I) -> bool {
        let mut iter = results.into_iter().peekable();
        if iter.peek().is_none() {
            return true;
        }
        match self {
            CombineMode::And => iter.all(|passed| passed),
            CombineMode::Or => iter.any(|passed| passed),
        }
    }
}

/// Allowlist strategy parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistConfig {
    /// Reason shown when the backend denies without giving one.
    #[serde(default)]
    pub denial_reason: Option<String>,
}

/// Reputation strategy parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// Minimum reputation score.
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Minimum humanity-proof points. `None` means no humanity requirement.
    #[serde(default)]
    pub min_points: Option<u32>,
    /// How the score floor and humanity requirement combine when both are set.
    #[serde(default)]
    pub combine_mode: CombineMode,
}

impl ReputationConfig {
    pub fn requires_humanity(&self) -> bool {
        self.min_points.is_some()
    }
}

/// Typed configuration for one strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    Allowlist(AllowlistConfig),
    Reputation(ReputationConfig),
}

impl StrategyConfig {
    /// The strategy this config is meant for.
    pub fn strategy_id(&self) -> StrategyId {
        match self {
            StrategyConfig::Allowlist(_) => StrategyId::Allowlist,
            StrategyConfig::Reputation(_) => StrategyId::BringId,
        }
    }

    /// Check that the config belongs to `id` and that its values are usable.
    pub fn validate_for(&self, id: StrategyId) -> Result<(), TypesError> {
        if self.strategy_id() != id {
            return Err(TypesError::ConfigMismatch {
                id: id.to_string(),
            });
        }
        if let StrategyConfig::Reputation(cfg) = self {
            if let Some(min) = cfg.min_score {
                if !min.is_finite() || min < 0.0 {
                    return Err(TypesError::InvalidConfig {
                        id: id.to_string(),
                        reason: format!("min_score must be a non-negative number, got {min}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Survey-level access configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAccessConfig {
    /// Strategies to evaluate. Empty means open access.
    #[serde(default)]
    pub strategy_ids: Vec<StrategyId>,
    #[serde(default)]
    pub combine_mode: CombineMode,
    /// Per-survey overrides of the registry-wide strategy defaults.
    #[serde(default)]
    pub per_strategy: BTreeMap<StrategyId, StrategyConfig>,
}

impl ResourceAccessConfig {
    /// Open access: no strategies configured.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn new(strategy_ids: Vec<StrategyId>, combine_mode: CombineMode) -> Self {
        Self {
            strategy_ids,
            combine_mode,
            per_strategy: BTreeMap::new(),
        }
    }

    pub fn with_strategy_config(mut self, config: StrategyConfig) -> Self {
        self.per_strategy.insert(config.strategy_id(), config);
        self
    }

    pub fn is_open(&self) -> bool {
        self.strategy_ids.is_empty()
    }

    /// Reject duplicate ids and configs that do not fit their strategy.
    pub fn validate(&self) -> Result<(), TypesError> {
        let mut seen = Vec::with_capacity(self.strategy_ids.len());
        for id in &self.strategy_ids {
            if seen.contains(id) {
                return Err(TypesError::DuplicateStrategy(id.to_string()));
            }
            seen.push(*id);
        }
        for (id, config) in &self.per_strategy {
            config.validate_for(*id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_id_parses_case_insensitively() {
        assert_eq!("BringId".parse::<StrategyId>().unwrap(), StrategyId::BringId);
        assert_eq!("allowlist".parse::<StrategyId>().unwrap(), StrategyId::Allowlist);
        assert!(matches!(
            "gitcoin".parse::<StrategyId>(),
            Err(TypesError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn empty_fold_is_open_in_both_modes() {
        assert!(CombineMode::And.fold(std::iter::empty()));
        assert!(CombineMode::Or.fold(std::iter::empty()));
    }

    #[test]
    fn and_requires_all_or_requires_one() {
        assert!(!CombineMode::And.fold([true, false, true]));
        assert!(CombineMode::And.fold([true, true]));
        assert!(CombineMode::Or.fold([false, true]));
        assert!(!CombineMode::Or.fold([false, false]));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let config = ResourceAccessConfig::new(
            vec![StrategyId::BringId, StrategyId::BringId],
            CombineMode::And,
        );
        assert!(matches!(config.validate(), Err(TypesError::DuplicateStrategy(_))));
    }

    #[test]
    fn mismatched_config_rejected() {
        let mut config = ResourceAccessConfig::new(vec![StrategyId::Allowlist], CombineMode::Or);
        config.per_strategy.insert(
            StrategyId::Allowlist,
            StrategyConfig::Reputation(ReputationConfig::default()),
        );
        assert!(matches!(config.validate(), Err(TypesError::ConfigMismatch { .. })));
    }

    #[test]
    fn negative_min_score_rejected() {
        let config = ResourceAccessConfig::new(vec![StrategyId::BringId], CombineMode::And)
            .with_strategy_config(StrategyConfig::Reputation(ReputationConfig {
                min_score: Some(-1.0),
                ..Default::default()
            }));
        assert!(matches!(config.validate(), Err(TypesError::InvalidConfig { .. })));
    }

    #[test]
    fn access_config_json_shape() {
        let json = r#"{
            "strategy_ids": ["allowlist", "bringid"],
            "combine_mode": "or",
            "per_strategy": {
                "bringid": { "type": "reputation", "min_score": 20.0, "min_points": 5 }
            }
        }"#;
        let config: ResourceAccessConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.combine_mode, CombineMode::Or);
        assert_eq!(config.strategy_ids.len(), 2);
        assert!(config.validate().is_ok());
        match &config.per_strategy[&StrategyId::BringId] {
            StrategyConfig::Reputation(cfg) => {
                assert_eq!(cfg.min_points, Some(5));
                assert_eq!(cfg.combine_mode, CombineMode::And);
            }
            other => panic!("unexpected config {other:?}"),
        }
    }
}
