//! Aggregate eligibility state for a user/survey pair.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AccessCheckResult, ActionKind, StrategyId};

/// Summary of one strategy's verdict, as surfaced to the UI.
///
/// Field names follow the eligibility service's JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// The denial can be lifted by completing a humanity proof.
    #[serde(default)]
    pub requires_humanity_verification: bool,
    /// A humanity proof has been started and not yet concluded.
    #[serde(default)]
    pub verification_pending: bool,
}

impl From<&AccessCheckResult> for StrategyResult {
    fn from(result: &AccessCheckResult) -> Self {
        let needs_humanity = result
            .action()
            .is_some_and(|a| a.kind == ActionKind::HumanityVerification);
        Self {
            passed: result.is_allowed(),
            reason: result.reason().map(str::to_string),
            score: result.score,
            requires_humanity_verification: needs_humanity || result.is_pending(),
            verification_pending: result.is_pending(),
        }
    }
}

/// The aggregate result of evaluating every configured strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityState {
    pub is_eligible: bool,
    #[serde(default)]
    pub has_started: bool,
    #[serde(default)]
    pub has_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub per_strategy_results: BTreeMap<StrategyId, StrategyResult>,
}

impl EligibilityState {
    /// Eligible with no strategy results (open access).
    pub fn open() -> Self {
        Self {
            is_eligible: true,
            ..Default::default()
        }
    }

    /// The first failed strategy, in id order, whose denial the user can
    /// remedy with a humanity proof.
    pub fn remediable_failure(&self) -> Option<(StrategyId, &StrategyResult)> {
        self.per_strategy_results
            .iter()
            .find(|(id, result)| {
                id.supports_remediation() && !result.passed && result.requires_humanity_verification
            })
            .map(|(id, result)| (*id, result))
    }
}
