//! The external eligibility service, as seen by the strategies.
//!
//! The service itself is a black box. Production code talks to it over HTTP
//! (`gate-client`); tests script it (`gate-nullables`).

use gate_types::{EligibilityState, StrategyId, StrategyResult, WalletAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

use crate::AccessError;

/// Allowlist membership as reported by the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistStatus {
    pub listed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Reputation data for a wallet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReport {
    pub score: f64,
    /// Humanity-proof points accumulated so far.
    #[serde(default)]
    pub points: u32,
    /// The user can start a humanity proof right now.
    #[serde(default)]
    pub verification_available: bool,
    /// A humanity proof was started and has not concluded.
    #[serde(default)]
    pub verification_pending: bool,
    #[serde(default)]
    pub verification_url: Option<String>,
}

/// Server-side eligibility verdict for a survey.
///
/// `accessStrategies` is keyed by strategy id strings; ids this build does
/// not know are dropped when converting to [`EligibilityState`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub is_eligible: bool,
    #[serde(default)]
    pub has_started: bool,
    #[serde(default)]
    pub has_completed: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub access_strategies: Option<BTreeMap<String, StrategyResult>>,
}

impl EligibilityResponse {
    /// Adopt the server verdict as-is.
    pub fn into_state(self) -> EligibilityState {
        let mut per_strategy_results = BTreeMap::new();
        for (raw_id, result) in self.access_strategies.unwrap_or_default() {
            match raw_id.parse::<StrategyId>() {
                Ok(id) => {
                    per_strategy_results.insert(id, result);
                }
                Err(_) => {
                    tracing::debug!(strategy = %raw_id, "ignoring unknown strategy in eligibility response");
                }
            }
        }
        EligibilityState {
            is_eligible: self.is_eligible,
            has_started: self.has_started,
            has_completed: self.has_completed,
            reason: self.reason,
            per_strategy_results,
        }
    }
}

/// Calls into the eligibility service.
pub trait EligibilityBackend: Send + Sync {
    /// Whether `wallet` is on the access list of `survey_id`.
    fn allowlist_status(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> impl Future<Output = Result<AllowlistStatus, AccessError>> + Send;

    /// Reputation score and humanity-proof status of `wallet`.
    fn reputation(
        &self,
        wallet: &WalletAddress,
    ) -> impl Future<Output = Result<ReputationReport, AccessError>> + Send;

    /// The service's own aggregate verdict for `wallet` on `survey_id`.
    fn eligibility(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> impl Future<Output = Result<EligibilityResponse, AccessError>> + Send;
}
