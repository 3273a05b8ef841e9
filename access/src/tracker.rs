//! Per (survey, wallet) eligibility tracking with stale-response discard.
//!
//! At most one evaluation is in flight per pair. Every started request gets a
//! generation number; completing with a ticket whose generation is no longer
//! current is a no-op. `retry()` and `invalidate()` bump the generation, so a
//! response that arrives after either is dropped deterministically.

use gate_types::{EligibilityState, WalletAddress};
use std::future::Future;
use tokio::sync::Mutex;

use crate::AccessError;

/// Proof that a caller was allowed to start a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    survey_id: String,
    wallet: String,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a renderer needs to know about the tracked pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackerSnapshot {
    pub eligibility: Option<EligibilityState>,
    pub is_checking: bool,
    /// User-safe error summary from the last failed request.
    pub error: Option<String>,
}

#[derive(Default)]
struct TrackerState {
    generation: u64,
    key: Option<(String, String)>,
    in_flight: bool,
    checked: bool,
    invalidated: bool,
    eligibility: Option<EligibilityState>,
    error: Option<String>,
}

#[derive(Default)]
pub struct EligibilityTracker {
    state: Mutex<TrackerState>,
}

impl EligibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a request for `survey_id`/`wallet`.
    ///
    /// Returns `None` when a request is already in flight, the pair was
    /// already checked, or the tracker was invalidated. Switching to another
    /// pair resets the tracked data.
    pub async fn begin(&self, survey_id: &str, wallet: &WalletAddress) -> Option<RequestTicket> {
        let mut state = self.state.lock().await;
        if state.invalidated {
            return None;
        }

        let key = (survey_id.to_string(), wallet.normalized());
        if state.key.as_ref() != Some(&key) {
            state.generation += 1;
            state.key = Some(key.clone());
            state.in_flight = false;
            state.checked = false;
            state.eligibility = None;
            state.error = None;
        }
        if state.in_flight || state.checked {
            return None;
        }

        state.generation += 1;
        state.in_flight = true;
        state.error = None;
        Some(RequestTicket {
            generation: state.generation,
            survey_id: key.0,
            wallet: key.1,
        })
    }

    /// Record the outcome of a request. Returns `false` if the response was
    /// stale and discarded.
    pub async fn complete(
        &self,
        ticket: RequestTicket,
        outcome: Result<EligibilityState, AccessError>,
    ) -> bool {
        let mut state = self.state.lock().await;
        let current_key = state.key.as_ref().map(|(s, w)| (s.as_str(), w.as_str()));
        if state.invalidated
            || ticket.generation != state.generation
            || current_key != Some((ticket.survey_id.as_str(), ticket.wallet.as_str()))
        {
            tracing::debug!(
                survey = %ticket.survey_id,
                generation = ticket.generation,
                current = state.generation,
                "discarding stale eligibility response"
            );
            return false;
        }

        state.in_flight = false;
        state.checked = true;
        match outcome {
            Ok(eligibility) => {
                state.eligibility = Some(eligibility);
                state.error = None;
            }
            Err(err) => {
                tracing::warn!(survey = %ticket.survey_id, error = %err, "eligibility check failed");
                state.error = Some(err.user_reason().to_string());
            }
        }
        true
    }

    /// Allow a new request for the current pair and drop any in-flight one.
    pub async fn retry(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.in_flight = false;
        state.checked = false;
        state.error = None;
    }

    /// Stop accepting responses for good.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.invalidated = true;
        state.in_flight = false;
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.lock().await;
        TrackerSnapshot {
            eligibility: state.eligibility.clone(),
            is_checking: state.in_flight,
            error: state.error.clone(),
        }
    }

    /// Run `check` if a request may start, and record its outcome.
    ///
    /// Returns `true` when the outcome was recorded.
    pub async fn check_with<F, Fut>(&self, survey_id: &str, wallet: &WalletAddress, check: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<EligibilityState, AccessError>>,
    {
        let Some(ticket) = self.begin(survey_id, wallet).await else {
            return false;
        };
        let outcome = check().await;
        self.complete(ticket, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(raw: &str) -> WalletAddress {
        WalletAddress::new(raw).unwrap()
    }

    #[tokio::test]
    async fn second_begin_is_gated_while_in_flight() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        assert!(tracker.begin("s1", &w).await.is_some());
        assert!(tracker.begin("s1", &w).await.is_none());
        assert!(tracker.snapshot().await.is_checking);
    }

    #[tokio::test]
    async fn checked_pair_is_not_rechecked_until_retry() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        let ticket = tracker.begin("s1", &w).await.unwrap();
        assert!(tracker.complete(ticket, Ok(EligibilityState::open())).await);
        assert!(tracker.begin("s1", &w).await.is_none());

        tracker.retry().await;
        assert!(tracker.begin("s1", &w).await.is_some());
    }

    #[tokio::test]
    async fn wallet_casing_does_not_start_a_new_pair() {
        let tracker = EligibilityTracker::new();
        let ticket = tracker.begin("s1", &wallet("0xABC")).await.unwrap();
        assert!(tracker.complete(ticket, Ok(EligibilityState::open())).await);
        assert!(tracker.begin("s1", &wallet("0xabc")).await.is_none());
    }

    #[tokio::test]
    async fn retry_discards_in_flight_response() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        let stale = tracker.begin("s1", &w).await.unwrap();
        tracker.retry().await;
        let fresh = tracker.begin("s1", &w).await.unwrap();

        assert!(!tracker.complete(stale, Ok(EligibilityState::open())).await);
        assert!(tracker.snapshot().await.eligibility.is_none());
        assert!(tracker.complete(fresh, Ok(EligibilityState::open())).await);
        assert!(tracker.snapshot().await.eligibility.is_some());
    }

    #[tokio::test]
    async fn invalidated_tracker_drops_late_response() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        let ticket = tracker.begin("s1", &w).await.unwrap();
        tracker.invalidate().await;
        assert!(!tracker.complete(ticket, Ok(EligibilityState::open())).await);
        assert!(tracker.begin("s1", &w).await.is_none());
    }

    #[tokio::test]
    async fn switching_pair_resets_data() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        let ticket = tracker.begin("s1", &w).await.unwrap();
        tracker.complete(ticket, Ok(EligibilityState::open())).await;

        let other = tracker.begin("s2", &w).await;
        assert!(other.is_some());
        let snap = tracker.snapshot().await;
        assert!(snap.eligibility.is_none());
        assert!(snap.is_checking);
    }

    #[tokio::test]
    async fn failure_stores_user_safe_error() {
        let tracker = EligibilityTracker::new();
        let w = wallet("0xabc");
        let recorded = tracker
            .check_with("s1", &w, || async {
                Err(AccessError::Network("connection reset by peer".into()))
            })
            .await;
        assert!(recorded);
        let snap = tracker.snapshot().await;
        assert_eq!(snap.error.as_deref(), Some(crate::error::REASON_NETWORK));
        assert!(!snap.is_checking);
        assert!(snap.eligibility.is_none());
    }
}
