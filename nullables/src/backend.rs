//! Nullable eligibility backend: scripted responses, no network.

use gate_access::{
    AccessError, AllowlistStatus, EligibilityBackend, EligibilityResponse, ReputationReport,
};
use gate_types::WalletAddress;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Responses for one endpoint: a queue consumed in order, then a fallback
/// repeated forever.
struct Script<T> {
    queue: VecDeque<Result<T, AccessError>>,
    fallback: Option<Result<T, AccessError>>,
    calls: Vec<String>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: None,
            calls: Vec::new(),
        }
    }
}

impl<T: Clone> Script<T> {
    fn next(&mut self, endpoint: &str, key: String) -> Result<T, AccessError> {
        self.calls.push(key);
        match self.queue.pop_front() {
            Some(response) => response,
            None => self.fallback.clone().unwrap_or_else(|| {
                Err(AccessError::Unknown(format!("no scripted {endpoint} response")))
            }),
        }
    }
}

/// A test eligibility service.
///
/// Unscripted calls fail with [`AccessError::Unknown`], which strategies turn
/// into "service unavailable" denials.
#[derive(Default)]
pub struct NullBackend {
    allowlist: Mutex<Script<AllowlistStatus>>,
    reputation: Mutex<Script<ReputationReport>>,
    eligibility: Mutex<Script<EligibilityResponse>>,
    latency: Mutex<Duration>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Every allowlist lookup reports `listed`.
    pub fn with_listed(self, listed: bool) -> Self {
        self.allowlist.lock().unwrap().fallback = Some(Ok(AllowlistStatus {
            listed,
            reason: None,
        }));
        self
    }

    /// Every reputation lookup returns `report`.
    pub fn with_reputation(self, report: ReputationReport) -> Self {
        self.reputation.lock().unwrap().fallback = Some(Ok(report));
        self
    }

    /// Every eligibility lookup returns `response`.
    pub fn with_eligibility(self, response: EligibilityResponse) -> Self {
        self.eligibility.lock().unwrap().fallback = Some(Ok(response));
        self
    }

    /// Every call waits `latency` before answering (tokio time, so paused
    /// test clocks apply).
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = latency;
        self
    }

    /// Queue one allowlist response ahead of the fallback.
    pub fn push_allowlist(&self, response: Result<AllowlistStatus, AccessError>) {
        self.allowlist.lock().unwrap().queue.push_back(response);
    }

    /// Queue one reputation response ahead of the fallback.
    pub fn push_reputation(&self, response: Result<ReputationReport, AccessError>) {
        self.reputation.lock().unwrap().queue.push_back(response);
    }

    /// Queue one eligibility response ahead of the fallback.
    pub fn push_eligibility(&self, response: Result<EligibilityResponse, AccessError>) {
        self.eligibility.lock().unwrap().queue.push_back(response);
    }

    /// Replace the allowlist fallback, including with a permanent failure.
    pub fn set_allowlist(&self, response: Result<AllowlistStatus, AccessError>) {
        self.allowlist.lock().unwrap().fallback = Some(response);
    }

    /// Replace the reputation fallback, including with a permanent failure.
    pub fn set_reputation(&self, response: Result<ReputationReport, AccessError>) {
        self.reputation.lock().unwrap().fallback = Some(response);
    }

    // ── Assertions ──────────────────────────────────────────────────────

    pub fn allowlist_calls(&self) -> usize {
        self.allowlist.lock().unwrap().calls.len()
    }

    pub fn reputation_calls(&self) -> usize {
        self.reputation.lock().unwrap().calls.len()
    }

    pub fn eligibility_calls(&self) -> usize {
        self.eligibility.lock().unwrap().calls.len()
    }

    /// Keys (`survey/wallet` or `wallet`) of every allowlist call, in order.
    pub fn allowlist_log(&self) -> Vec<String> {
        self.allowlist.lock().unwrap().calls.clone()
    }

    fn latency(&self) -> Duration {
        *self.latency.lock().unwrap()
    }

    async fn delay(&self) {
        let latency = self.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl EligibilityBackend for NullBackend {
    async fn allowlist_status(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> Result<AllowlistStatus, AccessError> {
        let response = self
            .allowlist
            .lock()
            .unwrap()
            .next("allowlist", format!("{survey_id}/{}", wallet.normalized()));
        self.delay().await;
        response
    }

    async fn reputation(&self, wallet: &WalletAddress) -> Result<ReputationReport, AccessError> {
        let response = self
            .reputation
            .lock()
            .unwrap()
            .next("reputation", wallet.normalized());
        self.delay().await;
        response
    }

    async fn eligibility(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> Result<EligibilityResponse, AccessError> {
        let response = self
            .eligibility
            .lock()
            .unwrap()
            .next("eligibility", format!("{survey_id}/{}", wallet.normalized()));
        self.delay().await;
        response
    }
}
