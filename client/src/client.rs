//! reqwest implementation of [`EligibilityBackend`].

use gate_access::{
    AccessError, AllowlistStatus, EligibilityBackend, EligibilityResponse, ReputationReport,
};
use gate_types::WalletAddress;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{error_for_status, error_for_transport};

/// Default timeout for a single request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the eligibility service.
#[derive(Clone)]
pub struct EligibilityClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl EligibilityClient {
    /// Create a client for `base_url` with default timeouts.
    pub fn new(base_url: &str) -> Result<Self, AccessError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, AccessError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AccessError::InvalidConfig(format!("api url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AccessError::InvalidConfig(format!(
                "api url {base_url} cannot carry paths"
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| AccessError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            http_client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AccessError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AccessError::InvalidConfig(format!("api url {} cannot carry paths", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn eligibility_url(&self, survey_id: &str, wallet: &WalletAddress) -> Result<Url, AccessError> {
        let mut url = self.endpoint(&["surveys", survey_id, "eligibility"])?;
        url.query_pairs_mut()
            .append_pair("walletAddress", wallet.as_str());
        Ok(url)
    }

    pub fn allowlist_url(&self, survey_id: &str, wallet: &WalletAddress) -> Result<Url, AccessError> {
        self.endpoint(&["surveys", survey_id, "allowlist", wallet.as_str()])
    }

    pub fn reputation_url(&self, wallet: &WalletAddress) -> Result<Url, AccessError> {
        self.endpoint(&["reputation", wallet.as_str()])
    }

    /// `GET url` and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AccessError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        tracing::debug!(%url, "eligibility service request");

        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| error_for_transport(&e, timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_for_status(status, &body);
            tracing::debug!(%url, %status, error = %err, "eligibility service rejected request");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| error_for_transport(&e, timeout_ms))?;
        serde_json::from_slice(&body)
            .map_err(|e| AccessError::Unknown(format!("failed to parse response from {url}: {e}")))
    }
}

impl EligibilityBackend for EligibilityClient {
    async fn allowlist_status(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> Result<AllowlistStatus, AccessError> {
        let url = self.allowlist_url(survey_id, wallet)?;
        self.get_json(url).await
    }

    async fn reputation(&self, wallet: &WalletAddress) -> Result<ReputationReport, AccessError> {
        let url = self.reputation_url(wallet)?;
        self.get_json(url).await
    }

    async fn eligibility(
        &self,
        survey_id: &str,
        wallet: &WalletAddress,
    ) -> Result<EligibilityResponse, AccessError> {
        let url = self.eligibility_url(survey_id, wallet)?;
        self.get_json(url).await
    }
}
