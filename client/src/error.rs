//! Mapping of transport and HTTP failures onto [`AccessError`].
//!
//! Messages here end up in logs only. Strategies replace them with a generic
//! user-facing reason.

use gate_access::AccessError;
use reqwest::StatusCode;

/// Classify a failure that happened before a usable response arrived.
pub fn error_for_transport(err: &reqwest::Error, timeout_ms: u64) -> AccessError {
    if err.is_timeout() {
        AccessError::Timeout { after_ms: timeout_ms }
    } else if err.is_decode() {
        AccessError::Unknown(format!("failed to parse response: {err}"))
    } else if err.is_connect() {
        AccessError::Network(format!("connection failed: {err}"))
    } else {
        AccessError::Network(err.to_string())
    }
}

/// Classify a non-success HTTP status. `body` is the (possibly empty)
/// response text, kept for the log.
pub fn error_for_status(status: StatusCode, body: &str) -> AccessError {
    let detail = if body.is_empty() {
        format!("HTTP status {status}")
    } else {
        format!("HTTP status {status}: {}", truncate(body, 200))
    };
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AccessError::ServiceUnavailable(detail)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        AccessError::Validation(detail)
    } else {
        AccessError::Unknown(detail)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
