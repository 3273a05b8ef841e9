//! Retry with exponential backoff and a per-attempt timeout.
//!
//! - Backoff: `delay = min(base_delay_ms * 2^(attempt-1), max_delay_ms)`
//! - Optional jitter of at most a quarter of the backoff, derived from the
//!   attempt number so schedules stay reproducible, re-capped at `max_delay_ms`
//! - Each attempt races the operation against a timer; losing the race yields
//!   an [`Elapsed`] converted into the caller's error type
//! - The schedule is non-decreasing across attempts
//!
//! A timeout only stops the caller from waiting. The underlying request is
//! not aborted by the remote side, so late responses must be discarded by the
//! caller (see [`crate::tracker`]).

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Marker produced when an attempt loses the race against its timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed {
    pub after: Duration,
}

/// Bounded retry configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 behave as 1.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for any single delay.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-attempt time budget. Zero disables the timeout race.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_ms: default_timeout_ms(),
            jitter: default_jitter(),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never waits.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff before jitter for a 1-indexed attempt, capped at `max_delay_ms`.
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    /// The delay to wait after a failed attempt, jitter included.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let mut delay = self.backoff_ms(attempt);
        if self.jitter {
            let quarter = delay / 4;
            if quarter > 0 {
                let spread = (u64::from(attempt)
                    .wrapping_mul(7919)
                    .wrapping_add(104_729))
                    % (quarter + 1);
                delay = delay.saturating_add(spread).min(self.max_delay_ms);
            }
        }
        Duration::from_millis(delay)
    }

    /// Per-attempt timeout, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Retry every failure until `max_attempts` is reached.
    pub async fn run<F, Fut, T, E, R>(&self, op: F, on_retry: R) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Elapsed>,
        R: FnMut(u32, &E, Duration),
    {
        self.run_if(op, |_| true, on_retry).await
    }

    /// Retry only failures accepted by `should_retry`; anything else is
    /// returned immediately.
    ///
    /// `on_retry(attempt, error, delay)` is called before each wait with the
    /// 1-indexed attempt that just failed.
    pub async fn run_if<F, Fut, T, E, P, R>(
        &self,
        mut op: F,
        mut should_retry: P,
        mut on_retry: R,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Elapsed>,
        P: FnMut(&E) -> bool,
        R: FnMut(u32, &E, Duration),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match with_timeout(self.timeout(), op()).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= max_attempts || !should_retry(&err) {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    on_retry(attempt, &err, delay);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Race `fut` against a timer. `None` waits indefinitely.
pub async fn with_timeout<F, T, E>(limit: Option<Duration>, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Elapsed>,
{
    match limit {
        None => fut.await,
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => Err(Elapsed { after }.into()),
        },
    }
}
