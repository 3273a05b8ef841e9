//! Prometheus metrics for access evaluation.
//!
//! [`AccessMetrics`] owns a dedicated [`Registry`] so the embedding service
//! can encode it next to its own metrics.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    Opts, Registry,
};

/// Counters and histograms covering strategy checks and evaluations.
pub struct AccessMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Combined evaluations completed.
    pub evaluations: IntCounter,
    /// Combined evaluations that ended not eligible.
    pub evaluations_denied: IntCounter,
    /// Strategy checks, labelled by strategy and outcome (`allowed`, `denied`, `pending`).
    pub strategy_checks: IntCounterVec,
    /// Retries scheduled by the retry policy, labelled by strategy.
    pub retries: IntCounterVec,
    /// Attempts that exceeded their time budget, labelled by strategy. Counts
    /// the final attempt too, whether or not it was retried.
    pub timeouts: IntCounterVec,
    /// Wall time of one combined evaluation, in milliseconds.
    pub evaluation_latency_ms: Histogram,
}

impl AccessMetrics {
    /// Create a fresh set of metrics registered under a new [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let evaluations = register_int_counter_with_registry!(
            Opts::new(
                "gate_access_evaluations_total",
                "Combined access evaluations completed"
            ),
            registry
        )?;

        let evaluations_denied = register_int_counter_with_registry!(
            Opts::new(
                "gate_access_evaluations_denied_total",
                "Combined access evaluations that ended not eligible"
            ),
            registry
        )?;

        let strategy_checks = register_int_counter_vec_with_registry!(
            Opts::new("gate_strategy_checks_total", "Strategy checks by outcome"),
            &["strategy", "outcome"],
            registry
        )?;

        let retries = register_int_counter_vec_with_registry!(
            Opts::new("gate_strategy_retries_total", "Retries scheduled per strategy"),
            &["strategy"],
            registry
        )?;

        let timeouts = register_int_counter_vec_with_registry!(
            Opts::new(
                "gate_strategy_timeouts_total",
                "Strategy attempts that exceeded their time budget"
            ),
            &["strategy"],
            registry
        )?;

        let evaluation_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "gate_access_evaluation_latency_ms",
                "Wall time of one combined evaluation in milliseconds"
            )
            .buckets(vec![
                5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            ]),
            registry
        )?;

        Ok(Self {
            registry,
            evaluations,
            evaluations_denied,
            strategy_checks,
            retries,
            timeouts,
            evaluation_latency_ms,
        })
    }
}
