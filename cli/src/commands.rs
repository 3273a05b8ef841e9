//! Subcommand implementations. Results go to stdout as pretty JSON.

use anyhow::{anyhow, Context};
use gate_access::{
    AccessMetrics, CombinedAccessEvaluator, EligibilityBackend, EligibilityTracker, Participation,
    StrategyRegistry,
};
use gate_client::EligibilityClient;
use gate_phase::{
    button_directive, resolve_admin_auth_phase, resolve_participation_phase,
    submission_phase_config, AdminAuthInput, ParticipationInput, SubmissionPhase,
};
use gate_types::{StrategyConfig, StrategyId, Timestamp, User, WalletAddress};
use prometheus::Encoder;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GateConfig;

fn client(config: &GateConfig) -> anyhow::Result<EligibilityClient> {
    EligibilityClient::with_timeout(
        &config.api_url,
        Duration::from_millis(config.request_timeout_ms),
    )
    .context("building eligibility client")
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a JSON document from `source`, or stdin when it is "-".
fn read_input<T: DeserializeOwned>(source: &str) -> anyhow::Result<T> {
    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing {source}"))
}

/// Registry with every built-in strategy, configured from the file defaults.
fn registry<B: EligibilityBackend>(
    backend: Arc<B>,
    config: &GateConfig,
    metrics: Option<Arc<AccessMetrics>>,
) -> anyhow::Result<StrategyRegistry<B>> {
    let mut registry = StrategyRegistry::with_builtins(backend, config.retry.clone(), metrics)?;
    registry.configure(
        StrategyId::Allowlist,
        StrategyConfig::Allowlist(config.strategies.allowlist.clone()),
    )?;
    registry.configure(
        StrategyId::BringId,
        StrategyConfig::Reputation(config.strategies.reputation.clone()),
    )?;
    Ok(registry)
}

pub async fn check(
    config: &GateConfig,
    survey_id: &str,
    wallet: &str,
    progress: Participation,
    with_metrics: bool,
) -> anyhow::Result<()> {
    let survey = config
        .survey(survey_id)
        .ok_or_else(|| anyhow!("survey {survey_id} is not defined in the config"))?;
    let wallet = WalletAddress::new(wallet)?;

    let metrics = Arc::new(AccessMetrics::new()?);
    let backend = Arc::new(client(config)?);
    let registry = registry(backend, config, Some(Arc::clone(&metrics)))?;
    let evaluator = CombinedAccessEvaluator::new(Arc::new(registry)).with_metrics(Arc::clone(&metrics));

    let user = User::new("gatectl", Some(wallet.clone()));
    let tracker = EligibilityTracker::new();
    tracker
        .check_with(&survey.id, &wallet, || {
            evaluator.evaluate_with_progress(&user, survey, progress)
        })
        .await;
    let snapshot = tracker.snapshot().await;

    let now = Timestamp::now();
    let input = ParticipationInput {
        survey: Some(survey.clone()),
        is_connected: true,
        connected_address: Some(wallet),
        is_authenticated: true,
        eligibility: snapshot.eligibility.clone(),
        is_checking_eligibility: snapshot.is_checking,
        eligibility_error: snapshot.error.clone(),
        now,
        ..Default::default()
    };
    let phase = resolve_participation_phase(&input);

    print_json(&json!({
        "survey": survey.id,
        "window": gate_utils::describe_window(survey, now),
        "eligibility": snapshot.eligibility,
        "error": snapshot.error,
        "phase": phase,
        "button": button_directive(phase),
    }))?;

    if with_metrics {
        let mut buf = Vec::new();
        prometheus::TextEncoder::new().encode(&metrics.registry.gather(), &mut buf)?;
        print!("{}", String::from_utf8(buf)?);
    }
    Ok(())
}

pub async fn remote(config: &GateConfig, survey_id: &str, wallet: &str) -> anyhow::Result<()> {
    let wallet = WalletAddress::new(wallet)?;
    let response = client(config)?
        .eligibility(survey_id, &wallet)
        .await
        .with_context(|| format!("fetching eligibility for survey {survey_id}"))?;
    print_json(&json!({
        "survey": survey_id,
        "eligibility": response.into_state(),
    }))
}

pub fn admin_phase(source: &str) -> anyhow::Result<()> {
    let input: AdminAuthInput = read_input(source)?;
    let phase = resolve_admin_auth_phase(&input);
    print_json(&json!({
        "phase": phase,
        "effect": phase.effect(),
    }))
}

pub fn participation_phase(source: &str) -> anyhow::Result<()> {
    let input: ParticipationInput = read_input(source)?;
    let phase = resolve_participation_phase(&input);
    print_json(&json!({
        "phase": phase,
        "button": button_directive(phase),
    }))
}

pub fn submission_phase(phase: SubmissionPhase) -> anyhow::Result<()> {
    print_json(&json!({
        "phase": phase,
        "overlay": submission_phase_config(phase),
    }))
}
