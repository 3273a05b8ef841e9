//! gatectl configuration with TOML file support.

use gate_access::RetryPolicy;
use gate_types::{AllowlistConfig, ReputationConfig, Survey, TypesError};
use gate_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("survey {id}: {source}")]
    InvalidSurvey { id: String, source: TypesError },

    #[error("survey {0} is defined twice")]
    DuplicateSurvey(String),

    #[error("request_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Registry-wide strategy defaults. Surveys may override them per strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyDefaults {
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub reputation: ReputationConfig,
}

/// Configuration for gatectl.
///
/// Loaded from a TOML file via [`GateConfig::from_toml_file`]; command-line
/// flags and environment variables override individual fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Base URL of the eligibility service.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP timeout for a single request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry policy applied to every strategy call.
    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub strategies: StrategyDefaults,

    /// Surveys known locally, with their access configuration.
    #[serde(default)]
    pub surveys: Vec<Survey>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_api_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GateConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GateConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let mut seen: Vec<&str> = Vec::with_capacity(self.surveys.len());
        for survey in &self.surveys {
            if seen.contains(&survey.id.as_str()) {
                return Err(ConfigError::DuplicateSurvey(survey.id.clone()));
            }
            seen.push(&survey.id);
            survey.validate().map_err(|source| ConfigError::InvalidSurvey {
                id: survey.id.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn survey(&self, id: &str) -> Option<&Survey> {
        self.surveys.iter().find(|s| s.id == id)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_ms: default_request_timeout_ms(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            retry: RetryPolicy::default(),
            strategies: StrategyDefaults::default(),
            surveys: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_types::{CombineMode, StrategyConfig, StrategyId, SurveyKind};
    use std::io::Write;

    const SAMPLE: &str = r#"
        api_url = "https://surveys.example.com/api"
        log_format = "json"

        [retry]
        max_attempts = 5
        jitter = false

        [strategies.allowlist]
        denial_reason = "ask the organizer for an invite"

        [strategies.reputation]
        min_score = 20.0

        [[surveys]]
        id = "weekly-poll"

        [[surveys]]
        id = "election-forecast"
        kind = "prediction"
        start_time = 1700000000
        end_time = 1700600000

        [surveys.access]
        strategy_ids = ["allowlist", "bringid"]
        combine_mode = "or"

        [surveys.access.per_strategy.bringid]
        type = "reputation"
        min_points = 3
    "#;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = GateConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config, GateConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn parses_full_sample() {
        let config = GateConfig::from_toml_str(SAMPLE).expect("should parse");
        assert_eq!(config.api_url, "https://surveys.example.com/api");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert!(!config.retry.jitter);
        assert_eq!(config.strategies.reputation.min_score, Some(20.0));

        let forecast = config.survey("election-forecast").unwrap();
        assert_eq!(forecast.kind, SurveyKind::Prediction);
        assert_eq!(forecast.access.combine_mode, CombineMode::Or);
        assert_eq!(
            forecast.access.strategy_ids,
            vec![StrategyId::Allowlist, StrategyId::BringId]
        );
        assert!(matches!(
            forecast.access.per_strategy.get(&StrategyId::BringId),
            Some(StrategyConfig::Reputation(cfg)) if cfg.min_points == Some(3)
        ));
        assert!(config.survey("weekly-poll").unwrap().access.is_open());
    }

    #[test]
    fn round_trips_through_toml() {
        let config = GateConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(GateConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_mismatched_strategy_config() {
        let toml = r#"
            [[surveys]]
            id = "s1"
            [surveys.access]
            strategy_ids = ["allowlist"]
            [surveys.access.per_strategy.allowlist]
            type = "reputation"
        "#;
        let err = GateConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSurvey { ref id, .. } if id == "s1"));
    }

    #[test]
    fn rejects_duplicate_surveys_and_unknown_strategies() {
        let dup = "[[surveys]]\nid = \"a\"\n[[surveys]]\nid = \"a\"\n";
        assert!(matches!(
            GateConfig::from_toml_str(dup),
            Err(ConfigError::DuplicateSurvey(_))
        ));

        let unknown = "[[surveys]]\nid = \"a\"\n[surveys.access]\nstrategy_ids = [\"gitcoin\"]\n";
        assert!(matches!(
            GateConfig::from_toml_str(unknown),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_inverted_window() {
        let toml = "[[surveys]]\nid = \"a\"\nstart_time = 10\nend_time = 5\n";
        assert!(matches!(
            GateConfig::from_toml_str(toml),
            Err(ConfigError::InvalidSurvey { .. })
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = GateConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.surveys.len(), 2);
    }

    #[test]
    fn missing_file_returns_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GateConfig::from_toml_file(&dir.path().join("gate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
