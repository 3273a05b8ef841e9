//! gatectl: survey access checks and phase resolution.

mod commands;
mod config;

use clap::Parser;
use gate_phase::SubmissionPhase;
use gate_utils::LogFormat;
use std::path::PathBuf;

use crate::config::GateConfig;

#[derive(Parser)]
#[command(name = "gatectl", about = "Survey access gate: eligibility checks and phase resolution")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; flags
    /// and env vars override them.
    #[arg(long, env = "GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the eligibility service.
    #[arg(long, env = "GATE_API_URL")]
    api_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "GATE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "GATE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Evaluate eligibility locally through the configured strategies.
    Check {
        /// Survey id, as defined in the config file.
        #[arg(long)]
        survey: String,
        /// Wallet address to check.
        #[arg(long)]
        wallet: String,
        /// The user already started the survey.
        #[arg(long)]
        started: bool,
        /// The user already completed the survey.
        #[arg(long)]
        completed: bool,
        /// Print Prometheus metrics after the check.
        #[arg(long)]
        metrics: bool,
    },
    /// Fetch the eligibility service's own verdict.
    Remote {
        #[arg(long)]
        survey: String,
        #[arg(long)]
        wallet: String,
    },
    /// Resolve a phase from a JSON snapshot.
    Phase {
        #[command(subcommand)]
        resolver: PhaseCommand,
    },
}

#[derive(clap::Subcommand)]
enum PhaseCommand {
    /// Administrative authorization phase.
    Admin {
        /// JSON file, or "-" for stdin.
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// Participation button phase.
    Participation {
        #[arg(long, default_value = "-")]
        input: String,
    },
    /// Submission overlay for a phase name.
    Submission {
        #[arg(long)]
        phase: SubmissionPhase,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GateConfig::from_toml_file(path)?,
        None => GateConfig::default(),
    };
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    gate_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::debug!(path = %path.display(), surveys = config.surveys.len(), "loaded config");
    }

    match cli.command {
        Command::Check {
            survey,
            wallet,
            started,
            completed,
            metrics,
        } => {
            let progress = gate_access::Participation {
                has_started: started,
                has_completed: completed,
            };
            commands::check(&config, &survey, &wallet, progress, metrics).await?;
        }
        Command::Remote { survey, wallet } => {
            commands::remote(&config, &survey, &wallet).await?;
        }
        Command::Phase { resolver } => match resolver {
            PhaseCommand::Admin { input } => commands::admin_phase(&input)?,
            PhaseCommand::Participation { input } => commands::participation_phase(&input)?,
            PhaseCommand::Submission { phase } => commands::submission_phase(phase)?,
        },
    }

    Ok(())
}
