//! Submission lifecycle: overlay lookup and the flow that drives the phase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PhaseError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    SubmittingAnswer,
    SubmittingFinal,
    Redirecting,
    Error,
}

impl SubmissionPhase {
    pub const ALL: [SubmissionPhase; 5] = [
        SubmissionPhase::Idle,
        SubmissionPhase::SubmittingAnswer,
        SubmissionPhase::SubmittingFinal,
        SubmissionPhase::Redirecting,
        SubmissionPhase::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::SubmittingAnswer => "submitting_answer",
            SubmissionPhase::SubmittingFinal => "submitting_final",
            SubmissionPhase::Redirecting => "redirecting",
            SubmissionPhase::Error => "error",
        }
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionPhase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubmissionPhase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PhaseError::UnknownPhase(s.to_string()))
    }
}

/// Overlay directive for a submission phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SubmissionPhaseConfig {
    pub show_overlay: bool,
    pub overlay_message: Option<&'static str>,
    pub is_blocking: bool,
}

impl SubmissionPhaseConfig {
    const NONE: Self = Self {
        show_overlay: false,
        overlay_message: None,
        is_blocking: false,
    };

    const fn blocking(message: &'static str) -> Self {
        Self {
            show_overlay: true,
            overlay_message: Some(message),
            is_blocking: true,
        }
    }
}

/// Static lookup: only the final submission and the redirect block the UI.
pub fn submission_phase_config(phase: SubmissionPhase) -> SubmissionPhaseConfig {
    match phase {
        SubmissionPhase::SubmittingFinal => SubmissionPhaseConfig::blocking("Submitting survey..."),
        SubmissionPhase::Redirecting => SubmissionPhaseConfig::blocking("Redirecting to results..."),
        SubmissionPhase::Idle | SubmissionPhase::SubmittingAnswer | SubmissionPhase::Error => {
            SubmissionPhaseConfig::NONE
        }
    }
}

/// Drives [`SubmissionPhase`] through answer saving.
///
/// ```text
/// idle ──save(i)──▶ submitting_answer ──saved──▶ idle
///   │                      └──failed──▶ error ──dismiss──▶ idle
///   └──save(last)──▶ submitting_final ──saved──▶ redirecting
///                          └──failed──▶ error
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionFlow {
    phase: SubmissionPhase,
    total_questions: usize,
    error: Option<String>,
}

impl SubmissionFlow {
    pub fn new(total_questions: usize) -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            total_questions,
            error: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn config(&self) -> SubmissionPhaseConfig {
        submission_phase_config(self.phase)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start saving the answer to question `index` (0-based).
    ///
    /// Saving the last answer enters `submitting_final` immediately, before
    /// the caller issues the network call.
    pub fn save_answer(&mut self, index: usize) -> Result<SubmissionPhase, PhaseError> {
        if index >= self.total_questions {
            return Err(PhaseError::QuestionOutOfRange {
                index,
                total: self.total_questions,
            });
        }
        if self.phase != SubmissionPhase::Idle {
            return Err(self.invalid("save an answer"));
        }
        let is_last = index + 1 == self.total_questions;
        self.phase = if is_last {
            SubmissionPhase::SubmittingFinal
        } else {
            SubmissionPhase::SubmittingAnswer
        };
        tracing::debug!(question = index, phase = %self.phase, "saving answer");
        Ok(self.phase)
    }

    /// The save call succeeded.
    pub fn answer_saved(&mut self) -> Result<SubmissionPhase, PhaseError> {
        self.phase = match self.phase {
            SubmissionPhase::SubmittingAnswer => SubmissionPhase::Idle,
            SubmissionPhase::SubmittingFinal => SubmissionPhase::Redirecting,
            _ => return Err(self.invalid("complete a save")),
        };
        Ok(self.phase)
    }

    /// The save call failed with a user-safe `reason`.
    pub fn save_failed(&mut self, reason: impl Into<String>) -> Result<SubmissionPhase, PhaseError> {
        match self.phase {
            SubmissionPhase::SubmittingAnswer | SubmissionPhase::SubmittingFinal => {
                let reason = reason.into();
                tracing::warn!(phase = %self.phase, %reason, "answer submission failed");
                self.error = Some(reason);
                self.phase = SubmissionPhase::Error;
                Ok(self.phase)
            }
            _ => Err(self.invalid("fail a save")),
        }
    }

    /// Leave the error state so the user can try again.
    pub fn dismiss_error(&mut self) -> Result<SubmissionPhase, PhaseError> {
        if self.phase != SubmissionPhase::Error {
            return Err(self.invalid("dismiss an error"));
        }
        self.error = None;
        self.phase = SubmissionPhase::Idle;
        Ok(self.phase)
    }

    fn invalid(&self, action: &'static str) -> PhaseError {
        PhaseError::InvalidTransition {
            from: self.phase.as_str(),
            action,
        }
    }
}
