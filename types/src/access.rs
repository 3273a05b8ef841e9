//! Per-strategy access results.

use serde::{Deserialize, Serialize};

/// Kind of remediation a user can perform after a denial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Complete a humanity proof with the reputation provider.
    HumanityVerification,
}

/// A remediation flow the caller can render for a denied user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    pub kind: ActionKind,
    pub instructions: String,
}

impl RequiredAction {
    pub fn humanity_verification(instructions: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::HumanityVerification,
            instructions: instructions.into(),
        }
    }
}

/// The verdict of one strategy for one user/survey pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccessDecision {
    Allowed,
    Denied {
        reason: String,
        #[serde(default)]
        action: Option<RequiredAction>,
    },
    /// A remediation is underway on the provider side; not allowed yet.
    Pending { reason: String },
}

/// Output of a strategy's `check_access`. Immutable, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessCheckResult {
    pub decision: AccessDecision,
    /// Score reported by the provider, when the strategy is score-based.
    #[serde(default)]
    pub score: Option<f64>,
}

impl AccessCheckResult {
    pub fn allowed() -> Self {
        Self {
            decision: AccessDecision::Allowed,
            score: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            decision: AccessDecision::Denied {
                reason: reason.into(),
                action: None,
            },
            score: None,
        }
    }

    pub fn denied_with_action(reason: impl Into<String>, action: RequiredAction) -> Self {
        Self {
            decision: AccessDecision::Denied {
                reason: reason.into(),
                action: Some(action),
            },
            score: None,
        }
    }

    pub fn pending(reason: impl Into<String>) -> Self {
        Self {
            decision: AccessDecision::Pending {
                reason: reason.into(),
            },
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self.decision, AccessDecision::Allowed)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.decision, AccessDecision::Pending { .. })
    }

    /// The denial or pending reason; `None` when allowed.
    pub fn reason(&self) -> Option<&str> {
        match &self.decision {
            AccessDecision::Allowed => None,
            AccessDecision::Denied { reason, .. } | AccessDecision::Pending { reason } => {
                Some(reason)
            }
        }
    }

    pub fn action(&self) -> Option<&RequiredAction> {
        match &self.decision {
            AccessDecision::Denied { action, .. } => action.as_ref(),
            _ => None,
        }
    }
}
