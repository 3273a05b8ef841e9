//! Surveys: the protected resource.

use serde::{Deserialize, Serialize};

use crate::{ResourceAccessConfig, Timestamp, TypesError};

/// What kind of survey this is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyKind {
    #[default]
    Standard,
    /// Results are revealed once the end time passes.
    Prediction,
}

impl SurveyKind {
    /// Whether the survey's end time gates result viewing.
    pub fn is_time_boxed(&self) -> bool {
        matches!(self, SurveyKind::Prediction)
    }
}

/// A survey together with its access configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: String,
    #[serde(default)]
    pub kind: SurveyKind,
    #[serde(default)]
    pub start_time: Option<Timestamp>,
    #[serde(default)]
    pub end_time: Option<Timestamp>,
    #[serde(default)]
    pub access: ResourceAccessConfig,
}

impl Survey {
    /// A standard, open-access survey with no time window.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: SurveyKind::Standard,
            start_time: None,
            end_time: None,
            access: ResourceAccessConfig::open(),
        }
    }

    pub fn with_access(mut self, access: ResourceAccessConfig) -> Self {
        self.access = access;
        self
    }

    pub fn with_kind(mut self, kind: SurveyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_window(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    /// Validate the access config and the time window.
    pub fn validate(&self) -> Result<(), TypesError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(TypesError::InvalidWindow {
                    start: start.as_secs(),
                    end: end.as_secs(),
                });
            }
        }
        self.access.validate()
    }
}
