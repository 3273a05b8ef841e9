//! Pre-built [`tracing::Span`] constructors for access evaluation.

use tracing::{info_span, Span};

/// Span covering one combined evaluation for a user/survey pair.
pub fn access_check_span(survey_id: &str, user_id: &str) -> Span {
    info_span!("access_check", survey = %survey_id, user = %user_id)
}

/// Span covering a single strategy check, retries included.
pub fn strategy_check_span(strategy: &str, survey_id: &str) -> Span {
    info_span!("strategy_check", strategy = %strategy, survey = %survey_id)
}
