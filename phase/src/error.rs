use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("unknown phase {0:?}")]
    UnknownPhase(String),

    #[error("cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("question {index} is out of range for a survey of {total} questions")]
    QuestionOutOfRange { index: usize, total: usize },
}
