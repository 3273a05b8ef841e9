//! Shared utilities for survey-gate.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{describe_window, format_duration};
