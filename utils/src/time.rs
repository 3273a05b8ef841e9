//! Time formatting helpers.

use gate_types::{Survey, Timestamp};

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// One-line description of where `now` sits in the survey's window.
pub fn describe_window(survey: &Survey, now: Timestamp) -> String {
    if let Some(start) = survey.start_time {
        if start.is_after(now) {
            return format!("opens in {}", format_duration(start.as_secs() - now.as_secs()));
        }
    }
    match survey.end_time {
        Some(end) if end.is_before(now) => {
            format!("closed {} ago", format_duration(now.as_secs() - end.as_secs()))
        }
        Some(end) => format!("closes in {}", format_duration(end.as_secs() - now.as_secs())),
        None => "open".to_string(),
    }
}
