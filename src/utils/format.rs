//! Human-readable formatting of durations and timer labels

use std::time::Duration;

use serde::Serialize;

/// A quick-start timer duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub label: &'static str,
    pub minutes: i64,
}

pub const PRESETS: [Preset; 9] = [
    Preset { label: "10 min", minutes: 10 },
    Preset { label: "30 min", minutes: 30 },
    Preset { label: "1 h", minutes: 60 },
    Preset { label: "2 h", minutes: 120 },
    Preset { label: "3 h", minutes: 180 },
    Preset { label: "4 h", minutes: 240 },
    Preset { label: "8 h", minutes: 480 },
    Preset { label: "12 h", minutes: 720 },
    Preset { label: "24 h", minutes: 1440 },
];

/// Title shown for a timer of the given length
pub fn timer_title(minutes: i64) -> String {
    if minutes < 60 {
        format!("Parking {} min", minutes)
    } else {
        format!("Parking {} h", minutes / 60)
    }
}

/// Countdown display: `H:MM:SS` from one hour up, `M:SS` below
pub fn format_remaining(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Compact uptime display such as `1h 2m 3s`
pub fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
