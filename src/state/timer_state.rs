//! Timer record and countdown arithmetic

use serde::{Deserialize, Serialize};

use crate::utils::format::{format_remaining, timer_title};

pub const MS_PER_MINUTE: i64 = 60_000;

/// Persisted timer record, stored as one JSON object under the active timer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    /// Duration in minutes
    pub duration: i64,
    /// When the countdown last (virtually) started running, ms since epoch
    pub start_time: i64,
    pub is_active: bool,
    pub title: String,
    /// When the timer was paused; absent while running and on older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<i64>,
}

impl Timer {
    /// Create a running timer starting at `now_ms`
    pub fn new(duration_minutes: i64, now_ms: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            duration: duration_minutes,
            start_time: now_ms,
            is_active: true,
            title: timer_title(duration_minutes),
            paused_at: None,
        }
    }

    /// Full countdown length in milliseconds
    pub fn total_ms(&self) -> i64 {
        self.duration.saturating_mul(MS_PER_MINUTE)
    }

    /// Remaining time at `at_ms`, counting as if the timer were running
    fn remaining_if_running(&self, at_ms: i64) -> i64 {
        let total = self.total_ms();
        let elapsed = at_ms.saturating_sub(self.start_time);
        total.saturating_sub(elapsed).clamp(0, total)
    }

    /// Remaining time at `now_ms`.
    ///
    /// A paused timer is frozen at its pause instant. Paused records written
    /// without a pause instant report the full duration.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        if self.is_active {
            return self.remaining_if_running(now_ms);
        }
        match self.paused_at {
            Some(paused_at) => self.remaining_if_running(paused_at),
            None => self.total_ms(),
        }
    }

    /// Expected expiry instant while running
    pub fn ends_at(&self) -> Option<i64> {
        self.is_active
            .then(|| self.start_time.saturating_add(self.total_ms()))
    }

    pub fn status(&self) -> TimerStatus {
        if self.is_active {
            TimerStatus::Running
        } else {
            TimerStatus::Paused
        }
    }
}

/// Lifecycle state of the timer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// Result of a pure `tick` computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerTick {
    pub status: TimerStatus,
    pub remaining_ms: i64,
    /// Set when a running timer has reached zero
    pub expired: bool,
}

impl TimerTick {
    pub fn idle() -> Self {
        Self {
            status: TimerStatus::Idle,
            remaining_ms: 0,
            expired: false,
        }
    }
}

/// Everything a client needs to render the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub timer: Option<Timer>,
    pub remaining_ms: i64,
    pub remaining_display: String,
    /// Elapsed share of the full duration, 0..=100
    pub progress_percent: f64,
    pub ends_at: Option<i64>,
    pub expired: bool,
}

impl TimerSnapshot {
    pub fn idle() -> Self {
        Self::from_tick(None, TimerTick::idle())
    }

    pub fn from_tick(timer: Option<&Timer>, tick: TimerTick) -> Self {
        let progress_percent = match timer {
            Some(t) if t.total_ms() > 0 => {
                let total = t.total_ms() as f64;
                (total - tick.remaining_ms as f64) / total * 100.0
            }
            _ => 0.0,
        };

        Self {
            status: tick.status,
            timer: timer.cloned(),
            remaining_ms: tick.remaining_ms,
            remaining_display: format_remaining(tick.remaining_ms),
            progress_percent,
            ends_at: timer.and_then(Timer::ends_at),
            expired: tick.expired,
        }
    }
}
