//! Single-slot parking countdown that survives pause/resume and restarts
//!
//! The timer never stores remaining time directly. While running, remaining
//! time is derived from `startTime`; on resume a virtual `startTime` is
//! computed so the same formula continues the countdown where it paused.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::timer_state::{Timer, TimerSnapshot, TimerStatus, TimerTick, MS_PER_MINUTE};
use crate::{
    clock::Clock,
    error::{Error, Result},
    store::{PersistentStore, ACTIVE_TIMER_KEY},
};

/// Owner of the one timer slot.
///
/// In-memory state only changes after the store has accepted the write, so a
/// failed write leaves the timer exactly as it was.
pub struct ParkingTimer {
    store: Arc<dyn PersistentStore>,
    clock: Arc<dyn Clock>,
    current: Option<Timer>,
}

impl ParkingTimer {
    /// Create an idle timer; call [`ParkingTimer::load`] to pick up persisted state
    pub fn new(store: Arc<dyn PersistentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Timer> {
        self.current.as_ref()
    }

    pub fn status(&self) -> TimerStatus {
        self.current
            .as_ref()
            .map(Timer::status)
            .unwrap_or(TimerStatus::Idle)
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Restore the persisted timer at process start.
    ///
    /// Unreadable or corrupt state is logged and treated as idle. A running
    /// timer that ran out while the process was down is cleared, as is a
    /// paused one with nothing left on it.
    pub async fn load(&mut self) -> Option<Timer> {
        self.current = None;

        let raw = match self.store.get(ACTIVE_TIMER_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted parking timer");
                return None;
            }
            Err(e) => {
                warn!("Failed to read persisted timer, starting idle: {}", e);
                return None;
            }
        };

        let timer: Timer = match serde_json::from_str(&raw) {
            Ok(timer) => timer,
            Err(e) => {
                warn!("Persisted timer is corrupt, starting idle: {}", e);
                return None;
            }
        };

        if timer.duration <= 0 {
            warn!("Persisted timer has invalid duration {}, discarding", timer.duration);
            self.clear_persisted().await;
            return None;
        }

        let tick = Self::tick_timer(&timer, self.clock.now_ms());
        if tick.expired || tick.remaining_ms == 0 {
            info!("Parking timer '{}' has no time left, clearing it", timer.title);
            self.clear_persisted().await;
            return None;
        }

        info!(
            "Restored parking timer '{}' ({:?}, {} ms remaining)",
            timer.title, tick.status, tick.remaining_ms
        );
        self.current = Some(timer.clone());
        Some(timer)
    }

    /// Start a new countdown of `duration_minutes`
    pub async fn start(&mut self, duration_minutes: i64) -> Result<Timer> {
        if duration_minutes <= 0 || duration_minutes.checked_mul(MS_PER_MINUTE).is_none() {
            return Err(Error::InvalidDuration {
                minutes: duration_minutes,
            });
        }
        if self.current.is_some() {
            return Err(Error::AlreadyActive);
        }

        let timer = Timer::new(duration_minutes, self.clock.now_ms());
        self.persist(&timer).await?;

        info!("Started parking timer '{}' ({})", timer.title, timer.id);
        self.current = Some(timer.clone());
        Ok(timer)
    }

    /// Freeze a running countdown.
    ///
    /// A countdown already at zero cannot be paused; it stays running so the
    /// next poll expires it.
    pub async fn pause(&mut self) -> Result<Timer> {
        let timer = self.current.as_ref().ok_or(Error::NoActiveTimer)?;
        if !timer.is_active {
            return Err(Error::AlreadyPaused);
        }

        let now = self.clock.now_ms();
        if Self::tick_timer(timer, now).expired {
            return Err(Error::TimerExpired);
        }
        let updated = Timer {
            is_active: false,
            paused_at: Some(now),
            ..timer.clone()
        };
        self.persist(&updated).await?;

        info!(
            "Paused parking timer '{}' with {} ms remaining",
            updated.title,
            updated.remaining_ms(now)
        );
        self.current = Some(updated.clone());
        Ok(updated)
    }

    /// Continue a paused countdown from where it stopped
    pub async fn resume(&mut self) -> Result<Timer> {
        let timer = self.current.as_ref().ok_or(Error::NoActiveTimer)?;
        if timer.is_active {
            return Err(Error::NotPaused);
        }

        let now = self.clock.now_ms();
        let remaining = timer.remaining_ms(now);
        let already_elapsed = timer.total_ms() - remaining;
        let updated = Timer {
            is_active: true,
            start_time: now - already_elapsed,
            paused_at: None,
            ..timer.clone()
        };
        self.persist(&updated).await?;

        info!(
            "Resumed parking timer '{}' with {} ms remaining",
            updated.title, remaining
        );
        self.current = Some(updated.clone());
        Ok(updated)
    }

    /// Cancel the countdown; does nothing when idle
    pub async fn stop(&mut self) -> Result<()> {
        let Some(timer) = self.current.as_ref() else {
            debug!("Stop requested with no active timer");
            return Ok(());
        };

        self.store.remove(ACTIVE_TIMER_KEY).await?;
        info!("Stopped parking timer '{}'", timer.title);
        self.current = None;
        Ok(())
    }

    /// Clear a timer that has run out, returning it
    pub async fn expire(&mut self) -> Result<Option<Timer>> {
        if self.current.is_none() {
            return Ok(None);
        }

        self.store.remove(ACTIVE_TIMER_KEY).await?;
        let expired = self.current.take();
        if let Some(timer) = &expired {
            info!("Parking timer '{}' expired", timer.title);
        }
        Ok(expired)
    }

    /// Compute remaining time at `now_ms` without touching any state
    pub fn tick(&self, now_ms: i64) -> TimerTick {
        match &self.current {
            Some(timer) => Self::tick_timer(timer, now_ms),
            None => TimerTick::idle(),
        }
    }

    /// Render state for clients at `now_ms`
    pub fn snapshot(&self, now_ms: i64) -> TimerSnapshot {
        TimerSnapshot::from_tick(self.current.as_ref(), self.tick(now_ms))
    }

    /// Forget the in-memory timer without touching storage
    pub(crate) fn forget(&mut self) {
        self.current = None;
    }

    fn tick_timer(timer: &Timer, now_ms: i64) -> TimerTick {
        let remaining_ms = timer.remaining_ms(now_ms);
        TimerTick {
            status: timer.status(),
            remaining_ms,
            expired: timer.is_active && remaining_ms == 0,
        }
    }

    async fn persist(&self, timer: &Timer) -> Result<()> {
        let json = serde_json::to_string(timer)?;
        self.store.set(ACTIVE_TIMER_KEY, &json).await?;
        Ok(())
    }

    async fn clear_persisted(&self) {
        if let Err(e) = self.store.remove(ACTIVE_TIMER_KEY).await {
            warn!("Failed to clear persisted timer: {}", e);
        }
    }
}
