//! Main application state shared by the HTTP handlers and background tasks

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex as AsyncMutex};
use tracing::{debug, info, warn};

use super::{
    ParkingHistory, ParkingTimer, Settings, SettingsStore, Timer, TimerSnapshot,
};
use crate::{
    clock::Clock,
    error::Result,
    store::{PersistentStore, ALL_KEYS},
};

/// Timer lifecycle notifications for the UI layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TimerEvent {
    Started { timer: Timer },
    Paused { timer: Timer },
    Resumed { timer: Timer },
    Stopped,
    /// `notify` mirrors the notifications setting at expiry time
    Expired { timer: Timer, notify: bool },
}

/// Main application state owning the timer slot, history and settings
pub struct AppState {
    /// The one parking timer; mutations are serialized through this lock
    pub timer: AsyncMutex<ParkingTimer>,
    pub history: ParkingHistory,
    pub settings: SettingsStore,
    store: Arc<dyn PersistentStore>,
    /// How often the countdown task polls the timer
    pub tick_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Latest timer snapshot for pollers
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
    /// Lifecycle events (start, pause, expiry, ...)
    pub event_tx: broadcast::Sender<TimerEvent>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PersistentStore>,
        clock: Arc<dyn Clock>,
        tick_interval: Duration,
        port: u16,
        host: String,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerSnapshot::idle());

        Self {
            timer: AsyncMutex::new(ParkingTimer::new(store.clone(), clock.clone())),
            history: ParkingHistory::new(store.clone(), clock),
            settings: SettingsStore::new(store.clone()),
            store,
            tick_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Restore persisted timer state; call once before serving
    pub async fn init(&self) -> Option<Timer> {
        let mut timer = self.timer.lock().await;
        let restored = timer.load().await;
        let snapshot = timer.snapshot(timer.now_ms());
        drop(timer);

        self.publish(snapshot);
        restored
    }

    pub async fn start_timer(&self, minutes: i64) -> Result<TimerSnapshot> {
        let mut timer = self.timer.lock().await;
        let started = timer.start(minutes).await?;
        let snapshot = timer.snapshot(timer.now_ms());
        drop(timer);

        self.after_mutation("timer-start", TimerEvent::Started { timer: started }, &snapshot);
        Ok(snapshot)
    }

    pub async fn pause_timer(&self) -> Result<TimerSnapshot> {
        let mut timer = self.timer.lock().await;
        let paused = timer.pause().await?;
        let snapshot = timer.snapshot(timer.now_ms());
        drop(timer);

        self.after_mutation("timer-pause", TimerEvent::Paused { timer: paused }, &snapshot);
        Ok(snapshot)
    }

    pub async fn resume_timer(&self) -> Result<TimerSnapshot> {
        let mut timer = self.timer.lock().await;
        let resumed = timer.resume().await?;
        let snapshot = timer.snapshot(timer.now_ms());
        drop(timer);

        self.after_mutation("timer-resume", TimerEvent::Resumed { timer: resumed }, &snapshot);
        Ok(snapshot)
    }

    pub async fn stop_timer(&self) -> Result<TimerSnapshot> {
        let mut timer = self.timer.lock().await;
        let was_active = timer.current().is_some();
        timer.stop().await?;
        let snapshot = timer.snapshot(timer.now_ms());
        drop(timer);

        if was_active {
            self.after_mutation("timer-stop", TimerEvent::Stopped, &snapshot);
        }
        Ok(snapshot)
    }

    /// Current timer view without side effects
    pub async fn timer_snapshot(&self) -> TimerSnapshot {
        let timer = self.timer.lock().await;
        timer.snapshot(timer.now_ms())
    }

    /// One countdown step: compute remaining time and clear the timer on expiry.
    ///
    /// The returned snapshot carries `expired = true` on the step that expired it.
    pub async fn poll_timer(&self) -> Result<TimerSnapshot> {
        let mut timer = self.timer.lock().await;
        let now = timer.now_ms();
        let snapshot = timer.snapshot(now);

        if snapshot.expired {
            let expired = timer.expire().await?;
            drop(timer);

            if let Some(expired) = expired {
                let notify = match self.settings.load().await {
                    Ok(settings) => settings.notifications,
                    Err(e) => {
                        warn!("Failed to read settings for expiry notification: {}", e);
                        true
                    }
                };
                self.record_action("timer-expired");
                self.emit(TimerEvent::Expired { timer: expired, notify });
            }
        }

        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    /// Wipe history, timer and settings.
    ///
    /// Locks are taken in the order timer, history, settings.
    pub async fn reset_all(&self) -> Result<Settings> {
        let mut timer = self.timer.lock().await;
        let history = self.history.lock_writes().await;
        let settings = self.settings.lock_writes().await;

        self.store.remove_many(&ALL_KEYS).await?;
        let was_active = timer.current().is_some();
        timer.forget();
        drop(settings);
        drop(history);
        drop(timer);

        info!("All stored data cleared");
        self.record_action("reset");
        if was_active {
            self.emit(TimerEvent::Stopped);
        }
        self.publish(TimerSnapshot::idle());
        Ok(Settings::default())
    }

    /// Note the most recent user-visible action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn watch_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    fn after_mutation(&self, action: &str, event: TimerEvent, snapshot: &TimerSnapshot) {
        self.record_action(action);
        self.emit(event);
        self.publish(snapshot.clone());
    }

    fn emit(&self, event: TimerEvent) {
        // no subscribers is fine
        if self.event_tx.send(event).is_err() {
            debug!("No listeners for timer event");
        }
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }
    }
}
