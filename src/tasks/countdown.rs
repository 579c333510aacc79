//! Countdown background task

use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::{AppState, TimerStatus};

/// Background task that polls the parking timer on a fixed interval and
/// clears it when it runs out
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task (interval {:?})", state.tick_interval);

    let mut interval = interval(state.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        match state.poll_timer().await {
            Ok(snapshot) if snapshot.expired => {
                info!("Parking timer reached zero");
            }
            Ok(snapshot) if snapshot.status == TimerStatus::Running => {
                debug!("Parking timer: {} remaining", snapshot.remaining_display);
            }
            Ok(_) => {}
            Err(e) => {
                // expiry will be retried on the next tick
                error!("Failed to update parking timer: {}", e);
            }
        }
    }
}
