//! Expiry notifier background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, TimerEvent};

/// What the notifier logs for one event
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    Alert(String),
    Info(String),
}

fn notice_for(event: &TimerEvent) -> Option<Notice> {
    match event {
        TimerEvent::Expired { timer, notify: true } => Some(Notice::Alert(format!(
            "Time is up for '{}'. Parking has ended, don't forget to move the car",
            timer.title
        ))),
        TimerEvent::Expired { timer, notify: false } => Some(Notice::Info(format!(
            "Parking timer '{}' expired (notifications disabled)",
            timer.title
        ))),
        TimerEvent::Started { timer } => Some(Notice::Info(format!("Timer started: {}", timer.title))),
        _ => None,
    }
}

/// Background task that reports timer lifecycle events.
///
/// Notification delivery belongs to the client; this task is the daemon-side
/// record of what would be shown.
pub async fn expiry_notifier_task(state: Arc<AppState>) {
    info!("Starting expiry notifier task");

    let mut events = state.subscribe_events();

    loop {
        match events.recv().await {
            Ok(event) => match notice_for(&event) {
                Some(Notice::Alert(message)) => warn!("{}", message),
                Some(Notice::Info(message)) => info!("{}", message),
                None => {}
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Expiry notifier lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Timer event channel closed, stopping notifier");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Timer;

    #[test]
    fn test_started_is_reported_plainly() {
        let timer = Timer::new(30, 0);
        let notice = notice_for(&TimerEvent::Started { timer: timer.clone() });
        assert_eq!(notice, Some(Notice::Info(format!("Timer started: {}", timer.title))));
    }

    #[test]
    fn test_expiry_respects_notification_setting() {
        let timer = Timer::new(5, 0);
        assert!(matches!(
            notice_for(&TimerEvent::Expired { timer: timer.clone(), notify: true }),
            Some(Notice::Alert(_))
        ));
        assert!(matches!(
            notice_for(&TimerEvent::Expired { timer, notify: false }),
            Some(Notice::Info(_))
        ));
        assert_eq!(notice_for(&TimerEvent::Stopped), None);
    }
}
