//! State management module
//!
//! The parking timer, parking history and settings, plus the shared
//! application state that owns them.

pub mod app_state;
pub mod history;
pub mod parking_timer;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TimerEvent};
pub use history::{
    DirectionsReport, DistanceReport, NewLocation, ParkingHistory, ParkingLocation,
};
pub use parking_timer::ParkingTimer;
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use timer_state::{Timer, TimerSnapshot, TimerStatus, TimerTick};
