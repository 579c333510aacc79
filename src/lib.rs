//! park-keeper - remember where the car is parked and when the parking runs out
//!
//! The library provides a pause-aware parking countdown that survives process
//! restarts, a parking location history and app settings, all persisted
//! through a pluggable key/value store, plus an HTTP API exposing them.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use state::{AppState, ParkingTimer, TimerEvent};
pub use store::{FileStore, MemoryStore, PersistentStore};
pub use utils::signals::shutdown_signal;
