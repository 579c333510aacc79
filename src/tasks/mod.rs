//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod countdown;
pub mod expiry_notifier;

// Re-export main functions
pub use countdown::countdown_task;
pub use expiry_notifier::expiry_notifier_task;
