//! Error types for park-keeper.

use thiserror::Error;

use crate::store::StoreError;

/// The main error type for timer, history and settings operations.
///
/// Every variant is recoverable: the operation that produced it leaves the
/// in-memory and persisted state unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// Duration was zero, negative, or too large to express in milliseconds.
    #[error("invalid timer duration: {minutes} minutes (must be a positive number of minutes)")]
    InvalidDuration { minutes: i64 },

    /// A timer is already running or paused.
    #[error("a parking timer is already active; stop it before starting a new one")]
    AlreadyActive,

    /// Pause or resume was requested with no timer.
    #[error("no active parking timer")]
    NoActiveTimer,

    /// Pause was requested on a paused timer.
    #[error("the parking timer is already paused")]
    AlreadyPaused,

    /// Resume was requested on a running timer.
    #[error("the parking timer is not paused")]
    NotPaused,

    /// Pause was requested after the countdown reached zero.
    #[error("the parking timer has already run out")]
    TimerExpired,

    /// No history entry with the given id.
    #[error("parking location not found: {id}")]
    LocationNotFound { id: String },

    /// Latitude or longitude out of range.
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The request body or query string could not be parsed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The persistent store failed to read or write.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// A record could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for park-keeper operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDuration { .. } => "invalid_duration",
            Self::AlreadyActive => "already_active",
            Self::NoActiveTimer => "no_active_timer",
            Self::AlreadyPaused => "already_paused",
            Self::NotPaused => "not_paused",
            Self::TimerExpired => "timer_expired",
            Self::LocationNotFound { .. } => "location_not_found",
            Self::InvalidCoordinates { .. } => "invalid_coordinates",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Storage(_) => "storage_failure",
            Self::Json(_) => "serialization_failure",
        }
    }

    /// Whether the error was caused by the caller's input or timing rather than the system.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDuration { minutes: -5 };
        assert!(err.to_string().contains("-5 minutes"));

        assert_eq!(Error::NoActiveTimer.to_string(), "no active parking timer");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::AlreadyActive.kind(), "already_active");
        assert_eq!(
            Error::LocationNotFound { id: "x".to_string() }.kind(),
            "location_not_found"
        );
    }

    #[test]
    fn test_new_kinds_are_caller_errors() {
        let err = Error::InvalidRequest {
            message: "missing field `minutes`".to_string(),
        };
        assert_eq!(err.kind(), "invalid_request");
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("missing field"));

        assert_eq!(Error::TimerExpired.kind(), "timer_expired");
        assert!(Error::TimerExpired.is_caller_error());
    }

    #[test]
    fn test_from_store_error() {
        let err: Error = StoreError::InvalidKey("../etc".to_string()).into();
        assert!(matches!(err, Error::Storage(_)));
        assert!(!err.is_caller_error());
        assert!(err.to_string().contains("../etc"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }
}
