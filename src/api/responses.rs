//! API response structures

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    error::Error,
    state::{Settings, TimerSnapshot},
};

/// Response for timer endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl TimerResponse {
    pub fn new(message: impl Into<String>, timer: TimerSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response for the data reset endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub settings: Settings,
}

impl ResetResponse {
    pub fn ok(settings: Settings) -> Self {
        Self {
            status: "ok".to_string(),
            message: "All data cleared".to_string(),
            timestamp: Utc::now(),
            settings,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime: String,
    pub host: String,
    pub port: u16,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub kind: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper turning domain errors into HTTP responses
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidRequest {
            message: rejection.body_text(),
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::InvalidRequest {
            message: rejection.body_text(),
        })
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidDuration { .. }
            | Error::InvalidCoordinates { .. }
            | Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NoActiveTimer | Error::LocationNotFound { .. } => StatusCode::NOT_FOUND,
            Error::AlreadyActive
            | Error::AlreadyPaused
            | Error::NotPaused
            | Error::TimerExpired => StatusCode::CONFLICT,
            Error::Storage(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.0.is_caller_error() {
            warn!("Request rejected: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }

        let body = ErrorResponse {
            status: "error".to_string(),
            kind: self.0.kind().to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError(Error::InvalidDuration { minutes: 0 }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError(Error::NoActiveTimer).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError(Error::AlreadyActive).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError(Error::TimerExpired).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError(Error::InvalidRequest { message: String::new() }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(Error::Storage(StoreError::Poisoned)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
