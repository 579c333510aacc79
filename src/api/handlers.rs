//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::{
    geo::Coordinates,
    error::Error,
    state::{
        AppState, DirectionsReport, DistanceReport, NewLocation, ParkingLocation, Settings,
        SettingsPatch,
    },
    utils::format::{format_uptime, Preset, PRESETS},
};
use super::responses::{ApiError, HealthResponse, ResetResponse, TimerResponse};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct StartTimerRequest {
    pub minutes: i64,
}

#[derive(Debug, Deserialize)]
pub struct PositionQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Optional starting point for directions; both or neither
#[derive(Debug, Deserialize)]
pub struct OriginQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl OriginQuery {
    fn coordinates(&self) -> Result<Option<Coordinates>, Error> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(Error::InvalidRequest {
                message: "lat and lon must be given together".to_string(),
            }),
        }
    }
}

/// Handle GET /timer - Current timer state
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    let snapshot = state.timer_snapshot().await;
    Json(TimerResponse::new("Current parking timer", snapshot))
}

/// Handle GET /timer/presets - Quick-start durations
pub async fn presets_handler() -> Json<Vec<Preset>> {
    Json(PRESETS.to_vec())
}

/// Handle POST /timer/start - Start a new countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartTimerRequest>, JsonRejection>,
) -> ApiResult<TimerResponse> {
    let Json(request) = payload?;
    let snapshot = state.start_timer(request.minutes).await?;
    let title = snapshot
        .timer
        .as_ref()
        .map(|t| t.title.clone())
        .unwrap_or_default();
    info!("Timer start endpoint called - {}", title);
    Ok(Json(TimerResponse::new(format!("Timer started: {}", title), snapshot)))
}

/// Handle POST /timer/pause - Pause the running countdown
pub async fn pause_timer_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let snapshot = state.pause_timer().await?;
    info!("Timer pause endpoint called");
    Ok(Json(TimerResponse::new("Timer paused", snapshot)))
}

/// Handle POST /timer/resume - Resume the paused countdown
pub async fn resume_timer_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let snapshot = state.resume_timer().await?;
    info!("Timer resume endpoint called");
    Ok(Json(TimerResponse::new("Timer resumed", snapshot)))
}

/// Handle POST /timer/stop - Cancel the countdown
pub async fn stop_timer_handler(State(state): State<Arc<AppState>>) -> ApiResult<TimerResponse> {
    let snapshot = state.stop_timer().await?;
    info!("Timer stop endpoint called");
    Ok(Json(TimerResponse::new("Timer stopped", snapshot)))
}

/// Handle GET /locations - Parking history, newest first
pub async fn list_locations_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ParkingLocation>> {
    Ok(Json(state.history.list().await?))
}

/// Handle POST /locations - Save where the car is parked
pub async fn save_location_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewLocation>, JsonRejection>,
) -> ApiResult<ParkingLocation> {
    let Json(input) = payload?;
    let location = state.history.save(input).await?;
    state.record_action("location-save");
    Ok(Json(location))
}

/// Handle DELETE /locations - Clear the parking history
pub async fn clear_locations_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ParkingLocation>> {
    state.history.clear().await?;
    state.record_action("history-clear");
    Ok(Json(Vec::new()))
}

/// Handle GET /locations/latest - Where the car is
pub async fn latest_location_handler(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Option<ParkingLocation>> {
    Ok(Json(state.history.latest().await?))
}

/// Handle GET /locations/latest/distance - How far the car is from a position
pub async fn distance_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PositionQuery>, QueryRejection>,
) -> ApiResult<Option<DistanceReport>> {
    let Query(position) = query?;
    let position = Coordinates::new(position.lat, position.lon)?;
    Ok(Json(state.history.distance_from(position).await?))
}

/// Handle GET /locations/latest/directions - Map links to the car
pub async fn directions_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OriginQuery>, QueryRejection>,
) -> ApiResult<Option<DirectionsReport>> {
    let Query(origin) = query?;
    let origin = origin.coordinates()?;
    Ok(Json(state.history.directions_from(origin).await?))
}

/// Handle DELETE /locations/:id - Remove one history entry
pub async fn delete_location_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ParkingLocation> {
    let removed = state.history.delete(&id).await?;
    state.record_action("location-delete");
    Ok(Json(removed))
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> ApiResult<Settings> {
    Ok(Json(state.settings.load().await?))
}

/// Handle PATCH /settings - Update some toggles
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<Settings> {
    let Json(patch) = payload?;
    let settings = state.settings.update(patch).await?;
    state.record_action("settings-update");
    Ok(Json(settings))
}

/// Handle POST /reset - Clear history, timer and settings
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<ResetResponse> {
    let settings = state.reset_all().await?;
    Ok(Json(ResetResponse::ok(settings)))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: format_uptime(state.uptime()),
        host: state.host.clone(),
        port: state.port,
        last_action,
        last_action_time,
    })
}
