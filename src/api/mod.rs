//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/presets", get(presets_handler))
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/pause", post(pause_timer_handler))
        .route("/timer/resume", post(resume_timer_handler))
        .route("/timer/stop", post(stop_timer_handler))
        .route(
            "/locations",
            get(list_locations_handler)
                .post(save_location_handler)
                .delete(clear_locations_handler),
        )
        .route("/locations/latest", get(latest_location_handler))
        .route("/locations/latest/distance", get(distance_handler))
        .route("/locations/latest/directions", get(directions_handler))
        .route("/locations/:id", delete(delete_location_handler))
        .route("/settings", get(get_settings_handler).patch(update_settings_handler))
        .route("/reset", post(reset_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
