//! HTTP API module
//! 
//! This module contains the HTTP control surface a UI uses to drive the timers.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_handler))
        .route("/timers/:name", get(timer_handler))
        .route("/timers/:name/start", post(start_handler))
        .route("/timers/:name/pause", post(pause_handler))
        .route("/timers/:name/resume", post(resume_handler))
        .route("/timers/:name/reset", post(reset_handler))
        .route("/timers/:name/tap", post(tap_handler))
        .route("/timers/:name/duration", post(duration_handler))
        .route("/turbo", post(turbo_handler))
        // Bulk controls
        .route("/auto", post(auto_all_handler))
        .route("/stop", post(stop_all_handler))
        .route("/start", post(start_all_handler))
        .route("/reset", post(reset_all_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
