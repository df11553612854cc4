//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::TimerError,
    state::{ControlSummary, TimerMode, TimerSnapshot},
};

/// Timer snapshot plus the text a UI should show for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub snapshot: TimerSnapshot,
    pub display: String,
}

impl From<TimerSnapshot> for TimerView {
    fn from(snapshot: TimerSnapshot) -> Self {
        let display = snapshot.display_text();
        Self { snapshot, display }
    }
}

/// API response structure for state change endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timers: Vec<TimerView>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timers: timers.into_iter().map(TimerView::from).collect(),
        }
    }

    /// Create a success response
    pub fn ok(message: String, timers: Vec<TimerSnapshot>) -> Self {
        Self::new("ok".to_string(), message, timers)
    }
}

/// Status response with every timer and the bulk control summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<TimerView>,
    pub turbo: bool,
    pub control: ControlSummary,
    pub active_count: usize,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Start body; the mode defaults to manual like a tap on an inactive timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default = "default_start_mode")]
    pub mode: TimerMode,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self { mode: default_start_mode() }
    }
}

fn default_start_mode() -> TimerMode {
    TimerMode::Manual
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationRequest {
    /// `mm:ss` or a number of seconds
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurboRequest {
    pub enabled: bool,
}

/// Error body returned by failing endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Handler error mapped to an HTTP status
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            TimerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TimerError::InvalidPrecondition(_) => StatusCode::CONFLICT,
            TimerError::UnknownTimer(_) => StatusCode::NOT_FOUND,
            TimerError::Unacknowledged(_) => StatusCode::GATEWAY_TIMEOUT,
            TimerError::InvalidDefinitions(_) | TimerError::Io(_) | TimerError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
