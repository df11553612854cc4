//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{
    control::Operation,
    error::TimerError,
    state::{AppState, TimerMode},
};
use super::responses::{
    ApiError, ApiResponse, DurationRequest, HealthResponse, StartRequest, StatusResponse, TimerView,
    TurboRequest,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

async fn dispatch(state: &AppState, name: &str, operation: Operation) -> ApiResult<ApiResponse> {
    let timer = state.find(name)?;
    let snapshot = state.dispatch(operation, timer).await?;
    Ok(Json(ApiResponse::ok(
        format!("{:?} on {}: now {:?}", operation, name, snapshot.state),
        vec![snapshot],
    )))
}

/// Handle POST /timers/:name/start - Start a timer (manual unless a mode is given)
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<StartRequest>>,
) -> ApiResult<ApiResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    info!("Start endpoint called for {} in {:?} mode", name, request.mode);
    dispatch(&state, &name, Operation::Start(request.mode)).await
}

/// Handle POST /timers/:name/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<ApiResponse> {
    dispatch(&state, &name, Operation::Pause).await
}

/// Handle POST /timers/:name/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<ApiResponse> {
    dispatch(&state, &name, Operation::Resume).await
}

/// Handle POST /timers/:name/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<ApiResponse> {
    dispatch(&state, &name, Operation::Reset).await
}

/// Handle POST /timers/:name/tap - Pause, resume or start depending on state
pub async fn tap_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<ApiResponse> {
    let snapshot = state.tap(&name).await?;
    Ok(Json(ApiResponse::ok(format!("{} tapped", name), vec![snapshot])))
}

/// Handle POST /timers/:name/duration - Set the custom timer's duration
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<DurationRequest>,
) -> ApiResult<ApiResponse> {
    if !state.find(&name)?.is_custom() {
        return Err(TimerError::InvalidPrecondition(format!("{} is not the custom timer", name)).into());
    }

    let snapshot = state.set_custom_duration(&request.value).await.map_err(|e| {
        warn!("Rejected custom duration {:?}: {}", request.value, e);
        e
    })?;
    Ok(Json(ApiResponse::ok(
        format!("{} set to {}s", name, snapshot.custom_duration),
        vec![snapshot],
    )))
}

/// Handle POST /turbo - Enable or disable turbo durations
pub async fn turbo_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TurboRequest>,
) -> ApiResult<ApiResponse> {
    state.toggle_turbo(request.enabled).await?;
    Ok(Json(ApiResponse::ok(
        format!("Turbo {}", if request.enabled { "enabled" } else { "disabled" }),
        state.snapshots(),
    )))
}

/// Handle POST /auto - Start every timer in auto mode
pub async fn auto_all_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timers = state.dispatch_all(Operation::Start(TimerMode::Auto)).await;
    Json(ApiResponse::ok("All timers started in auto mode".to_string(), timers))
}

/// Handle POST /stop - Pause every timer
pub async fn stop_all_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timers = state.dispatch_all(Operation::Pause).await;
    Json(ApiResponse::ok("All timers paused".to_string(), timers))
}

/// Handle POST /start - Resume every paused timer
pub async fn start_all_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timers = state.dispatch_all(Operation::Resume).await;
    Json(ApiResponse::ok("All timers resumed".to_string(), timers))
}

/// Handle POST /reset - Reset every timer
pub async fn reset_all_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timers = state.dispatch_all(Operation::Reset).await;
    Json(ApiResponse::ok("All timers reset".to_string(), timers))
}

/// Handle GET /timers - Snapshot every timer in configuration order
pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<Vec<TimerView>> {
    Json(state.snapshots().into_iter().map(TimerView::from).collect())
}

/// Handle GET /timers/:name
pub async fn timer_handler(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult<TimerView> {
    Ok(Json(state.snapshot(&name)?.into()))
}

/// Handle GET /status - Return current status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timers: state.snapshots().into_iter().map(TimerView::from).collect(),
        turbo: state.turbo_enabled(),
        control: state.control_summary(),
        active_count: state.registry().len(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream refresh, alert and turbo events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), rx)),
                    Err(e) => warn!("Failed to encode timer event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => debug!("Event stream lagged, skipped {}", skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
