//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    body::Bytes,
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::state::{AppState, CancelRequest, TimerSnapshot, TimerStatus};
use super::responses::{ApiError, ApiResponse, HealthResponse, SelectionRequest, StatusResponse};

fn internal(context: &str, e: String) -> ApiError {
    error!("{}: {}", context, e);
    ApiError::internal(format!("{}: {}", context, e))
}

fn snapshot(state: &AppState) -> Result<TimerSnapshot, ApiError> {
    state.get_snapshot()
        .map_err(|e| internal("Failed to read timer state", e))
}

/// Handle POST /timer/start - Start the countdown for the selected duration.
///
/// An empty body starts from the stored selection. Anything else must be a
/// valid selection, which is applied first.
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, ApiError> {
    if !body.iter().all(u8::is_ascii_whitespace) {
        let selection: SelectionRequest = serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid start body: {}", e)))?;
        state.set_selection(selection.hours, selection.minutes)?;
    }

    let started = state.start_selected()
        .map_err(|e| internal("Failed to start timer", e))?;
    let timer = snapshot(&state)?;

    if started {
        info!("Start endpoint called - timer running for {} minutes", timer.total_selected_minutes);
        return Ok(Json(ApiResponse::applied("Timer started".to_string(), timer)));
    }

    let message = if timer.session.status != TimerStatus::Idle {
        "A timer is already active"
    } else {
        "Select a duration before starting"
    };
    Ok(Json(ApiResponse::ignored(message.to_string(), timer)))
}

/// Handle POST /timer/cancel - Ask to cancel, confirmation needed while running
pub async fn cancel_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let request = state.request_cancel()
        .map_err(|e| internal("Failed to cancel timer", e))?;
    let timer = snapshot(&state)?;

    let message = match request {
        CancelRequest::AwaitingConfirmation => "Confirm to stop the timer",
        CancelRequest::ResetNow => "Timer reset",
    };
    Ok(Json(ApiResponse::applied(message.to_string(), timer)))
}

/// Handle POST /timer/cancel/confirm - Stop the timer for good
pub async fn confirm_cancel_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let guard = state.cancel_guard()
        .map_err(|e| internal("Failed to read cancel request", e))?
        .ok_or_else(|| ApiError::conflict("No cancel request is pending"))?;

    guard.confirm()
        .map_err(|e| internal("Failed to confirm cancel", e))?;
    info!("Cancel confirmed - timer cleared");

    Ok(Json(ApiResponse::applied("Timer cleared".to_string(), snapshot(&state)?)))
}

/// Handle POST /timer/cancel/abort - Keep the timer running
pub async fn abort_cancel_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let guard = state.cancel_guard()
        .map_err(|e| internal("Failed to read cancel request", e))?
        .ok_or_else(|| ApiError::conflict("No cancel request is pending"))?;

    guard.abort()
        .map_err(|e| internal("Failed to abort cancel", e))?;

    Ok(Json(ApiResponse::applied("Timer keeps running".to_string(), snapshot(&state)?)))
}

/// Handle POST /timer/reset - Stop the alarm and clear everything
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.reset()
        .map_err(|e| internal("Failed to reset timer", e))?;
    info!("Reset endpoint called - timer idle");
    Ok(Json(ApiResponse::applied("Timer reset".to_string(), timer)))
}

/// Handle PUT /selection - Pick hours and minutes
pub async fn set_selection_handler(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<SelectionRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.set_selection(selection.hours, selection.minutes)?;
    Ok(Json(ApiResponse::applied("Duration selected".to_string(), timer)))
}

/// Handle POST /selection/clear - Zero the selected duration
pub async fn clear_selection_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let cleared = state.clear_selection()
        .map_err(|e| internal("Failed to clear selection", e))?;
    let timer = snapshot(&state)?;

    if cleared {
        Ok(Json(ApiResponse::applied("Selection cleared".to_string(), timer)))
    } else {
        Ok(Json(ApiResponse::ignored("Selection is locked while a timer is active".to_string(), timer)))
    }
}

/// Handle POST /selection/hours - Show or hide the hours wheel
pub async fn toggle_hours_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, ApiError> {
    let timer = state.toggle_hours()?;
    let message = if timer.selection.show_hours { "Hours shown" } else { "Hours hidden" };
    Ok(Json(ApiResponse::applied(message.to_string(), timer)))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let timer = snapshot(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream every timer update as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let updates = state.subscribe();

    let events = stream::unfold((updates, true), |(mut updates, first)| async move {
        if !first && updates.changed().await.is_err() {
            return None;
        }

        let snapshot = updates.borrow_and_update().clone();
        let event = Event::default()
            .event("timer")
            .json_data(&snapshot)
            .unwrap_or_else(|e| {
                warn!("Failed to encode timer event: {}", e);
                Event::default().event("error").data(e.to_string())
            });
        Some((Ok(event), (updates, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
