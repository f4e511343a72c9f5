//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_handler))
        .route("/timer/cancel", post(cancel_handler))
        .route("/timer/cancel/confirm", post(confirm_cancel_handler))
        .route("/timer/cancel/abort", post(abort_cancel_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/selection", put(set_selection_handler))
        .route("/selection/clear", post(clear_selection_handler))
        .route("/selection/hours", post(toggle_hours_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
