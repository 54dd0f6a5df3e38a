//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

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
        .route("/credential/focus", post(focus_credential_handler))
        .route("/credential/blur", post(blur_credential_handler))
        .route("/login", post(login_handler))
        .route("/check-in", post(check_in_handler))
        .route("/check-out", post(check_out_handler))
        .route("/unlock", post(unlock_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/screen", get(screen_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
