//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    error::SessionError,
    render::{self, Screen},
    state::{Action, AppState, SessionSnapshot},
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type ActionResult = Result<(StatusCode, Json<ApiResponse>), StatusCode>;

/// Turn the outcome of a session action into a response. Refusals answer
/// 409 with the unchanged session; internal faults answer 500.
fn action_response(
    state: &AppState,
    action: Action,
    message: &str,
    result: Result<SessionSnapshot, SessionError>,
) -> ActionResult {
    match result {
        Ok(session) => {
            info!("{} endpoint called - now {}", action, session.phase);
            Ok((StatusCode::OK, Json(ApiResponse::accepted(message.to_string(), session))))
        }
        Err(e) if e.is_rejection() => match state.snapshot() {
            Ok(session) => Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::rejected(e.to_string(), session)),
            )),
            Err(e) => {
                error!("Failed to read session state: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        },
        Err(e) => {
            error!("Failed to apply {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /credential/focus - Open the keypad and start typing
pub async fn focus_credential_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.focus_credential();
    action_response(&state, Action::FocusCredential, "Keypad opened", result)
}

/// Handle POST /credential/blur - Close the keypad
pub async fn blur_credential_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.blur_credential();
    action_response(&state, Action::BlurCredential, "Keypad closed", result)
}

/// Handle POST /login - Submit the typed credential
pub async fn login_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.submit_credential();
    action_response(&state, Action::SubmitCredential, "Logged in", result)
}

/// Handle POST /check-in - Start the entry face scan
pub async fn check_in_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.request_check_in();
    action_response(&state, Action::CheckIn, "Entry scan started", result)
}

/// Handle POST /check-out - Start the exit face scan
pub async fn check_out_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.request_check_out();
    action_response(&state, Action::CheckOut, "Exit scan started", result)
}

/// Handle POST /unlock - Professor lifts the ban
pub async fn unlock_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.request_professor_unlock();
    action_response(&state, Action::ProfessorUnlock, "Restriction lifted", result)
}

/// Handle POST /reset - Log out and start over
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    let result = state.reset();
    action_response(&state, Action::Reset, "Logged out", result)
}

/// Handle GET /status - Return current session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let session = match state.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get session state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        session,
        student: state.student.clone(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /screen - Render the current screen
pub async fn screen_handler(State(state): State<Arc<AppState>>) -> Result<Json<Screen>, StatusCode> {
    match state.snapshot() {
        Ok(session) => Ok(Json(render::screen(&session, &state.student, &state.config))),
        Err(e) => {
            error!("Failed to get session state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
