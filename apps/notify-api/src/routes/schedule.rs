use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::schedule::matcher::MatcherStatus;
use crate::schedule::target::ScheduleTarget;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleRequest {
    /// Time of day to notify at, `HH:MM` 24-hour.
    pub time: ScheduleTarget,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleStatusResponse {
    #[serde(flatten)]
    pub matcher: MatcherStatus,
    /// Currently connected WebSocket clients.
    pub connections: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", post(create_schedule).fallback(method_not_allowed))
        .route("/schedule/status", get(schedule_status))
        .route("/schedule/cancel", post(cancel_schedule))
}

/// Arm the clock matcher with a new target, replacing any pending one.
///
/// The body is decoded by hand so that any decode failure (bad JSON, wrong
/// type, missing field) maps to a plain 400, and no Content-Type is required.
#[utoipa::path(
    post,
    path = "/schedule",
    tag = "Schedule",
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Time scheduled", body = MessageResponse),
        (status = 400, description = "Body is not a valid schedule request", body = String, content_type = "text/plain"),
        (status = 405, description = "Method other than POST", body = String, content_type = "text/plain"),
    ),
)]
pub async fn create_schedule(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ScheduleRequest = serde_json::from_slice(&body).map_err(|err| {
        tracing::debug!(%err, "invalid schedule request body");
        ApiError::bad_request("Invalid JSON")
    })?;

    state.matcher.arm(request.time)?;

    Ok(Json(MessageResponse {
        message: "Time scheduled successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/schedule/status",
    tag = "Schedule",
    responses(
        (status = 200, description = "Pending target and last match", body = ScheduleStatusResponse),
    ),
)]
pub async fn schedule_status(State(state): State<AppState>) -> Json<ScheduleStatusResponse> {
    Json(ScheduleStatusResponse {
        matcher: state.matcher.status(),
        connections: state.connections.len(),
    })
}

#[utoipa::path(
    post,
    path = "/schedule/cancel",
    tag = "Schedule",
    responses(
        (status = 200, description = "Pending target cleared", body = MessageResponse),
    ),
)]
pub async fn cancel_schedule(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.matcher.cancel()?;
    Ok(Json(MessageResponse {
        message: "Schedule cancelled".to_string(),
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Invalid request method")
}
