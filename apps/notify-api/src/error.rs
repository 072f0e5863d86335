use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Application-level error rendered as a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::METHOD_NOT_ALLOWED,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<crate::schedule::matcher::MatcherStopped> for ApiError {
    fn from(err: crate::schedule::matcher::MatcherStopped) -> Self {
        tracing::error!(%err, "schedule request while matcher is stopped");
        Self::internal("Scheduler unavailable")
    }
}
