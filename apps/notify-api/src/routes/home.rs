use std::path::Path;

use axum::routing::get_service;
use axum::Router;
use tower_http::services::ServeFile;

use crate::AppState;

/// Serve the single home page at `/`.
pub fn router(index: &Path) -> Router<AppState> {
    Router::new().route("/", get_service(ServeFile::new(index)))
}
