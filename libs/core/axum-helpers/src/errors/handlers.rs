use axum::{
    http::Uri,
    response::{IntoResponse, Response},
};

use super::AppError;

/// Fallback handler for routes that do not exist.
pub async fn not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::NotFound(format!("No route for {}", uri.path())).into_response()
}
