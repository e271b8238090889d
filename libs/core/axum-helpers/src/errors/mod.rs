pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body returned for every error response that carries one.
///
/// ```json
/// {
///   "code": 1002,
///   "error": "INVALID_PATH_PARAMETER",
///   "message": "Invalid path parameter",
///   "details": { "parameter": "id", "value": "abc" }
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that renders as a JSON error response.
///
/// `InternalServerError` logs its detail and answers with a generic message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Invalid path parameter '{name}': {value}")]
    InvalidPathParameter { name: &'static str, value: String },

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn parts(self) -> (StatusCode, ErrorCode, String, Option<serde_json::Value>) {
        match self {
            AppError::JsonExtractorRejection(rejection) => {
                tracing::info!(
                    error_code = ErrorCode::InvalidJson.code(),
                    "JSON extraction error: {}",
                    rejection.body_text()
                );
                match rejection {
                    JsonRejection::MissingJsonContentType(_) => (
                        StatusCode::UNSUPPORTED_MEDIA_TYPE,
                        ErrorCode::UnsupportedMediaType,
                        ErrorCode::UnsupportedMediaType.default_message().to_string(),
                        None,
                    ),
                    JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => (
                        StatusCode::BAD_REQUEST,
                        ErrorCode::InvalidJson,
                        rejection.body_text(),
                        None,
                    ),
                    other => (
                        other.status(),
                        ErrorCode::BadRequest,
                        other.body_text(),
                        None,
                    ),
                }
            }
            AppError::InvalidPathParameter { name, value } => {
                tracing::info!(
                    error_code = ErrorCode::InvalidPathParameter.code(),
                    parameter = name,
                    %value,
                    "Invalid path parameter"
                );
                (
                    StatusCode::BAD_REQUEST,
                    ErrorCode::InvalidPathParameter,
                    ErrorCode::InvalidPathParameter.default_message().to_string(),
                    Some(serde_json::json!({ "parameter": name, "value": value })),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg, None)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None)
            }
            AppError::InternalServerError(detail) => {
                tracing::error!(
                    error_code = ErrorCode::InternalError.code(),
                    "Internal server error: {}",
                    detail
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();
        error_response(status, code, message, details)
    }
}

fn error_response(
    status: StatusCode,
    error_code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details,
    });

    (status, body).into_response()
}
