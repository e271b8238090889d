//! Error codes carried in every error response body.
//!
//! Each code has a client-facing string form (`"INVALID_JSON"`), an integer
//! for logs and dashboards (`1003`) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::InvalidJson;
//! assert_eq!(code.as_str(), "INVALID_JSON");
//! assert_eq!(code.code(), 1003);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request was rejected before reaching a handler
    BadRequest,

    /// A path segment could not be parsed into the expected type
    InvalidPathParameter,

    /// Request body is not valid JSON or does not match the expected shape
    InvalidJson,

    /// Requested resource or route does not exist
    NotFound,

    /// Request body was not sent as `application/json`
    UnsupportedMediaType,

    // Server errors (1500s)
    /// Unexpected failure; detail is logged, never returned
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidPathParameter => "INVALID_PATH_PARAMETER",
            Self::InvalidJson => "INVALID_JSON",
            Self::NotFound => "NOT_FOUND",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1000,
            Self::InvalidPathParameter => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::UnsupportedMediaType => 1006,
            Self::InternalError => 1500,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::InvalidPathParameter => "Invalid path parameter",
            Self::InvalidJson => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::UnsupportedMediaType => "Expected request with `Content-Type: application/json`",
            Self::InternalError => "Internal server error",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
