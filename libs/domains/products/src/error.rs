use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        ProductError::Persistence(err.to_string())
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match self {
            // Missing products answer with a bare 404.
            ProductError::NotFound(id) => {
                tracing::info!(product_id = id, "Product not found");
                StatusCode::NOT_FOUND.into_response()
            }
            ProductError::Persistence(msg) => AppError::InternalServerError(msg).into_response(),
        }
    }
}
