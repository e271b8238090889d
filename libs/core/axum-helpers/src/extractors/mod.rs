//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with [`AppError`](crate::errors::AppError) so that
//! malformed requests answer with the same JSON error body as everything else.

pub mod id_path;
pub mod json_body;

pub use id_path::IdPath;
pub use json_body::JsonBody;
