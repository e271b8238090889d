//! JSON body extractor with structured rejections.

use crate::errors::AppError;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// Drop-in replacement for [`axum::Json`] as an input extractor.
///
/// Syntax errors and type mismatches become `400 INVALID_JSON`, a missing
/// `Content-Type: application/json` becomes `415`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        count: Option<i32>,
    }

    async fn accept(JsonBody(_): JsonBody<Payload>) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    fn app() -> Router {
        Router::new().route("/", post(accept))
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let response = app().oneshot(json_request(r#"{"count":3}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let response = app().oneshot(json_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_bad_request() {
        let response = app()
            .oneshot(json_request(r#"{"count":"three"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_unsupported() {
        let response = app()
            .oneshot(Request::post("/").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
