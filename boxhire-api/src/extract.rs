/// Extractors that report rejections as [`ApiError`]
///
/// axum's own `Json`, `Query` and `Path` answer malformed input with plain
/// text. These wrappers keep the JSON error body and the 400 status used by
/// every other client error.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::post, Router};
    use serde::Deserialize;
    use tower::Service as _;

    #[derive(Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        rating: i32,
    }

    async fn handler(ApiJson(_payload): ApiJson<Payload>) -> StatusCode {
        StatusCode::NO_CONTENT
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let mut app = Router::new().route("/", post(handler));

        let response = app
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"rating\": \"five\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_json_passes() {
        let mut app = Router::new().route("/", post(handler));

        let response = app
            .call(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"rating\": 4}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
