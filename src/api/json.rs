use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::errors::ApiError;

/// JSON body extractor whose rejections use the `{status, detail}` error shape.
///
/// Malformed bodies and mistyped fields (a string score, a fractional weight)
/// answer 400 instead of axum's plain-text 422.
pub(crate) struct ApiJson<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::extract::FromRequest;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::IntoResponse;
    use serde::de::DeserializeOwned;

    use super::ApiJson;
    use crate::api::errors::ApiError;
    use crate::schemas::grade::GradeSettingsUpdate;
    use crate::schemas::submission::GradeRequest;

    async fn extract<T: DeserializeOwned + Send>(body: &'static str) -> Result<T, ApiError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request");
        ApiJson::<T>::from_request(request, &()).await.map(|ApiJson(value)| value)
    }

    async fn assert_bad_request(err: ApiError, field: &str) {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["status"], 400);
        let detail = json["detail"].as_str().expect("detail");
        assert!(detail.contains(field), "detail: {detail}");
    }

    #[tokio::test]
    async fn string_score_is_a_bad_request() {
        let Err(err) = extract::<GradeRequest>(r#"{"score":"abc"}"#).await else {
            panic!("string score must be rejected");
        };
        assert_bad_request(err, "score").await;
    }

    #[tokio::test]
    async fn fractional_weights_are_a_bad_request() {
        let body = r#"{"quiz_weight":33.5,"assignment_weight":33.5,"exam_weight":33}"#;
        let Err(err) = extract::<GradeSettingsUpdate>(body).await else {
            panic!("fractional weights must be rejected");
        };
        assert_bad_request(err, "quiz_weight").await;
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let Err(err) = extract::<GradeRequest>("{\"score\":").await else {
            panic!("truncated body must be rejected");
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_payload_passes_through() {
        let Ok(request) = extract::<GradeRequest>(r#"{"score":85,"feedback":"Good"}"#).await else {
            panic!("valid payload must be accepted");
        };
        assert_eq!(request.score, 85.0);
        assert_eq!(request.feedback.as_deref(), Some("Good"));
    }
}
