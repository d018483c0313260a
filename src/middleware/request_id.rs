//! Request ID middleware for request correlation.
//!
//! Propagates an incoming `X-Request-Id` or generates one, runs the request
//! inside a span carrying it, and echoes it back on the response.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Longest incoming request ID that is propagated as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Extension containing the request ID for the current request.
#[derive(Debug, Clone)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the caller's ID when it is printable and reasonably short.
    fn from_header(value: &HeaderValue) -> Option<Self> {
        let id = value.to_str().ok()?.trim();
        (!id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN).then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Middleware that adds a request ID to each request.
///
/// JSON error bodies (`{"error": ...}`) additionally get a top-level
/// `request_id` field for correlation with logs.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(RequestId::from_header)
        .unwrap_or_default();

    req.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let response = next.run(req).instrument(span).await;
    let mut response = inject_request_id_into_error(response, &request_id).await;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Add `request_id` to a JSON error body that has a top-level `error` field.
async fn inject_request_id_into_error(response: Response, request_id: &RequestId) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return (parts, Body::empty()).into_response(),
    };

    let modified = match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(mut json) => match json.as_object_mut() {
            Some(object) if object.contains_key("error") => {
                object.insert(
                    "request_id".to_string(),
                    serde_json::Value::String(request_id.as_str().to_string()),
                );
                serde_json::to_vec(&json).unwrap_or_else(|_| bytes.to_vec())
            }
            _ => bytes.to_vec(),
        },
        Err(_) => bytes.to_vec(),
    };

    // Body length changed
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(modified))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_request_id_generation() {
        assert_ne!(RequestId::new().as_str(), RequestId::new().as_str());
    }

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::from_header(&HeaderValue::from_static("abc-123")).unwrap();
        assert_eq!(id.as_str(), "abc-123");

        assert!(RequestId::from_header(&HeaderValue::from_static("  ")).is_none());
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert!(RequestId::from_header(&HeaderValue::from_str(&long).unwrap()).is_none());
    }

    #[tokio::test]
    async fn test_inject_request_id_into_error_response() {
        let request_id = RequestId("req-1".to_string());
        let response = json_response(
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "Routine not found" }),
        );

        let modified = inject_request_id_into_error(response, &request_id).await;
        assert_eq!(modified.status(), StatusCode::NOT_FOUND);

        let body = body_json(modified).await;
        assert_eq!(body["error"], "Routine not found");
        assert_eq!(body["request_id"], "req-1");
    }

    #[tokio::test]
    async fn test_success_response_untouched() {
        let request_id = RequestId("req-2".to_string());
        let response = json_response(StatusCode::OK, serde_json::json!({ "success": true }));

        let body = body_json(inject_request_id_into_error(response, &request_id).await).await;
        assert!(body.get("request_id").is_none());
    }

    #[tokio::test]
    async fn test_non_error_shaped_json_untouched() {
        let request_id = RequestId("req-3".to_string());
        let response = json_response(StatusCode::BAD_REQUEST, serde_json::json!([1, 2, 3]));

        let body = body_json(inject_request_id_into_error(response, &request_id).await).await;
        assert_eq!(body, serde_json::json!([1, 2, 3]));
    }
}
