//! The credential-forwarding proxy.
//!
//! Browsers and thin clients cannot call the Gemini API directly without
//! exposing CORS and key-handling problems, so analysis requests go through
//! this small owned endpoint: `POST /api/gemini` with
//! `{"apiKey", "model", "prompt"}`. The proxy forwards the prompt upstream,
//! classifies provider failures into stable status codes, and wraps the
//! provider's envelope as `{"response": ...}`.
//!
//! The key exists here only inside the request being forwarded. It is never
//! stored and never logged; log lines mention the model, not the URL (the
//! upstream URL carries the key as a query parameter).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Default upstream API base.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Shared state for the proxy router.
#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream_base: String,
}

impl Default for ProxyState {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_base: GEMINI_API_BASE.to_string(),
        }
    }
}

impl ProxyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the proxy at a different upstream base URL.
    pub fn with_upstream(mut self, base: impl Into<String>) -> Self {
        self.upstream_base = base.into();
        self
    }
}

/// Errors the proxy reports to its clients, as `{"error": "..."}` bodies.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing required fields: apiKey, model, or prompt")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    BadBody(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API quota exceeded")]
    QuotaExceeded,

    #[error("Error calling Gemini API: {0}")]
    Upstream(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingFields | ProxyError::BadBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ProxyError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    prompt: String,
}

/// Build the proxy router.
///
/// CORS is wide open: the proxy carries no credentials of its own and every
/// request brings the caller's key with it.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(
            "/api/gemini",
            post(generate).fallback(method_not_allowed),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

async fn generate(
    State(state): State<ProxyState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Json(request) = payload.map_err(|e| ProxyError::BadBody(e.body_text()))?;

    if request.api_key.is_empty() || request.model.is_empty() || request.prompt.is_empty() {
        return Err(ProxyError::MissingFields);
    }

    info!("Forwarding prompt to model {}", request.model);
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        state.upstream_base, request.model, request.api_key
    );
    let body = json!({
        "contents": [{ "parts": [{ "text": request.prompt }] }]
    });

    let response = state
        .client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProxyError::Upstream(e.to_string()))?;

    if !status.is_success() {
        warn!("Upstream answered {} for model {}", status, request.model);
        return Err(classify_upstream_failure(status, &text));
    }

    let envelope: Value =
        serde_json::from_str(&text).map_err(|e| ProxyError::Upstream(e.to_string()))?;
    Ok(Json(json!({ "response": envelope })))
}

/// Map an upstream failure onto the statuses clients are written against.
fn classify_upstream_failure(status: StatusCode, body: &str) -> ProxyError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    if message.contains("API_KEY_INVALID") || message.contains("API key not valid") {
        return ProxyError::InvalidApiKey;
    }
    if status == StatusCode::TOO_MANY_REQUESTS
        || message.contains("Quota exceeded")
        || message.contains("RESOURCE_EXHAUSTED")
    {
        return ProxyError::QuotaExceeded;
    }
    ProxyError::Upstream(message)
}

/// Bind and serve the proxy until the task is cancelled.
pub async fn serve(addr: SocketAddr, state: ProxyState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Proxy listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/gemini")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let app = router(ProxyState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/gemini")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn empty_fields_are_rejected() {
        let app = router(ProxyState::new());
        let response = app.oneshot(post_json("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Missing required fields: apiKey, model, or prompt"
        );
    }

    #[tokio::test]
    async fn partial_fields_are_rejected() {
        let app = router(ProxyState::new());
        let response = app
            .oneshot(post_json(r#"{"apiKey":"k","model":"m"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = router(ProxyState::new());
        let response = app.oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        let state = ProxyState::new().with_upstream("http://127.0.0.1:1");
        let app = router(state);
        let response = app
            .oneshot(post_json(r#"{"apiKey":"k","model":"m","prompt":"hola"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Error calling Gemini API:"));
    }

    #[test]
    fn upstream_failures_are_classified() {
        let err = classify_upstream_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert!(matches!(err, ProxyError::InvalidApiKey));

        let err = classify_upstream_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Quota exceeded for requests"}}"#,
        );
        assert!(matches!(err, ProxyError::QuotaExceeded));

        let err = classify_upstream_failure(StatusCode::BAD_GATEWAY, "upstream exploded");
        match err {
            ProxyError::Upstream(msg) => assert_eq!(msg, "upstream exploded"),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
