//! Model interaction: drive the candidate fallback chain through the proxy.
//!
//! This module posts the prompt to the proxy endpoint once per candidate
//! model, in order, and returns the first well-formed answer. It is
//! intentionally thin — all prompt engineering lives in [`crate::prompts`]
//! so it can change without touching fallback or error handling here.
//!
//! ## Fallback strategy
//!
//! The chain is a *fallback*, not a retry: each candidate gets exactly one
//! request, there is no backoff delay, and a candidate only starts after the
//! previous one has failed. A transport error, a non-2xx status, and a
//! malformed envelope are all treated the same way — record the error, move
//! on. When the list is exhausted the last error observed is surfaced.

use crate::config::AnalysisConfig;
use crate::error::{AnalyzeError, ModelError};
use crate::output::ModelAttempt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body posted to the proxy endpoint.
#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    #[serde(rename = "apiKey")]
    api_key: &'a str,
    model: &'a str,
    prompt: &'a str,
}

/// Success body returned by the proxy: the provider envelope, wrapped.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    response: Option<GeminiResponse>,
}

/// Error body returned by the proxy on any non-2xx status.
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// The winning candidate's answer, plus the full attempt log.
#[derive(Debug)]
pub struct FallbackAnswer {
    /// Identifier of the model that produced the text.
    pub model: String,
    /// The raw analysis text.
    pub text: String,
    /// Every candidate tried, in order (the last has `error: None`).
    pub attempts: Vec<ModelAttempt>,
}

/// Pull the first candidate's first non-empty text part out of the envelope.
///
/// Returns `None` for anything structurally off — missing candidates, empty
/// parts, blank text — which the caller treats as a candidate failure.
pub(crate) fn first_text(envelope: GeminiResponse) -> Option<String> {
    envelope
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.trim().is_empty())
}

/// Try each candidate model in order until one yields a well-formed answer.
///
/// # Errors
/// [`AnalyzeError::AllModelsFailed`] when every candidate fails, carrying
/// the last error message observed.
pub async fn run_fallback(
    client: &reqwest::Client,
    config: &AnalysisConfig,
    prompt: &str,
) -> Result<FallbackAnswer, AnalyzeError> {
    let total = config.models.len();
    let mut attempts: Vec<ModelAttempt> = Vec::with_capacity(total);
    let mut last_error: Option<ModelError> = None;

    for (index, model) in config.models.iter().enumerate() {
        if let Some(ref cb) = config.progress_callback {
            cb.on_model_attempt(model, index, total);
        }
        debug!("Trying model {} ({}/{})", model, index + 1, total);

        match try_candidate(client, config, model, prompt).await {
            Ok(text) => {
                attempts.push(ModelAttempt {
                    model: model.clone(),
                    error: None,
                });
                return Ok(FallbackAnswer {
                    model: model.clone(),
                    text,
                    attempts,
                });
            }
            Err(err) => {
                warn!("Model {} failed: {}", model, err);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_model_failed(model, &err.to_string());
                }
                attempts.push(ModelAttempt {
                    model: model.clone(),
                    error: Some(err.clone()),
                });
                last_error = Some(err);
            }
        }
    }

    Err(AnalyzeError::AllModelsFailed {
        attempts: total,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Issue one request for one candidate and validate the envelope.
async fn try_candidate(
    client: &reqwest::Client,
    config: &AnalysisConfig,
    model: &str,
    prompt: &str,
) -> Result<String, ModelError> {
    let body = ProxyRequest {
        api_key: &config.api_key,
        model,
        prompt,
    };

    let response = client
        .post(&config.endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|e| ModelError::Transport {
            model: model.to_string(),
            detail: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        // The proxy answers errors as {"error": "..."}; fall back to the
        // bare status line when the body is unreadable.
        let message = response
            .json::<ProxyErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(ModelError::Status {
            model: model.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ProxyEnvelope =
        response
            .json()
            .await
            .map_err(|_| ModelError::MalformedEnvelope {
                model: model.to_string(),
            })?;

    envelope
        .response
        .and_then(first_text)
        .ok_or_else(|| ModelError::MalformedEnvelope {
            model: model.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn well_formed_envelope_yields_text() {
        let env = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"RESUMEN EJECUTIVO\n..."}]}}]}"#,
        );
        assert_eq!(first_text(env).unwrap(), "RESUMEN EJECUTIVO\n...");
    }

    #[test]
    fn first_candidate_and_first_part_win() {
        let env = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"primero"},{"text":"segundo"}]}},
                {"content":{"parts":[{"text":"otro candidato"}]}}
            ]}"#,
        );
        assert_eq!(first_text(env).unwrap(), "primero");
    }

    #[test]
    fn missing_pieces_are_malformed() {
        assert!(first_text(parse(r#"{}"#)).is_none());
        assert!(first_text(parse(r#"{"candidates":[]}"#)).is_none());
        assert!(first_text(parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#)).is_none());
        assert!(first_text(parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#)).is_none());
    }

    #[test]
    fn blank_text_is_malformed() {
        let env = parse(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#);
        assert!(first_text(env).is_none());
    }

    /// A stub proxy on an ephemeral port: candidate "model-a" always fails
    /// with a 500, any other model gets a fixed well-formed envelope.
    async fn spawn_stub_proxy() -> std::net::SocketAddr {
        use axum::response::IntoResponse;
        use axum::{routing::post, Json, Router};

        async fn stub(Json(body): Json<serde_json::Value>) -> axum::response::Response {
            if body["model"] == "model-a" {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Error calling Gemini API: boom"})),
                )
                    .into_response()
            } else {
                Json(serde_json::json!({
                    "response": {
                        "candidates": [
                            {"content": {"parts": [{"text": "análisis listo"}]}}
                        ]
                    }
                }))
                .into_response()
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, Router::new().route("/api/gemini", post(stub)))
                .await
                .unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn failing_candidate_falls_through_to_the_winner() {
        let addr = spawn_stub_proxy().await;
        let config = crate::AnalysisConfig::builder()
            .api_key("k")
            .models(vec!["model-a".into(), "model-b".into()])
            .endpoint(format!("http://{addr}/api/gemini"))
            .build()
            .unwrap();
        let client = reqwest::Client::new();

        let answer = run_fallback(&client, &config, "hola").await.unwrap();
        assert_eq!(answer.model, "model-b");
        assert_eq!(answer.text, "análisis listo");
        assert_eq!(answer.attempts.len(), 2);
        assert_eq!(answer.attempts[0].model, "model-a");
        match answer.attempts[0].error {
            Some(ModelError::Status { status, .. }) => assert_eq!(status, 500),
            ref other => panic!("expected a status error for model-a, got {other:?}"),
        }
        assert!(answer.attempts[1].error.is_none());
    }

    #[tokio::test]
    async fn first_well_formed_candidate_wins_without_trying_the_rest() {
        let addr = spawn_stub_proxy().await;
        let config = crate::AnalysisConfig::builder()
            .api_key("k")
            .models(vec!["model-b".into(), "model-a".into()])
            .endpoint(format!("http://{addr}/api/gemini"))
            .build()
            .unwrap();
        let client = reqwest::Client::new();

        let answer = run_fallback(&client, &config, "hola").await.unwrap();
        assert_eq!(answer.model, "model-b");
        assert_eq!(answer.attempts.len(), 1);
        assert!(answer.attempts[0].error.is_none());
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_error() {
        // An endpoint nothing listens on: every candidate fails on transport.
        let config = crate::AnalysisConfig::builder()
            .api_key("k")
            .models(vec!["model-a".into(), "model-b".into()])
            .endpoint("http://127.0.0.1:1/api/gemini")
            .api_timeout_secs(2)
            .build()
            .unwrap();
        let client = reqwest::Client::new();

        let err = run_fallback(&client, &config, "hola").await.unwrap_err();
        match err {
            AnalyzeError::AllModelsFailed {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("model-b"), "got: {last_error}");
            }
            other => panic!("expected AllModelsFailed, got {other:?}"),
        }
    }
}
