//! Gemini backend against a stand-in `generativelanguage` server on a loopback port.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};

use floatscope_llm::{GeminiBackend, LlmBackend, LlmError, LlmRequest};

const KEY: &str = "test-key";

async fn fake_models(
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(KEY) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}})),
        );
    }

    match call.split_once(':') {
        Some((model, "generateContent")) => {
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
            let max_tokens = &body["generationConfig"]["maxOutputTokens"];
            (
                StatusCode::OK,
                Json(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [
                                {"text": format!("{model} read {} chars", prompt.len())},
                                {"text": format!(", limit {max_tokens}")},
                            ],
                        },
                    }],
                    "usageMetadata": {"promptTokenCount": 11, "candidatesTokenCount": 5},
                })),
            )
        }
        Some((model, "batchEmbedContents")) => {
            let requests = body["requests"].as_array().cloned().unwrap_or_default();
            let embeddings: Vec<Value> = requests
                .iter()
                .map(|r| {
                    assert_eq!(r["model"], format!("models/{model}"));
                    let len = r["content"]["parts"][0]["text"].as_str().unwrap_or_default().len();
                    json!({"values": [len as f32, 1.0]})
                })
                .collect();
            (StatusCode::OK, Json(json!({"embeddings": embeddings})))
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": {"message": format!("unknown call {call}")}}))),
    }
}

async fn spawn_fake_gemini() -> String {
    let app = Router::new().route("/v1beta/models/{call}", post(fake_models));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend(base: &str, key: &str) -> GeminiBackend {
    GeminiBackend::new(Some(SecretString::from(key.to_string())), "gemini-2.0-flash").with_base_url(base)
}

#[tokio::test]
async fn test_generate_joins_candidate_parts() {
    let base = spawn_fake_gemini().await;
    let mut req = LlmRequest::new("How salty?");
    req.max_tokens = Some(64);

    let resp = backend(&base, KEY).complete(req).await.unwrap();
    assert_eq!(resp.content, "gemini-2.0-flash read 10 chars, limit 64");
    assert_eq!(resp.model, "gemini-2.0-flash");
    assert_eq!(resp.prompt_tokens, 11);
    assert_eq!(resp.completion_tokens, 5);
}

#[tokio::test]
async fn test_batch_embed_keeps_input_order() {
    let base = spawn_fake_gemini().await;
    let vectors = backend(&base, KEY)
        .embed(vec!["a".to_string(), "abcd".to_string()])
        .await
        .unwrap();
    assert_eq!(vectors, vec![vec![1.0, 1.0], vec![4.0, 1.0]]);
}

#[tokio::test]
async fn test_rejected_key_surfaces_error_message() {
    let base = spawn_fake_gemini().await;
    let err = backend(&base, "wrong").complete(LlmRequest::new("hi")).await.unwrap_err();
    match err {
        LlmError::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("unexpected error: {other}"),
    }
}
