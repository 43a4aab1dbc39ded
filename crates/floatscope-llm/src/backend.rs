//! LLM backend trait and concrete implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use floatscope_config::{BackendKind, Config};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("{0} environment variable is not set")]
    MissingApiKey(&'static str),
    #[error("API error [{status}]: {message}")]
    ApiError { status: u16, message: String },
}

// ── Request / Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), model: None, max_tokens: None, temperature: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError>;
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, LlmError>;
    fn model_id(&self) -> &str;
    fn is_local(&self) -> bool;
}

/// Shared HTTP client with the configured request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Backend that answers questions, chosen by `llm.backend`.
pub fn build_generator(config: &Config) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let client = http_client(Duration::from_secs(config.llm.timeout_secs))?;
    let backend: Arc<dyn LlmBackend> = match config.llm.backend {
        BackendKind::Ollama => Arc::new(
            OllamaBackend::new(&config.ollama.api, &config.ollama.model, &config.ollama.embed_model)
                .with_client(client),
        ),
        BackendKind::Gemini => {
            if config.gemini.api_key.is_none() {
                tracing::warn!("Gemini selected but GEMINI_API_KEY is not set; chat requests will fail");
            }
            Arc::new(
                GeminiBackend::new(config.gemini.api_key.clone(), &config.gemini.model).with_client(client),
            )
        }
    };
    tracing::info!(model = backend.model_id(), local = backend.is_local(), "LLM backend ready");
    Ok(backend)
}

/// Backend used for query embeddings. Always Ollama: the index was built
/// with its embedding model.
pub fn build_embedder(config: &Config) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let client = http_client(Duration::from_secs(config.llm.timeout_secs))?;
    Ok(Arc::new(
        OllamaBackend::new(&config.ollama.api, &config.ollama.model, &config.ollama.embed_model)
            .with_client(client),
    ))
}

async fn check_response_status(resp: reqwest::Response) -> Result<serde_json::Value, LlmError> {
    let status = resp.status().as_u16();
    let text = resp.text().await?;
    if status >= 400 {
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| {
                body["error"]["message"]
                    .as_str()
                    .or_else(|| body["error"].as_str())
                    .or_else(|| body["message"].as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| if text.is_empty() { "unknown API error".to_string() } else { text });
        return Err(LlmError::ApiError { status, message });
    }
    Ok(serde_json::from_str(&text)?)
}

// ── 1. Ollama ─────────────────────────────────────────────────────────────────

pub struct OllamaBackend {
    /// Generate endpoint, e.g. `http://localhost:11434/api/generate`.
    pub generate_url: String,
    pub base_url: String,
    pub model: String,
    pub embed_model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(
        generate_url: impl Into<String>,
        model: impl Into<String>,
        embed_model: impl Into<String>,
    ) -> Self {
        let generate_url = generate_url.into();
        let trimmed = generate_url.trim_end_matches('/');
        let base_url = trimmed.strip_suffix("/api/generate").unwrap_or(trimmed).to_string();
        Self {
            generate_url,
            base_url,
            model: model.into(),
            embed_model: embed_model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let model = req.model.as_deref().unwrap_or(&self.model);
        let body = serde_json::json!({
            "model":  model,
            "prompt": req.prompt,
            "stream": false,
            "options": {
                "temperature": req.temperature.unwrap_or(0.7),
                "num_predict": req.max_tokens.unwrap_or(2048),
            },
        });
        tracing::debug!(url = %self.generate_url, model, "Ollama generate");
        let resp = self.client.post(&self.generate_url).json(&body).send().await?;
        let json = check_response_status(resp).await?;
        Ok(LlmResponse {
            content: json["response"].as_str().unwrap_or("").to_string(),
            model: json["model"].as_str().unwrap_or(model).to_string(),
            prompt_tokens: json["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
            completion_tokens: json["eval_count"].as_u64().unwrap_or(0) as u32,
        })
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, LlmError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let body = serde_json::json!({"model": &self.embed_model, "prompt": text});
            let resp = self.client.post(&url).json(&body).send().await?;
            let json = check_response_status(resp).await?;
            let vec: Vec<f32> = serde_json::from_value(json["embedding"].clone())?;
            if vec.is_empty() {
                return Err(LlmError::Unavailable(format!(
                    "model '{}' returned an empty embedding; is it an embedding model?",
                    self.embed_model
                )));
            }
            out.push(vec);
        }
        Ok(out)
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { true }
}

// ── 2. Google Gemini ──────────────────────────────────────────────────────────

pub struct GeminiBackend {
    pub model: String,
    pub embedding_model: String,
    pub base_url: String,
    api_key: Option<SecretString>,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            embedding_model: "text-embedding-004".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn key(&self) -> Result<&str, LlmError> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret())
            .ok_or(LlmError::MissingApiKey("GEMINI_API_KEY"))
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let key = self.key()?;
        let model = req.model.as_deref().unwrap_or(&self.model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );

        let body = serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
            "generationConfig": {
                "candidateCount":  1,
                "maxOutputTokens": req.max_tokens.unwrap_or(2048),
                "temperature":     req.temperature.unwrap_or(0.7),
            }
        });

        let resp = self.client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let content = json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: model.to_string(),
            prompt_tokens: json["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
            completion_tokens: json["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
        })
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, LlmError> {
        let key = self.key()?;
        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents",
            self.base_url.trim_end_matches('/'),
            self.embedding_model
        );
        let requests: Vec<serde_json::Value> = texts.iter().map(|t| serde_json::json!({
            "model": format!("models/{}", self.embedding_model),
            "content": { "parts": [{ "text": t }] }
        })).collect();

        let resp = self.client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&serde_json::json!({ "requests": requests }))
            .send()
            .await?;
        let json = check_response_status(resp).await?;

        let embeddings = json["embeddings"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|e| serde_json::from_value::<Vec<f32>>(e["values"].clone()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();
        Ok(embeddings)
    }

    fn model_id(&self) -> &str { &self.model }
    fn is_local(&self) -> bool { false }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
