//! Retrieval-augmented question answering over the float vector store.
//!
//! query → embed → nearest profiles → context → oceanographer prompt → backend

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use floatscope_store::{SearchHit, StoreError, VectorStore};

use crate::backend::{LlmBackend, LlmError, LlmRequest};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Question is empty")]
    EmptyQuestion,
    #[error("No response generated")]
    NoResponse,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A profile that was handed to the model as context.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub position: usize,
    pub platform_number: String,
    pub score: f32,
    pub description: String,
}

impl From<&SearchHit> for SourceRef {
    fn from(hit: &SearchHit) -> Self {
        Self {
            position: hit.position,
            platform_number: hit.metadata.platform_number.clone(),
            score: hit.score,
            description: hit.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub model: String,
    pub sources: Vec<SourceRef>,
}

pub struct FloatChatbot {
    store: Arc<VectorStore>,
    embedder: Arc<dyn LlmBackend>,
    llm: Arc<dyn LlmBackend>,
    top_k: usize,
    temperature: f32,
    max_tokens: u32,
}

impl FloatChatbot {
    pub fn new(store: Arc<VectorStore>, embedder: Arc<dyn LlmBackend>, llm: Arc<dyn LlmBackend>) -> Self {
        Self { store, embedder, llm, top_k: 3, temperature: 0.7, max_tokens: 2048 }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    pub fn model_id(&self) -> &str {
        self.llm.model_id()
    }

    /// Nearest profiles to `query` in embedding space.
    pub async fn search_profiles(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ChatError> {
        let mut vectors = self.embedder.embed(vec![query.to_string()]).await?;
        let embedding = vectors
            .pop()
            .ok_or_else(|| LlmError::Unavailable("embedding backend returned no vectors".to_string()))?;
        Ok(self.store.search(&embedding, k)?)
    }

    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            "You are an expert oceanographer, helping to analyze float profile data from the ocean.
Use the following context from relevant float profiles to answer the question.

Context:
{context}

Question: {question}

Remember:
1. Be specific and cite the data from the profiles when relevant
2. Use proper units (°C for temperature, PSU for salinity, meters for depth)
3. If asked about trends or patterns, compare data across profiles
4. If the question cannot be answered with the given context, say so

Answer:"
        )
    }

    pub async fn generate_response(&self, question: &str, context: &str) -> Result<String, ChatError> {
        let req = LlmRequest {
            prompt: Self::build_prompt(question, context),
            model: None,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };
        let started = std::time::Instant::now();
        let resp = self.llm.complete(req).await?;
        tracing::info!(
            model = %resp.model,
            prompt_tokens = resp.prompt_tokens,
            completion_tokens = resp.completion_tokens,
            latency_ms = started.elapsed().as_millis() as u64,
            "LLM response received"
        );

        let answer = resp.content.trim();
        if answer.is_empty() {
            return Err(ChatError::NoResponse);
        }
        Ok(answer.to_string())
    }

    /// Answer a question about the float data.
    pub async fn query(&self, question: &str) -> Result<ChatAnswer, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }

        let hits = self.search_profiles(question, self.top_k).await?;
        tracing::debug!(hits = hits.len(), "Retrieved context profiles");

        let context = hits
            .iter()
            .map(|h| h.description.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = self.generate_response(question, &context).await?;

        Ok(ChatAnswer {
            answer,
            model: self.llm.model_id().to_string(),
            sources: hits.iter().map(SourceRef::from).collect(),
        })
    }
}
