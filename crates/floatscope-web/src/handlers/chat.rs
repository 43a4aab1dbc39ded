//! Chat and similarity-search endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;

use floatscope_llm::{ChatAnswer, FloatChatbot, SourceRef};

use crate::error::ApiError;
use crate::state::SharedState;

/// Upper bound on `k` for `/api/search`.
const MAX_SEARCH_K: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub k: Option<usize>,
}

fn chatbot(state: &SharedState) -> Result<&Arc<FloatChatbot>, ApiError> {
    state.chatbot.as_ref().ok_or_else(|| {
        let reason = state
            .load_errors
            .last()
            .cloned()
            .unwrap_or_else(|| "Chat is not available".to_string());
        ApiError::Unavailable(reason)
    })
}

pub async fn chat(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let Json(req) = payload?;
    let bot = chatbot(&state)?;
    tracing::info!(question_len = req.question.len(), "Chat question received");
    let answer = bot.query(&req.question).await?;
    Ok(Json(answer))
}

pub async fn search(
    State(state): State<SharedState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SourceRef>>, ApiError> {
    let Query(query) = query?;
    let bot = chatbot(&state)?;
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Query is empty".to_string()));
    }
    let k = query.k.unwrap_or(3).clamp(1, MAX_SEARCH_K);
    let hits = bot.search_profiles(q, k).await?;
    Ok(Json(hits.iter().map(SourceRef::from).collect()))
}
