//! Health check.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    let profiles = state.catalog.as_ref().map(|c| c.len()).unwrap_or(0);
    let index_loaded = state.chatbot.is_some();
    let status = if state.catalog.is_some() && index_loaded { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "profiles": profiles,
        "index_loaded": index_loaded,
        "model": state.model,
        "embed_model": state.embed_model,
        "errors": state.load_errors,
    }))
}
