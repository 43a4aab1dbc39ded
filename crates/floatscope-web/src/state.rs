//! Shared application state for the web server.

use std::sync::Arc;

use floatscope_config::Config;
use floatscope_llm::{build_embedder, build_generator, FloatChatbot};
use floatscope_store::{FloatCatalog, VectorStore};

/// Shared state injected into every Axum handler.
///
/// Loading never fails as a whole: a missing or malformed store file is
/// recorded in `load_errors` and shown on the dashboard, the same way a
/// remote API failure is shown next to the chat box.
pub struct AppState {
    pub catalog: Option<Arc<FloatCatalog>>,
    pub chatbot: Option<Arc<FloatChatbot>>,
    pub load_errors: Vec<String>,
    pub model: String,
    pub embed_model: String,
}

impl AppState {
    pub fn new(catalog: Option<Arc<FloatCatalog>>, chatbot: Option<Arc<FloatChatbot>>) -> Self {
        let model = chatbot.as_ref().map(|b| b.model_id().to_string()).unwrap_or_default();
        Self { catalog, chatbot, load_errors: Vec::new(), model, embed_model: String::new() }
    }

    /// Load the catalog, then the index and backends on top of it.
    pub fn load(config: &Config) -> Self {
        let dir = &config.store.dir;
        let mut load_errors = Vec::new();

        let catalog = match FloatCatalog::load(dir) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                tracing::error!("Failed to load float catalog: {e}");
                load_errors.push(e.to_string());
                None
            }
        };

        let chatbot = catalog.as_ref().and_then(|catalog| {
            let built = VectorStore::load_with_catalog(dir, catalog.clone())
                .map_err(|e| e.to_string())
                .and_then(|store| {
                    let embedder = build_embedder(config).map_err(|e| e.to_string())?;
                    let llm = build_generator(config).map_err(|e| e.to_string())?;
                    Ok(FloatChatbot::new(Arc::new(store), embedder, llm)
                        .with_top_k(config.store.top_k)
                        .with_generation(config.llm.temperature, config.llm.max_tokens))
                });
            match built {
                Ok(bot) => Some(Arc::new(bot)),
                Err(e) => {
                    tracing::warn!("Chat disabled: {e}");
                    load_errors.push(format!("Chat unavailable: {e}"));
                    None
                }
            }
        });

        Self {
            model: match config.llm.backend {
                floatscope_config::BackendKind::Ollama => config.ollama.model.clone(),
                floatscope_config::BackendKind::Gemini => config.gemini.model.clone(),
            },
            embed_model: config.ollama.embed_model.clone(),
            catalog,
            chatbot,
            load_errors,
        }
    }

    pub fn with_load_error(mut self, error: impl Into<String>) -> Self {
        self.load_errors.push(error.into());
        self
    }
}

pub type SharedState = Arc<AppState>;
