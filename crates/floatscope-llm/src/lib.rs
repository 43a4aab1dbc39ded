//! floatscope-llm: language-model backends and the retrieval-augmented chatbot.
//!
//! Backends:
//!   OllamaBackend: local or remote Ollama (`/api/generate`, `/api/embeddings`)
//!   GeminiBackend: Google Gemini (`generateContent`, `batchEmbedContents`)
//!
//! Query embeddings always come from Ollama's embedding model so they live
//! in the same space as the pre-built index; answers come from whichever
//! backend `LLM_BACKEND` selects.

pub mod backend;
pub mod chatbot;

pub use backend::{
    build_embedder, build_generator, http_client, GeminiBackend, LlmBackend, LlmError, LlmRequest,
    LlmResponse, OllamaBackend,
};
pub use chatbot::{ChatAnswer, ChatError, FloatChatbot, SourceRef};
