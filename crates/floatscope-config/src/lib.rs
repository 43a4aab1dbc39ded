//! Configuration loading for Floatscope.
//!
//! Values are layered: built-in defaults, then `floatscope.toml` (or the
//! file named by `FLOATSCOPE_CONFIG`), then a `.env` file in the working
//! directory, then the process environment.

use serde::{Deserialize, Deserializer};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "floatscope.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Invalid TOML in {path}: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue { key: String, value: String, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint.
    #[serde(default = "default_ollama_api")]
    pub api: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    #[serde(default = "default_embed_model")]
    pub embed_model: String,
}

fn default_ollama_api()   -> String { "http://localhost:11434/api/generate".to_string() }
fn default_ollama_model() -> String { "mistral".to_string() }
fn default_embed_model()  -> String { "all-minilm".to_string() }

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api: default_ollama_api(),
            model: default_ollama_model(),
            embed_model: default_embed_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, deserialize_with = "secret_opt")]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_gemini_model() -> String { "gemini-2.0-flash".to_string() }

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: None, model: default_gemini_model() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    Gemini,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "gemini" => Ok(Self::Gemini),
            other => Err(format!("unknown backend '{other}', expected 'ollama' or 'gemini'")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature()  -> f32 { 0.7 }
fn default_max_tokens()   -> u32 { 2048 }
fn default_timeout_secs() -> u64 { 120 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_store_dir() -> PathBuf { PathBuf::from("vector_store") }
fn default_top_k()     -> usize   { 3 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { dir: default_store_dir(), top_k: default_top_k() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:8501".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn secret_opt<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

/// What happened to the optional `.env` file during [`Config::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Unreadable(String),
}

impl EnvFile {
    pub fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => EnvFile::Loaded(path),
            Err(e) if e.not_found() => EnvFile::Missing,
            Err(e) => EnvFile::Unreadable(e.to_string()),
        }
    }

    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            EnvFile::Missing => {}
            EnvFile::Unreadable(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }
    }
}


impl Config {
    /// Load the full layered configuration.
    ///
    /// `explicit` (the `--config` flag) takes precedence over `FLOATSCOPE_CONFIG`;
    /// a named file must exist, the default `floatscope.toml` is optional.
    /// Loading runs before logging is set up, so the `.env` outcome is
    /// returned for the caller to log.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, EnvFile), ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("FLOATSCOPE_CONFIG").map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let env_file = EnvFile::from_result(dotenvy::dotenv());

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok((config, env_file))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
    }

    /// Override values from environment variables, looked up through `get`.
    pub fn apply_env<F>(&mut self, get: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("OLLAMA_API")         { self.ollama.api = v; }
        if let Some(v) = get("OLLAMA_MODEL")       { self.ollama.model = v; }
        if let Some(v) = get("OLLAMA_EMBED_MODEL") { self.ollama.embed_model = v; }
        if let Some(v) = get("VECTOR_STORE_DIR")   { self.store.dir = PathBuf::from(v); }
        if let Some(v) = get("FLOATSCOPE_BIND")    { self.server.bind = v; }
        if let Some(v) = get("GEMINI_MODEL")       { self.gemini.model = v; }
        if let Some(v) = get("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
            self.gemini.api_key = Some(SecretString::from(v));
        }
        if let Some(v) = get("DEBUG") {
            self.debug = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = get("LLM_BACKEND") {
            self.llm.backend = v.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "LLM_BACKEND".to_string(),
                value: v.clone(),
                reason,
            })?;
        }
        if let Some(v) = get("LLM_TEMPERATURE")      { self.llm.temperature = parse_key("LLM_TEMPERATURE", &v)?; }
        if let Some(v) = get("LLM_MAX_TOKENS")       { self.llm.max_tokens = parse_key("LLM_MAX_TOKENS", &v)?; }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") { self.llm.timeout_secs = parse_key("REQUEST_TIMEOUT_SECS", &v)?; }
        if let Some(v) = get("SEARCH_TOP_K")         { self.store.top_k = parse_key("SEARCH_TOP_K", &v)?; }

        if self.store.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SEARCH_TOP_K".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_key<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
