//! Gateway configuration: bind address, provider endpoint and models, upload limits, history size.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use parlemoi_window::DEFAULT_MAX_EXCHANGES;

/// OpenAI-compatible API root used when no base URL is configured.
pub const OPENAI_DEFAULT_URL: &str = "https://api.openai.com/v1";
/// Chat model when neither `MODEL` nor settings override it.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_SPEECH_MODEL: &str = "tts-1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Largest accepted audio attachment (25 MB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
/// Largest accepted JSON body (10 MB).
pub const DEFAULT_MAX_JSON_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;
/// Requests allowed per client IP in one rate-limit window.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 50;
/// Rate-limit window (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Resolved configuration consumed by the gateway (CLI > env > settings > defaults already applied).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g. `0.0.0.0:3000`).
    #[serde(default = "default_bind")]
    pub bind: String,
    /// OpenAI-compatible API root (e.g. `https://api.openai.com/v1`).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Provider credential; when None, `OPENAI_API_KEY` is read at resolve time.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    /// Per-request timeout applied by the provider HTTP client.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
    /// CORS origins. Empty or `*` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Directory holding audio uploads for the duration of one transcription request.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_max_json_bytes")]
    pub max_json_bytes: usize,
    /// Requests per client IP per window; 0 disables rate limiting.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    /// Exchanges (user + assistant pairs) retained per conversation.
    #[serde(default = "default_history_max_exchanges")]
    pub history_max_exchanges: usize,
}

fn default_bind() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}
fn default_api_base_url() -> String {
    OPENAI_DEFAULT_URL.to_string()
}
fn default_chat_model() -> String {
    DEFAULT_CHAT_MODEL.to_string()
}
fn default_transcription_model() -> String {
    DEFAULT_TRANSCRIPTION_MODEL.to_string()
}
fn default_speech_model() -> String {
    DEFAULT_SPEECH_MODEL.to_string()
}
fn default_provider_timeout_secs() -> u64 {
    DEFAULT_PROVIDER_TIMEOUT_SECS
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}
fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}
fn default_max_json_bytes() -> usize {
    DEFAULT_MAX_JSON_BYTES
}
fn default_rate_limit_max_requests() -> u32 {
    DEFAULT_RATE_LIMIT_MAX_REQUESTS
}
fn default_rate_limit_window_secs() -> u64 {
    DEFAULT_RATE_LIMIT_WINDOW_SECS
}
fn default_history_max_exchanges() -> usize {
    DEFAULT_MAX_EXCHANGES
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_base_url: default_api_base_url(),
            api_key: None,
            chat_model: default_chat_model(),
            transcription_model: default_transcription_model(),
            speech_model: default_speech_model(),
            provider_timeout_secs: default_provider_timeout_secs(),
            allowed_origins: Vec::new(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            max_json_bytes: default_max_json_bytes(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            history_max_exchanges: default_history_max_exchanges(),
        }
    }
}

impl GatewayConfig {
    /// API key from config field, else `OPENAI_API_KEY`. Blank values count as unset.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}
