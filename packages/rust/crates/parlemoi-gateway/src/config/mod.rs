//! Config namespace: resolved gateway config and YAML runtime settings loading.

mod gateway;
mod settings;

pub use gateway::{
    DEFAULT_CHAT_MODEL, DEFAULT_MAX_JSON_BYTES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS,
    DEFAULT_SPEECH_MODEL, DEFAULT_TRANSCRIPTION_MODEL,
    DEFAULT_UPLOAD_DIR, GatewayConfig, OPENAI_DEFAULT_URL,
};
pub use settings::{
    ProviderSettings, RuntimeSettings, ServerSettings, SessionSettings, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
