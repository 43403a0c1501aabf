//! Parle-moi gateway: compassionate-listening HTTP API over an external AI provider.
//!
//! - **Chat**: persona prompt + bounded per-conversation history → chat completion.
//! - **Speech-to-text**: multipart audio upload → scoped temp file → transcription.
//! - **Text-to-speech**: text → voice selected by language → MPEG audio.

#![allow(missing_docs)]

mod config;
mod gateway;
mod language;
mod persona;
mod provider;
mod session;
#[doc(hidden)]
pub mod test_support;

pub use config::{
    DEFAULT_CHAT_MODEL, DEFAULT_MAX_JSON_BYTES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS,
    DEFAULT_SPEECH_MODEL, DEFAULT_TRANSCRIPTION_MODEL,
    DEFAULT_UPLOAD_DIR, GatewayConfig, OPENAI_DEFAULT_URL, ProviderSettings, RuntimeSettings,
    ServerSettings, SessionSettings, load_runtime_settings, load_runtime_settings_from_paths,
    runtime_settings_paths, set_config_home_override,
};
pub use gateway::{
    ALLOWED_AUDIO_TYPES, ApiError, CHAT_SAMPLING, ChatRequest, ChatResponse, FREQUENCIES,
    Frequency, GatewayOptions, GatewayState, INTERNAL_ERROR_MESSAGE, RATE_LIMITED_MESSAGE,
    RateDecision, RateLimiter, SECURITY_HEADERS, SERVICE_NAME,
    SERVICE_VERSION, SPEECH_CONTENT_TYPE, SPEECH_SPEED, SpeechRequestBody, TranscriptionResponse,
    ValidatedChat, assemble_messages, is_allowed_audio, router, run_http, validate_chat_request,
    validate_speech_request,
};
pub use language::{
    DEFAULT_VOICE, PRIMARY_LANGUAGE, PRIMARY_VOICE, TranscriptionLanguage, resolve_language,
    select_voice,
};
pub use persona::{PROMPT_UPDATED_AT, PROMPT_VERSION, build_prompt};
pub use provider::{
    ChatMessage, OpenAiProvider, Provider, ProviderError, SamplingParams, SpeechRequest,
    TranscriptionRequest,
};
pub use session::{ConversationGuard, ConversationKey, ConversationStore};
