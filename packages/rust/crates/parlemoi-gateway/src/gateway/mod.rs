//! Gateway namespace: HTTP router, handlers, and the error boundary.

mod chat;
mod error;
mod http;
mod info;
mod rate_limit;
mod speech;
mod state;
mod transcription;

pub use chat::{
    CHAT_SAMPLING, ChatRequest, ChatResponse, ValidatedChat, assemble_messages,
    validate_chat_request,
};
pub use error::{ApiError, INTERNAL_ERROR_MESSAGE, RATE_LIMITED_MESSAGE};
pub use http::{SECURITY_HEADERS, router, run_http};
pub use info::{FREQUENCIES, Frequency, SERVICE_NAME, SERVICE_VERSION};
pub use rate_limit::{RateDecision, RateLimiter};
pub use speech::{SPEECH_CONTENT_TYPE, SPEECH_SPEED, SpeechRequestBody, validate_speech_request};
pub use state::{GatewayOptions, GatewayState};
pub use transcription::{ALLOWED_AUDIO_TYPES, TranscriptionResponse, is_allowed_audio};

/// RFC 3339 UTC timestamp with millisecond precision (e.g. `2025-10-04T09:30:00.123Z`).
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
