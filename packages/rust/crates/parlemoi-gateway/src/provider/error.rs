//! Provider failure modes.

use thiserror::Error;

/// Failure of one provider call. Never retried by the gateway.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential configured; raised before any network I/O.
    #[error("provider API key is not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// Connection, TLS, timeout or body-read failure.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status.
    #[error("provider API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded into the expected shape.
    #[error("provider response parse error: {0}")]
    Decode(String),

    /// Completion carried no usable reply text.
    #[error("provider response has no reply text")]
    EmptyCompletion,

    /// Stored upload could not be read back.
    #[error("failed to read stored audio: {0}")]
    Audio(#[from] std::io::Error),
}
