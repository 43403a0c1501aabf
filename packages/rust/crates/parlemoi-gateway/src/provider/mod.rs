//! Provider namespace: the external AI API behind the three proxy endpoints.
//!
//! `Provider` is the seam handlers call through; `OpenAiProvider` is the production
//! implementation over an OpenAI-compatible HTTP API.

mod error;
mod message;
mod openai;

use std::path::Path;

use async_trait::async_trait;

pub use error::ProviderError;
pub use message::ChatMessage;
pub use openai::OpenAiProvider;

use crate::language::TranscriptionLanguage;

/// Sampling parameters for one chat completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Uploaded audio stored on disk for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptionRequest<'a> {
    /// Temp file holding the upload bytes.
    pub audio_path: &'a Path,
    /// Client-side file name; providers use its extension to sniff the format.
    pub file_name: &'a str,
    pub mime_type: Option<&'a str>,
    pub language: TranscriptionLanguage,
}

/// Text-to-speech request with voice already selected.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub input: String,
    pub voice: String,
    pub speed: f32,
}

/// External chat / transcription / synthesis provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Single reply text for an ordered message sequence (system first).
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        sampling: SamplingParams,
    ) -> Result<String, ProviderError>;

    /// Transcript of the stored audio file.
    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<String, ProviderError>;

    /// Encoded audio (MPEG) for the request text.
    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError>;
}
