//! OpenAI-compatible provider: chat completions, audio transcriptions, audio speech.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{
    ChatMessage, Provider, ProviderError, SamplingParams, SpeechRequest, TranscriptionRequest,
};
use crate::config::GatewayConfig;

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

/// Response: choices[0].message.content.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    speed: f32,
}

/// HTTP client for an OpenAI-compatible API root (e.g. `https://api.openai.com/v1`).
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    chat_model: String,
    transcription_model: String,
    speech_model: String,
}

impl OpenAiProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        let defaults = GatewayConfig::default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: defaults.chat_model,
            transcription_model: defaults.transcription_model,
            speech_model: defaults.speech_model,
        }
    }

    /// Provider wired from resolved gateway config (base URL, key, models, timeout).
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            &config.api_base_url,
            config.resolve_api_key(),
            config.provider_timeout_secs,
        )
        .with_models(
            &config.chat_model,
            &config.transcription_model,
            &config.speech_model,
        )
    }

    #[must_use]
    pub fn with_models(mut self, chat: &str, transcription: &str, speech: &str) -> Self {
        self.chat_model = chat.to_string();
        self.transcription_model = transcription.to_string();
        self.speech_model = speech.to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ProviderError> {
        let key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        Ok(req.bearer_auth(key))
    }

    /// Send and return the success body; non-2xx becomes `ProviderError::Status`.
    async fn send(
        &self,
        operation: &'static str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let started = Instant::now();
        let res = self.authorized(req)?.send().await.inspect_err(|error| {
            tracing::debug!(
                event = "provider.request.failed",
                operation,
                elapsed_ms = started.elapsed().as_millis(),
                error = %error,
                "provider request failed"
            );
        })?;
        let status = res.status();
        tracing::debug!(
            event = "provider.request.completed",
            operation,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            "provider request completed"
        );
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(res)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        sampling: SamplingParams,
    ) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.chat_model,
            messages,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
        };
        let req = self.client.post(self.endpoint("chat/completions")).json(&body);
        let text = self.send("chat", req).await?.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Decode(format!("{e}; body: {text}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ProviderError::EmptyCompletion)
    }

    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<String, ProviderError> {
        // Fail on a missing key before touching the stored upload.
        if self.api_key.is_none() {
            return Err(ProviderError::MissingApiKey);
        }
        let bytes = tokio::fs::read(request.audio_path).await?;
        let mut part = Part::bytes(bytes).file_name(request.file_name.to_string());
        if let Some(mime) = request.mime_type {
            part = part.mime_str(mime)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("language", request.language.as_iso())
            .text("response_format", "text");
        let req = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .multipart(form);
        let text = self.send("transcription", req).await?.text().await?;
        Ok(text.trim_end().to_string())
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<Vec<u8>, ProviderError> {
        let body = SpeechBody {
            model: &self.speech_model,
            voice: &request.voice,
            input: &request.input,
            speed: request.speed,
        };
        let req = self.client.post(self.endpoint("audio/speech")).json(&body);
        let audio = self.send("speech", req).await?.bytes().await?;
        Ok(audio.to_vec())
    }
}
