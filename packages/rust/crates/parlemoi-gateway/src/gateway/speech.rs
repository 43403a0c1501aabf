//! POST /tts: text → synthesis provider → MPEG audio body.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::error::ApiError;
use super::state::GatewayState;
use crate::language::{resolve_language, select_voice};
use crate::provider::SpeechRequest;

/// Slightly slower than normal speech for a calmer tone.
pub const SPEECH_SPEED: f32 = 0.95;
pub const SPEECH_CONTENT_TYPE: &str = "audio/mpeg";

const SPEECH_FAILED_MESSAGE: &str = "Erreur lors de la synthèse vocale";

/// Request body for POST /tts.
#[derive(Debug, Default, Deserialize)]
pub struct SpeechRequestBody {
    #[serde(default)]
    pub text: Option<String>,
    /// Requested voice; ignored for the primary language.
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Validate request body and pick the effective voice; fails for missing or blank text.
pub fn validate_speech_request(body: SpeechRequestBody) -> Result<SpeechRequest, ApiError> {
    let input = body
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Texte requis"))?;
    let language = resolve_language(body.language.as_deref());
    Ok(SpeechRequest {
        input,
        voice: select_voice(&language, body.voice.as_deref()),
        speed: SPEECH_SPEED,
    })
}

pub(super) async fn handle_speech(
    State(state): State<GatewayState>,
    payload: Result<Json<SpeechRequestBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let request = validate_speech_request(body)?;
    let voice = request.voice.clone();
    let input_chars = request.input.chars().count();
    let audio = state
        .provider
        .synthesize(request)
        .await
        .map_err(|e| ApiError::provider(SPEECH_FAILED_MESSAGE, e))?;

    tracing::info!(
        event = "gateway.tts.completed",
        voice = %voice,
        input_chars,
        audio_bytes = audio.len(),
        "speech synthesized"
    );
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(SPEECH_CONTENT_TYPE),
            ),
            (header::CONTENT_LENGTH, HeaderValue::from(audio.len())),
        ],
        audio,
    )
        .into_response())
}
