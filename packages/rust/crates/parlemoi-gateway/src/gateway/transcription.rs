//! POST /stt: multipart audio upload → transcription provider → text.
//!
//! The upload is checked against the audio allow-list and size limit while it is
//! read, stored in a `NamedTempFile` under the upload dir, and that file is removed
//! on every exit path once the provider call returns.

use std::path::Path;

use anyhow::Context;
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::error::ApiError;
use super::state::GatewayState;
use super::timestamp_now;
use crate::language::{TranscriptionLanguage, resolve_language};
use crate::provider::TranscriptionRequest;

/// Multipart field carrying the audio file.
pub const AUDIO_FIELD: &str = "audio";
pub const LANGUAGE_FIELD: &str = "language";

/// MIME type → file extension for every accepted audio format.
pub const ALLOWED_AUDIO_TYPES: [(&str, &str); 5] = [
    ("audio/mpeg", "mp3"),
    ("audio/mp4", "mp4"),
    ("audio/wav", "wav"),
    ("audio/webm", "webm"),
    ("audio/m4a", "m4a"),
];

const TRANSCRIPTION_FAILED_MESSAGE: &str = "Erreur lors de la transcription";

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
    pub timestamp: String,
}

/// Accepted when either the MIME type or the file-name extension is on the allow-list.
#[must_use]
pub fn is_allowed_audio(mime_type: Option<&str>, file_name: Option<&str>) -> bool {
    let mime_ok = mime_type.is_some_and(|mime| {
        ALLOWED_AUDIO_TYPES
            .iter()
            .any(|(allowed, _)| mime.eq_ignore_ascii_case(allowed))
    });
    mime_ok || file_name.and_then(audio_extension).is_some()
}

/// Allow-listed extension of `file_name`, lowercased.
fn audio_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    ALLOWED_AUDIO_TYPES
        .iter()
        .find(|(_, allowed)| ext.eq_ignore_ascii_case(allowed))
        .map(|(_, allowed)| *allowed)
}

fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    ALLOWED_AUDIO_TYPES
        .iter()
        .find(|(allowed, _)| mime_type.eq_ignore_ascii_case(allowed))
        .map(|(_, ext)| *ext)
}

struct AudioUpload {
    file_name: String,
    mime_type: Option<String>,
    extension: &'static str,
    bytes: Vec<u8>,
}

struct TranscriptionForm {
    audio: Option<AudioUpload>,
    language: Option<String>,
}

fn multipart_error(error: &MultipartError, limit_bytes: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit_bytes }
    } else {
        ApiError::validation(error.body_text())
    }
}

async fn read_audio_field(mut field: Field<'_>, limit_bytes: usize) -> Result<AudioUpload, ApiError> {
    let file_name = field.file_name().map(ToString::to_string);
    let mime_type = field.content_type().map(ToString::to_string);
    if !is_allowed_audio(mime_type.as_deref(), file_name.as_deref()) {
        return Err(ApiError::UnsupportedMedia(
            "Format audio non supporté".to_string(),
        ));
    }
    let extension = file_name
        .as_deref()
        .and_then(audio_extension)
        .or_else(|| mime_type.as_deref().and_then(extension_for_mime))
        .unwrap_or("webm");

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(&e, limit_bytes))?
    {
        if bytes.len() + chunk.len() > limit_bytes {
            return Err(ApiError::PayloadTooLarge { limit_bytes });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(AudioUpload {
        file_name: file_name.unwrap_or_else(|| format!("audio.{extension}")),
        mime_type,
        extension,
        bytes,
    })
}

async fn read_form(mut multipart: Multipart, limit_bytes: usize) -> Result<TranscriptionForm, ApiError> {
    let mut form = TranscriptionForm {
        audio: None,
        language: None,
    };
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, limit_bytes))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some(AUDIO_FIELD) => {
                if form.audio.is_some() {
                    return Err(ApiError::validation("Un seul fichier audio est accepté"));
                }
                form.audio = Some(read_audio_field(field, limit_bytes).await?);
            }
            Some(LANGUAGE_FIELD) => {
                form.language = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(&e, limit_bytes))?,
                );
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Remove the stored upload; a failure here is logged, never surfaced.
fn release(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(error) = temp.close() {
        tracing::warn!(
            event = "gateway.stt.cleanup_failed",
            path = %path.display(),
            error = %error,
            "failed to remove temporary audio file"
        );
    }
}

pub(super) async fn handle_transcription(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let limit_bytes = state.options.max_upload_bytes;
    let multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;
    let form = read_form(multipart, limit_bytes).await?;
    let upload = form
        .audio
        .ok_or_else(|| ApiError::validation("Fichier audio requis"))?;
    let language = resolve_language(form.language.as_deref());

    let temp = tempfile::Builder::new()
        .prefix("stt-")
        .suffix(&format!(".{}", upload.extension))
        .tempfile_in(&state.options.upload_dir)
        .with_context(|| {
            format!(
                "failed to create temporary audio file in {}",
                state.options.upload_dir.display()
            )
        })?;
    tokio::fs::write(temp.path(), &upload.bytes)
        .await
        .context("failed to store audio upload")?;

    let result = state
        .provider
        .transcribe(TranscriptionRequest {
            audio_path: temp.path(),
            file_name: &upload.file_name,
            mime_type: upload.mime_type.as_deref(),
            language: TranscriptionLanguage::from_tag(&language),
        })
        .await;
    release(temp);
    let transcription = result.map_err(|e| ApiError::provider(TRANSCRIPTION_FAILED_MESSAGE, e))?;

    tracing::info!(
        event = "gateway.stt.completed",
        language = %language,
        audio_bytes = upload.bytes.len(),
        transcript_chars = transcription.chars().count(),
        "audio transcribed"
    );
    Ok(Json(TranscriptionResponse {
        transcription,
        timestamp: timestamp_now(),
    }))
}
