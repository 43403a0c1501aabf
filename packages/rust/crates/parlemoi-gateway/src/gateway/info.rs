//! Static endpoints: service index, health, prompt version, frequency catalog, feedback.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::error::ApiError;
use super::state::GatewayState;
use super::timestamp_now;
use crate::persona::{PROMPT_UPDATED_AT, PROMPT_VERSION};

pub const SERVICE_NAME: &str = "Parle-moi API";
pub const SERVICE_VERSION: &str = "2.0.0";

/// One entry of the ambient-sound catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Frequency {
    pub id: &'static str,
    pub name: &'static str,
    pub file: &'static str,
}

pub const FREQUENCIES: [Frequency; 6] = [
    Frequency {
        id: "432hz",
        name: "432 Hz - Harmonie naturelle",
        file: "432hz.wav",
    },
    Frequency {
        id: "528hz",
        name: "528 Hz - Transformation",
        file: "528hz.wav",
    },
    Frequency {
        id: "639hz",
        name: "639 Hz - Relations",
        file: "639hz.wav",
    },
    Frequency {
        id: "741hz",
        name: "741 Hz - Expression",
        file: "741hz.wav",
    },
    Frequency {
        id: "963hz",
        name: "963 Hz - Éveil",
        file: "963hz.wav",
    },
    Frequency {
        id: "crystal",
        name: "Cristal - Pureté",
        file: "crystal.wav",
    },
];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    /// Conversations held in memory.
    pub conversations: usize,
}

/// Request body for POST /feedback. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub mood: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub anonymous: Option<bool>,
}

pub(super) async fn handle_index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
        "endpoints": {
            "chat": "POST /chat",
            "stt": "POST /stt",
            "tts": "POST /tts",
            "frequencies": "GET /frequencies",
            "feedback": "POST /feedback",
            "prompts_version": "GET /prompts/version",
            "health": "GET /health",
        },
    }))
}

pub(super) async fn handle_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
        timestamp: timestamp_now(),
        conversations: state.conversations.conversation_count().await,
    })
}

pub(super) async fn handle_prompt_version(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "version": PROMPT_VERSION,
        "model": state.options.chat_model,
        "updated_at": PROMPT_UPDATED_AT,
    }))
}

pub(super) async fn handle_frequencies() -> Json<Value> {
    Json(json!({ "frequencies": FREQUENCIES }))
}

pub(super) async fn handle_feedback(
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(feedback) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    tracing::info!(
        event = "gateway.feedback.received",
        mood = ?feedback.mood,
        notes_chars = feedback.notes.as_deref().map_or(0, |n| n.chars().count()),
        anonymous = feedback.anonymous.unwrap_or(true),
        "feedback received"
    );
    Ok(Json(json!({
        "success": true,
        "message": "Merci pour votre retour",
    })))
}
