//! POST /chat: persona + history + message → completion provider → reply.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use parlemoi_window::Turn;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::GatewayState;
use super::timestamp_now;
use crate::language::resolve_language;
use crate::persona::build_prompt;
use crate::provider::{ChatMessage, SamplingParams};
use crate::session::ConversationKey;

/// Sampling biased toward varied, empathetic phrasing; replies kept short.
pub const CHAT_SAMPLING: SamplingParams = SamplingParams {
    temperature: 0.8,
    top_p: 1.0,
    max_tokens: 500,
};

const CHAT_FAILED_MESSAGE: &str = "Erreur lors de la génération de la réponse";

/// Request body for POST /chat.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// User message; required, non-blank.
    #[serde(default)]
    pub message: Option<String>,
    /// Opaque history key; absent requests share the anonymous bucket.
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Language tag; defaults to the primary language.
    #[serde(default)]
    pub language: Option<String>,
}

/// Response body for POST /chat.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub timestamp: String,
}

/// Chat request after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChat {
    pub message: String,
    pub conversation: ConversationKey,
    pub language: String,
}

/// Validate request body; fails for a missing or blank message.
/// The message itself is kept verbatim for the provider and the history.
pub fn validate_chat_request(body: ChatRequest) -> Result<ValidatedChat, ApiError> {
    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Message requis"))?;
    Ok(ValidatedChat {
        message,
        conversation: ConversationKey::from(body.conversation_id),
        language: resolve_language(body.language.as_deref()),
    })
}

/// Ordered provider input: persona, stored turns (oldest first), new user message.
#[must_use]
pub fn assemble_messages(language: &str, history: &[Turn], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_prompt(Some(language))));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(message));
    messages
}

pub(super) async fn handle_chat(
    State(state): State<GatewayState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let chat = validate_chat_request(body)?;
    if chat.conversation.is_anonymous() {
        tracing::warn!(
            event = "gateway.chat.anonymous_history",
            "chat request without conversation_id; using the shared anonymous history"
        );
    }

    // Held until write-back so same-key requests cannot lose each other's exchanges.
    let mut conversation = state.conversations.lock(&chat.conversation).await;
    let history = conversation.turns();
    let messages = assemble_messages(&chat.language, &history, &chat.message);
    let reply = state
        .provider
        .complete(messages, CHAT_SAMPLING)
        .await
        .map_err(|e| ApiError::provider(CHAT_FAILED_MESSAGE, e))?;
    conversation.append(Turn::user(chat.message.as_str()), Turn::assistant(reply.as_str()));
    drop(conversation);

    tracing::info!(
        event = "gateway.chat.completed",
        conversation = %chat.conversation,
        language = %chat.language,
        prior_turns = history.len(),
        message_chars = chat.message.chars().count(),
        reply_chars = reply.chars().count(),
        "chat reply generated"
    );
    Ok(Json(ChatResponse {
        response: reply,
        conversation_id: chat.conversation.as_id().map(ToString::to_string),
        timestamp: timestamp_now(),
    }))
}
