//! Single turn in a conversation window.

use serde::{Deserialize, Serialize};

/// Speaker of a stored turn. The persona instruction is never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message written by the caller.
    User,
    /// Reply produced by the completion provider.
    Assistant,
}

impl Role {
    /// Wire name (`"user"` / `"assistant"`), as used by chat-completion APIs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message exchanged in a conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Turn {
    /// Who said it.
    pub role: Role,
    /// Message or reply text.
    pub content: String,
}

impl Turn {
    /// Build a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
