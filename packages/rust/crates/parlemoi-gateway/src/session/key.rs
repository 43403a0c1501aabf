//! Conversation identifier as supplied by the caller.

use std::fmt;

/// History bucket for a chat request.
///
/// Identifiers are opaque: any string is accepted, `""` included. Requests that carry no
/// identifier all land in the single `Anonymous` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Anonymous,
    Id(String),
}

impl ConversationKey {
    #[must_use]
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Id(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl From<Option<String>> for ConversationKey {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Anonymous, Self::Id)
    }
}

impl From<&str> for ConversationKey {
    fn from(value: &str) -> Self {
        Self::Id(value.to_string())
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("<anonymous>"),
            Self::Id(id) => write!(f, "{id:?}"),
        }
    }
}
