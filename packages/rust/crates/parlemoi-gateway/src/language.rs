//! Language tags: defaulting, the two-bucket transcription selector, and voice choice.

/// Primary language of the service; applied whenever a request omits `language`.
pub const PRIMARY_LANGUAGE: &str = "fr";
/// Dedicated voice for the primary language; overrides any requested voice.
pub const PRIMARY_VOICE: &str = "nova";
/// Voice used for other languages when the caller does not pick one.
pub const DEFAULT_VOICE: &str = "alloy";

/// Trimmed language tag, or the primary language when absent or blank.
#[must_use]
pub fn resolve_language(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(PRIMARY_LANGUAGE)
        .to_string()
}

/// Language hint sent to the transcription provider. Only two buckets exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionLanguage {
    French,
    English,
}

impl TranscriptionLanguage {
    /// `"fr"` maps to French; anything else collapses to English.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag == PRIMARY_LANGUAGE {
            Self::French
        } else {
            Self::English
        }
    }

    #[must_use]
    pub fn as_iso(self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::English => "en",
        }
    }
}

/// Effective synthesis voice for a resolved language tag.
#[must_use]
pub fn select_voice(language: &str, requested: Option<&str>) -> String {
    if language == PRIMARY_LANGUAGE {
        return PRIMARY_VOICE.to_string();
    }
    requested
        .map(str::trim)
        .filter(|voice| !voice.is_empty())
        .unwrap_or(DEFAULT_VOICE)
        .to_string()
}
