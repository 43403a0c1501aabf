//! HTTP error boundary: typed handler failures → status code + JSON body.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::provider::ProviderError;

/// Generic message for faults outside the handlers' own error paths.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne du serveur";
pub const RATE_LIMITED_MESSAGE: &str = "Trop de requêtes, veuillez réessayer plus tard.";

/// Handler failure, translated to a response by `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input, detected before any provider call.
    #[error("{0}")]
    Validation(String),

    /// Upload outside the audio allow-list; rejected before storage.
    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("audio upload exceeds {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: usize },
    /// Client exceeded its request budget for the current window.
    #[error("rate limit exceeded; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Provider call failed; `summary` is the user-facing message, `source` the diagnostic.
    #[error("{summary}: {source}")]
    Provider {
        summary: &'static str,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    #[must_use]
    pub fn provider(summary: &'static str, source: ProviderError) -> Self {
        Self::Provider { summary, source }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(message) | Self::UnsupportedMedia(message) => {
                tracing::warn!(
                    event = "gateway.request.rejected",
                    status = status.as_u16(),
                    error = %message,
                    "request rejected"
                );
                json!({ "error": message })
            }
            Self::PayloadTooLarge { .. } => {
                tracing::warn!(
                    event = "gateway.request.rejected",
                    status = status.as_u16(),
                    error = %self,
                    "request rejected"
                );
                json!({ "error": "Fichier audio trop volumineux", "details": self.to_string() })
            }
            Self::RateLimited { .. } => {
                tracing::warn!(
                    event = "gateway.request.rate_limited",
                    status = status.as_u16(),
                    error = %self,
                    "request rejected"
                );
                json!({ "error": RATE_LIMITED_MESSAGE })
            }
            Self::Provider { summary, source } => {
                tracing::error!(
                    event = "gateway.provider.failed",
                    error = %source,
                    "{summary}"
                );
                json!({ "error": summary, "details": source.to_string() })
            }
            Self::Internal(error) => {
                tracing::error!(
                    event = "gateway.internal.failed",
                    error = ?error,
                    "unhandled gateway error"
                );
                json!({ "error": INTERNAL_ERROR_MESSAGE, "message": error.to_string() })
            }
        };
        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
