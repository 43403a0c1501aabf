//! Shared state for the HTTP gateway.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::rate_limit::RateLimiter;
use crate::config::GatewayConfig;
use crate::provider::{OpenAiProvider, Provider};
use crate::session::ConversationStore;

/// Request-independent settings the handlers read.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Chat model name reported by `/prompts/version`.
    pub chat_model: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_json_bytes: usize,
    /// Empty or containing `*` means any origin.
    pub allowed_origins: Vec<String>,
    /// Requests per client IP per window; 0 disables rate limiting.
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
}

impl From<&GatewayConfig> for GatewayOptions {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            chat_model: config.chat_model.clone(),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            max_json_bytes: config.max_json_bytes,
            allowed_origins: config.allowed_origins.clone(),
            rate_limit_max_requests: config.rate_limit_max_requests,
            rate_limit_window: Duration::from_secs(config.rate_limit_window_secs),
        }
    }
}

/// Shared state: provider handle + history store + rate limiter + options. Cheap to clone.
#[derive(Clone)]
pub struct GatewayState {
    pub provider: Arc<dyn Provider>,
    pub conversations: ConversationStore,
    pub rate_limiter: RateLimiter,
    pub options: Arc<GatewayOptions>,
}

impl GatewayState {
    pub fn new(provider: Arc<dyn Provider>, conversations: ConversationStore, options: GatewayOptions) -> Self {
        Self {
            provider,
            conversations,
            rate_limiter: RateLimiter::new(options.rate_limit_max_requests, options.rate_limit_window),
            options: Arc::new(options),
        }
    }

    /// Production state: `OpenAiProvider` and an empty store sized from config.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            Arc::new(OpenAiProvider::from_config(config)),
            ConversationStore::new(config.history_max_exchanges),
            GatewayOptions::from(config),
        )
    }
}
