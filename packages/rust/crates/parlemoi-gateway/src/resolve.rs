use std::path::PathBuf;

use parlemoi_gateway::{
    DEFAULT_CHAT_MODEL, DEFAULT_MAX_JSON_BYTES, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT,
    DEFAULT_PROVIDER_TIMEOUT_SECS, DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS,
    DEFAULT_SPEECH_MODEL, DEFAULT_TRANSCRIPTION_MODEL,
    DEFAULT_UPLOAD_DIR, GatewayConfig, OPENAI_DEFAULT_URL, RuntimeSettings,
};

/// CLI values for `serve`; None means "not given on the command line".
pub(crate) struct ServeOverrides {
    pub(crate) bind: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) allowed_origins: Option<String>,
    pub(crate) upload_dir: Option<PathBuf>,
}

pub(crate) fn resolve_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
    default: &str,
) -> String {
    if let Some(value) = cli_value {
        return value;
    }
    if let Some(value) = env_non_empty(env_name) {
        return value;
    }
    if let Some(value) = settings_value {
        return value.to_string();
    }
    default.to_string()
}

pub(crate) fn resolve_optional_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
) -> Option<String> {
    if cli_value.is_some() {
        return cli_value;
    }
    if let Ok(value) = std::env::var(env_name) {
        return Some(value);
    }
    settings_value.map(ToString::to_string)
}

fn resolve_positive<T>(settings_value: Option<T>, default: T) -> T
where
    T: PartialOrd + Default,
{
    match settings_value {
        Some(value) if value > T::default() => value,
        _ => default,
    }
}

fn env_non_empty(env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_port_from_env(env_name: &str) -> Option<u16> {
    let raw = env_non_empty(env_name)?;
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Some(port),
        _ => {
            tracing::warn!(
                env_var = %env_name,
                value = %raw,
                "invalid port in environment; using settings/default"
            );
            None
        }
    }
}

/// Bind address: `--bind` > `--port` > `PORT` > `server.bind` > `server.port` > default port.
fn resolve_bind(cli_bind: Option<String>, cli_port: Option<u16>, settings: &RuntimeSettings) -> String {
    if let Some(bind) = cli_bind {
        return bind;
    }
    if let Some(port) = cli_port.or_else(|| parse_port_from_env("PORT")) {
        return format!("0.0.0.0:{port}");
    }
    if let Some(bind) = settings.server.bind.as_deref() {
        return bind.to_string();
    }
    format!("0.0.0.0:{}", settings.server.port.unwrap_or(DEFAULT_PORT))
}

/// Split a comma-separated origin list; blanks are dropped.
pub(crate) fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Build the gateway config with CLI > env > settings > default precedence per value.
pub(crate) fn resolve_gateway_config(
    overrides: ServeOverrides,
    settings: &RuntimeSettings,
) -> GatewayConfig {
    let server = &settings.server;
    let provider = &settings.provider;
    let allowed_origins = resolve_optional_string(
        overrides.allowed_origins,
        "ALLOWED_ORIGINS",
        server.allowed_origins.as_deref(),
    )
    .map(|raw| parse_origins(&raw))
    .unwrap_or_default();
    let upload_dir = overrides.upload_dir.unwrap_or_else(|| {
        PathBuf::from(server.upload_dir.as_deref().unwrap_or(DEFAULT_UPLOAD_DIR))
    });

    GatewayConfig {
        bind: resolve_bind(overrides.bind, overrides.port, settings),
        api_base_url: resolve_string(
            None,
            "OPENAI_BASE_URL",
            provider.base_url.as_deref(),
            OPENAI_DEFAULT_URL,
        ),
        api_key: env_non_empty("OPENAI_API_KEY"),
        chat_model: resolve_string(None, "MODEL", provider.chat_model.as_deref(), DEFAULT_CHAT_MODEL),
        transcription_model: provider
            .transcription_model
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
        speech_model: provider
            .speech_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
        provider_timeout_secs: resolve_positive(provider.timeout_secs, DEFAULT_PROVIDER_TIMEOUT_SECS),
        allowed_origins,
        upload_dir,
        max_upload_bytes: resolve_positive(server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES),
        max_json_bytes: resolve_positive(server.max_json_bytes, DEFAULT_MAX_JSON_BYTES),
        rate_limit_max_requests: server
            .rate_limit_max_requests
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS),
        rate_limit_window_secs: resolve_positive(
            server.rate_limit_window_secs,
            DEFAULT_RATE_LIMIT_WINDOW_SECS,
        ),
        history_max_exchanges: resolve_positive(
            settings.session.max_exchanges,
            GatewayConfig::default().history_max_exchanges,
        ),
    }
}
