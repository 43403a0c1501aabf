//! Runtime settings loader for the parlemoi gateway.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/parlemoi/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "parlemoi/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSettings {
    pub bind: Option<String>,
    pub port: Option<u16>,
    /// Comma-separated origins, same format as `ALLOWED_ORIGINS`.
    pub allowed_origins: Option<String>,
    pub upload_dir: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub max_json_bytes: Option<usize>,
    /// Requests per client IP per window; 0 disables rate limiting.
    pub rate_limit_max_requests: Option<u32>,
    pub rate_limit_window_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub transcription_model: Option<String>,
    pub speech_model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    pub max_exchanges: Option<usize>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            server: self.server.merge(overlay.server),
            provider: self.provider.merge(overlay.provider),
            session: self.session.merge(overlay.session),
        }
    }
}

impl ServerSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
            port: overlay.port.or(self.port),
            allowed_origins: overlay.allowed_origins.or(self.allowed_origins),
            upload_dir: overlay.upload_dir.or(self.upload_dir),
            max_upload_bytes: overlay.max_upload_bytes.or(self.max_upload_bytes),
            max_json_bytes: overlay.max_json_bytes.or(self.max_json_bytes),
            rate_limit_max_requests: overlay
                .rate_limit_max_requests
                .or(self.rate_limit_max_requests),
            rate_limit_window_secs: overlay
                .rate_limit_window_secs
                .or(self.rate_limit_window_secs),
        }
    }
}

impl ProviderSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            base_url: overlay.base_url.or(self.base_url),
            chat_model: overlay.chat_model.or(self.chat_model),
            transcription_model: overlay.transcription_model.or(self.transcription_model),
            speech_model: overlay.speech_model.or(self.speech_model),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl SessionSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            max_exchanges: overlay.max_exchanges.or(self.max_exchanges),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    if !path.exists() {
        return RuntimeSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read settings file; ignoring"
            );
            return RuntimeSettings::default();
        }
    };
    match serde_yaml::from_str::<RuntimeSettings>(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse settings yaml; ignoring file"
            );
            RuntimeSettings::default()
        }
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
