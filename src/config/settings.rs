use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use lazy_static::lazy_static;
use crate::error::HintError;

/// Environment variable pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "HINTSTEP_CONFIG";
/// Environment variable overriding `backend_url`
pub const API_URL_ENV: &str = "HINT_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Base URL of the hint backend
    pub backend_url: String,
    /// Path of the hint-generation endpoint on the backend
    pub hint_path: String,
    /// Upper bound for a single provider call
    pub request_timeout_secs: u64,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Extra attempts made by the resilient provider after the first failure
    pub max_retries: u32,
    /// Consecutive failures before the circuit opens
    pub breaker_threshold: u64,
    /// Seconds an open circuit waits before letting a call through
    pub breaker_cooldown_secs: u64,
}

impl Default for HintConfig {
    fn default() -> Self {
        HintConfig {
            backend_url: "http://localhost:3000".to_string(),
            hint_path: "/api/openai/generate-hint".to_string(),
            request_timeout_secs: 30,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "qwen2.5:7b-instruct".to_string(),
            max_retries: 2,
            breaker_threshold: 3,
            breaker_cooldown_secs: 30,
        }
    }
}

impl HintConfig {
    /// Parse a TOML config file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, HintError> {
        let content = fs::read_to_string(path)
            .map_err(|e| HintError::config(
                format!("Failed to read config file: {}", e),
                "io"
            ).with_context(format!("path: {:?}", path)))?;
        let config: HintConfig = toml::from_str(&content)
            .map_err(|e| HintError::from(e).with_context(format!("path: {:?}", path)))?;
        Ok(config)
    }

    /// Apply the `HINT_API_URL` override, if set and non-empty
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }

    /// Full URL of the hint endpoint
    pub fn hint_url(&self) -> String {
        join_url(&self.backend_url, &self.hint_path)
    }

    pub fn ollama_generate_url(&self) -> String {
        join_url(&self.ollama_url, "/api/generate")
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn get_config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }

    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/hintstep");
            dir.push("hints.toml");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("hintstep");
            dir.push("hints.toml");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".config/hintstep");
            dir.push("hints.toml");
            return dir;
        }
    }

    // Fallback
    PathBuf::from("hints.toml")
}

/// Load from `path`, or from the platform location when `None`.
/// A missing file yields defaults; an unreadable or invalid one is an error.
pub fn load_config(path: Option<&Path>) -> Result<HintConfig, HintError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

    let config = if config_path.exists() {
        let config = HintConfig::load_from(&config_path)?;
        tracing::info!(path = ?config_path, "Loaded hint config");
        config
    } else {
        tracing::info!(path = ?config_path, "No config file, using defaults");
        HintConfig::default()
    };

    Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
}

fn load_config_internal() -> HintConfig {
    match load_config(None) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load hint config, using defaults");
            HintConfig::default().with_api_url_override(std::env::var(API_URL_ENV).ok())
        }
    }
}

lazy_static! {
    static ref HINT_CONFIG: HintConfig = load_config_internal();
}

/// Get the process-wide configuration (loaded once, on first use)
pub fn get_config() -> &'static HintConfig {
    &HINT_CONFIG
}
