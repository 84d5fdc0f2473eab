use serde::{Serialize, Deserialize};
use std::fmt;
use crate::hints::level::HintLevel;

/// What went wrong, independent of where.
/// Exhaustion is deliberately absent: running out of hints is `Ok(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ErrorKind {
    /// The engine was built without usable problem text
    #[error("invalid construction")]
    InvalidConstruction,
    /// The provider failed or produced no usable hint text
    #[error("provider unavailable")]
    ProviderUnavailable,
    /// Another `next_hint` call on the same engine is still outstanding
    #[error("hint request already in flight")]
    Busy,
    /// The engine was reset while this request was outstanding
    #[error("superseded by reset")]
    Superseded,
    /// Configuration could not be read or parsed
    #[error("configuration error")]
    Config,
}

/// Unified error type for the hint stack.
/// Providers, the engine and config loading all return `Result<T, HintError>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: String,
    pub level: Option<HintLevel>,
    pub provider: Option<String>,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl HintError {
    /// Create a new error with kind, message and stage
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, stage: &'static str) -> Self {
        HintError {
            kind,
            message: message.into(),
            stage: stage.to_string(),
            level: None,
            provider: None,
            context: None,
            source: None,
        }
    }

    pub fn provider_unavailable<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::ProviderUnavailable, message, stage)
    }

    pub fn invalid_construction<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::InvalidConstruction, message, "construct")
    }

    pub fn config<S: Into<String>>(message: S, stage: &'static str) -> Self {
        Self::new(ErrorKind::Config, message, stage)
    }

    /// Attach the hint level the failing request was resolving
    pub fn with_level(mut self, level: HintLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Attach the provider name
    pub fn with_provider<S: Into<String>>(mut self, provider: S) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Only provider failures are worth retrying; the rest are caller errors
    /// or engine-state conflicts.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::ProviderUnavailable
    }
}

impl fmt::Display for HintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.kind, self.message)?;
        if let Some(level) = self.level {
            write!(f, " (level: {})", level)?;
        }
        if let Some(ref provider) = self.provider {
            write!(f, " (provider: {})", provider)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for HintError {}

impl From<anyhow::Error> for HintError {
    fn from(err: anyhow::Error) -> Self {
        HintError::provider_unavailable(format!("{:#}", err), "unknown")
            .with_source("anyhow")
    }
}

impl From<reqwest::Error> for HintError {
    fn from(err: reqwest::Error) -> Self {
        let stage = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_decode() {
            "decode"
        } else {
            "http"
        };
        let mut error = HintError::provider_unavailable(format!("HTTP error: {}", err), stage)
            .with_source("reqwest");
        if let Some(status) = err.status() {
            error = error.with_context(format!("status: {}", status));
        }
        error
    }
}

impl From<serde_json::Error> for HintError {
    fn from(err: serde_json::Error) -> Self {
        HintError::provider_unavailable(format!("JSON error: {}", err), "json_parse")
            .with_source("serde_json")
    }
}

impl From<toml::de::Error> for HintError {
    fn from(err: toml::de::Error) -> Self {
        HintError::config(format!("TOML error: {}", err), "toml_parse")
            .with_source("toml")
    }
}

impl From<tokio::time::error::Elapsed> for HintError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        HintError::provider_unavailable("Operation timed out", "timeout")
            .with_source("tokio::time")
    }
}
