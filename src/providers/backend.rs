use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::config::HintConfig;
use crate::error::HintError;
use crate::hints::context::ProblemContext;
use crate::hints::level::HintLevel;
use crate::hints::provider::HintProvider;
use crate::perf;

const PROVIDER_NAME: &str = "backend";

/// Request body of the hint endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HintRequest<'a> {
    problem: &'a str,
    equation: Option<&'a str>,
    substituted_equation: Option<&'a str>,
    variables: &'a [String],
    hint_level: HintLevel,
}

impl<'a> HintRequest<'a> {
    fn new(context: &'a ProblemContext, level: HintLevel) -> Self {
        let equation = context.equation();
        HintRequest {
            problem: context.problem(),
            equation: equation.map(|e| e.equation.as_str()).filter(|s| !s.is_empty()),
            substituted_equation: equation
                .map(|e| e.substituted_equation.as_str())
                .filter(|s| !s.is_empty()),
            variables: equation.map(|e| e.variables.as_slice()).unwrap_or(&[]),
            hint_level: level,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HintReply {
    #[serde(default)]
    hint: Option<String>,
    /// Informational only; backends have sent it as a number or a string
    #[serde(default)]
    level: Option<serde_json::Value>,
}

/// Best-effort reading of the echoed level
fn echoed_level(value: &serde_json::Value) -> Option<u8> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u8::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Hint provider backed by the app's hint-generation endpoint.
///
/// POSTs `{problem, equation, substitutedEquation, variables, hintLevel}`
/// and expects `{hint, level}` back. Anything else is a provider failure.
#[derive(Debug, Clone)]
pub struct BackendHintProvider {
    client: Client,
    url: String,
}

impl BackendHintProvider {
    pub fn new(config: &HintConfig) -> Result<Self, HintError> {
        Self::with_url(config.hint_url(), config.request_timeout())
    }

    pub fn with_url<S: Into<String>>(url: S, timeout: Duration) -> Result<Self, HintError> {
        let client = Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| HintError::from(e).with_context("building HTTP client"))?;
        Ok(BackendHintProvider {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HintProvider for BackendHintProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        let _perf = perf::PerfTimer::new("backend_hint_call");
        let tag = |e: HintError| e.with_level(level).with_provider(PROVIDER_NAME);

        let response = self
            .client
            .post(&self.url)
            .json(&HintRequest::new(context, level))
            .send()
            .await
            .map_err(|e| tag(HintError::from(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(tag(
                HintError::provider_unavailable(
                    format!("Failed to generate hint: {}", status.as_u16()),
                    "http_status",
                )
                .with_context(body.chars().take(200).collect::<String>()),
            ));
        }

        let reply: HintReply = response.json().await.map_err(|e| tag(HintError::from(e)))?;

        let hint = reply
            .hint
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| tag(HintError::provider_unavailable("No hint returned from API", "response")))?;

        if let Some(returned) = reply.level.filter(|v| !v.is_null()) {
            if echoed_level(&returned) != Some(level.as_u8()) {
                tracing::warn!(
                    requested = level.as_u8(),
                    returned = %returned,
                    "Backend answered for a different hint level"
                );
            }
        }

        Ok(hint)
    }
}
