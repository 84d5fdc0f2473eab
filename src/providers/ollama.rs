use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_stream::StreamExt;
use crate::config::HintConfig;
use crate::error::HintError;
use crate::hints::context::ProblemContext;
use crate::hints::level::HintLevel;
use crate::hints::prompts;
use crate::hints::provider::HintProvider;
use crate::perf;

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

/// One line of Ollama's newline-delimited streaming response
#[derive(Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Fold one stream line into `out`. Returns true once the model reports done.
/// Lines that are not JSON are skipped; an `error` line aborts the stream.
pub fn fold_stream_line(line: &str, out: &mut String) -> Result<bool> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(false);
    }
    let chunk = match serde_json::from_str::<OllamaChunk>(line) {
        Ok(chunk) => chunk,
        Err(_) => return Ok(false),
    };
    if let Some(error) = chunk.error {
        anyhow::bail!("Ollama reported an error: {}", error);
    }
    out.push_str(&chunk.response);
    Ok(chunk.done)
}

/// Tidy raw model output into hint text: drops `<think>` reasoning blocks,
/// code fences and smart quotes.
pub fn clean_hint_text(raw: &str) -> String {
    let mut text = raw.to_string();
    while let Some(start) = text.find("<think>") {
        match text[start..].find("</think>") {
            Some(end) => text.replace_range(start..start + end + "</think>".len(), ""),
            // Unterminated reasoning: everything after the tag is reasoning
            None => text.truncate(start),
        }
    }
    text = text.replace("```", "");
    text = text.replace(['\u{201C}', '\u{201D}'], "\"");
    text = text.replace(['\u{2018}', '\u{2019}'], "'");
    text.trim().to_string()
}

/// Hint provider that prompts a local model through Ollama's generate API.
///
/// Unlike the backend provider, this one renders the level prompts itself.
#[derive(Debug, Clone)]
pub struct OllamaHintProvider {
    client: Client,
    url: String,
    model: String,
    timeout: Duration,
}

impl OllamaHintProvider {
    pub fn new(config: &HintConfig) -> Result<Self, HintError> {
        let client = Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| HintError::from(e).with_context("building HTTP client"))?;
        Ok(OllamaHintProvider {
            client,
            url: config.ollama_generate_url(),
            model: config.ollama_model.clone(),
            timeout: config.request_timeout(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn stream_completion(&self, prompt: String) -> Result<String> {
        let request_start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt,
                stream: true,
            })
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama API for model '{}'", self.model))?;
        perf::log_perf_with_context("ollama_connect", request_start.elapsed().as_millis() as u64, &self.model);

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Ollama returned status {} for model '{}'", status.as_u16(), self.model);
        }

        let mut stream = Box::pin(response.bytes_stream());
        let mut pending: Vec<u8> = Vec::new();
        let mut text = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("Failed to read response from model '{}'", self.model))?;
            pending.extend_from_slice(&chunk);
            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if fold_stream_line(&String::from_utf8_lossy(&line), &mut text)? {
                    return Ok(text);
                }
            }
        }
        if !pending.is_empty() {
            fold_stream_line(&String::from_utf8_lossy(&pending), &mut text)?;
        }

        Ok(text)
    }
}

#[async_trait]
impl HintProvider for OllamaHintProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        let _perf = perf::PerfTimer::new("ollama_hint_call");
        let prompt = prompts::combined_prompt(context, level);

        let raw = match timeout(self.timeout, self.stream_completion(prompt)).await {
            Ok(result) => result.map_err(|e| {
                HintError::from(e).with_level(level).with_provider(self.name())
            })?,
            Err(elapsed) => {
                tracing::error!(model = %self.model, duration_secs = self.timeout.as_secs(), "Timeout exceeded");
                return Err(HintError::from(elapsed)
                    .with_level(level)
                    .with_provider(self.name())
                    .with_context(format!("model: {}", self.model)));
            }
        };

        let hint = clean_hint_text(&raw);
        if hint.is_empty() {
            return Err(HintError::provider_unavailable(
                format!("Model '{}' returned empty response", self.model),
                "response",
            )
            .with_level(level)
            .with_provider(self.name()));
        }
        Ok(hint)
    }
}
