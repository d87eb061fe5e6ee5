use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

/// Generator backed by an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaTextGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaTextGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("building llm http client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest { model: &self.model, prompt, stream: false };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("llm request failed")?
            .error_for_status()
            .context("llm returned an error status")?;

        let payload: GenerateResponse =
            response.json().await.context("llm response was not valid json")?;
        Ok(payload.response)
    }
}

/// Stand-in for a provider that is not configured. Always errors, which
/// routes every writer through the templated fallback.
pub struct UnavailableTextGenerator {
    reason: String,
}

impl UnavailableTextGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl TextGenerator for UnavailableTextGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        anyhow::bail!("text generation unavailable: {}", self.reason)
    }
}
