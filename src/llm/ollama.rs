//! Ollama client
//!
//! Non-streaming `POST /api/generate` against a local or remote Ollama
//! server. The model identity is fixed configuration for the process
//! lifetime.

use super::LanguageModel;
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

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

/// Ollama-backed [`LanguageModel`].
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for the configured endpoint and model.
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/generate", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Model(format!("ollama request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Model(format!(
                "ollama returned status {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("ollama response decode failed: {e}")))?;

        tracing::debug!(model = %self.model, chars = body.response.len(), "Model completion received");

        Ok(body.response)
    }
}
