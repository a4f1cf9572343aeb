use std::fmt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use muse_core::{Error, InferenceModel, Result};
use crate::Config;

const DEFAULT_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "gemma3:12b";

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

/// A local Ollama server.
pub struct OllamaModel {
    client: Client,
    base_url: Url,
    model_name: String,
}

impl OllamaModel {
    pub fn new(config: &Config) -> Result<Self> {
        let raw = config.model_url.as_deref().unwrap_or(DEFAULT_URL);
        let base_url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            model_name: config.model_name.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("base_url", &self.base_url.as_str())
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OllamaModel {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let endpoint = self
            .base_url
            .join("/api/generate")
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let response = self.client
            .post(endpoint)
            .json(&GenerateRequest {
                model: &self.model_name,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Ollama model '{}' returned {}: {}",
                self.model_name, status, body
            )));
        }
        Ok(response.json::<GenerateResponse>().await?.response)
    }
}
