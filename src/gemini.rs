// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gemini API client for text and vision generation

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::AiConfig;
use crate::{ArchescanError, Result};

/// A generative model that can answer text prompts and image prompts
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier shown to users
    fn model_name(&self) -> &str;

    /// Generate text completion
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Generate with an attached image
    async fn generate_with_image(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String>;
}

/// Gemini REST client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl Part {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), inline_data: None }
    }

    fn image(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: general_purpose::STANDARD.encode(bytes),
            }),
        }
    }
}

impl GenerateResponse {
    /// Joined text of the first candidate
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        // Normalize URL
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build a client from configuration; `None` when no API key is set
    pub fn from_config(config: &AiConfig) -> Result<Option<Self>> {
        match &config.api_key {
            Some(key) => Ok(Some(Self::new(
                &config.url,
                &config.model,
                key,
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(None),
        }
    }

    /// Check that the configured model is reachable with this key
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                ArchescanError::AiUnavailable(format!("Cannot connect to {}: {}", self.base_url, e))
            })?;

        if !response.status().is_success() {
            return Err(ArchescanError::AiUnavailable(format!(
                "Model {} returned status {}",
                self.model,
                response.status()
            )));
        }

        Ok(())
    }

    async fn generate(&self, parts: Vec<Part>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateRequest { contents: vec![Content { parts }] };

        debug!("Sending request to Gemini: model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ArchescanError::AiUnavailable(format!(
                "Gemini returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        result
            .text()
            .ok_or_else(|| ArchescanError::AiUnavailable("Gemini returned no text".to_string()))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.generate(vec![Part::text(prompt)]).await
    }

    async fn generate_with_image(&self, prompt: &str, image: &[u8], mime_type: &str) -> Result<String> {
        debug!("Attaching {} bytes of {}", image.len(), mime_type);
        self.generate(vec![Part::image(image, mime_type), Part::text(prompt)]).await
    }
}
