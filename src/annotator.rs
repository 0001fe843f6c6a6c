// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Best-effort AI annotation of artifacts
//!
//! Every failure of the generative model degrades to [`SUMMARY_UNAVAILABLE`];
//! callers always get a summary string back.

use image::GenericImageView;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::gemini::{GeminiClient, GenerativeModel};
use crate::Result;

/// Summary used whenever the model cannot answer
pub const SUMMARY_UNAVAILABLE: &str = "AI summary unavailable.";

/// Name used when no name can be guessed from a summary
pub const UNKNOWN_ARTIFACT: &str = "Unknown Artifact";

/// Longest image side sent to the model
const MAX_IMAGE_SIDE: u32 = 1024;

/// Wraps an optional generative model with fallback behaviour
#[derive(Clone)]
pub struct Annotator {
    model: Option<Arc<dyn GenerativeModel>>,
}

impl Annotator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Annotator that always returns the fallback summary
    pub fn disabled() -> Self {
        Self { model: None }
    }

    /// Build from configuration; disabled when no API key is present
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        match GeminiClient::from_config(config)? {
            Some(client) => {
                info!("AI annotation enabled with model {}", config.model);
                Ok(Self::new(Arc::new(client)))
            }
            None => {
                warn!("GEMINI_API_KEY not set, AI summaries disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_name())
    }

    /// Summarize a text prompt
    pub async fn summarize(&self, prompt: &str) -> String {
        let Some(model) = &self.model else {
            debug!("No AI model configured, using fallback summary");
            return SUMMARY_UNAVAILABLE.to_string();
        };

        match model.generate_text(prompt).await {
            Ok(text) => non_empty_summary(&text),
            Err(e) => {
                warn!("AI summary failed: {}", e);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }

    /// Summarize an image file, returning `(summary, guessed_name)`
    pub async fn summarize_image(&self, path: &Path, instruction: &str) -> (String, String) {
        let summary = match &self.model {
            None => {
                debug!("No AI model configured, using fallback summary");
                SUMMARY_UNAVAILABLE.to_string()
            }
            Some(model) => match prepare_image(path) {
                Ok((bytes, mime_type)) => {
                    match model.generate_with_image(instruction, &bytes, &mime_type).await {
                        Ok(text) => non_empty_summary(&text),
                        Err(e) => {
                            warn!("AI image summary failed for {:?}: {}", path, e);
                            SUMMARY_UNAVAILABLE.to_string()
                        }
                    }
                }
                Err(e) => {
                    warn!("Cannot read image {:?}: {}", path, e);
                    SUMMARY_UNAVAILABLE.to_string()
                }
            },
        };

        let name = guess_name(&summary);
        (summary, name)
    }
}

fn non_empty_summary(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        SUMMARY_UNAVAILABLE.to_string()
    } else {
        text.to_string()
    }
}

/// First line of a summary, or [`UNKNOWN_ARTIFACT`] for fallback/empty summaries
pub fn guess_name(summary: &str) -> String {
    if summary == SUMMARY_UNAVAILABLE {
        return UNKNOWN_ARTIFACT.to_string();
    }

    match summary.lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => line.to_string(),
        _ => UNKNOWN_ARTIFACT.to_string(),
    }
}

/// Read an image for the model, shrinking large ones to JPEG
fn prepare_image(path: &Path) -> Result<(Vec<u8>, String)> {
    let data = std::fs::read(path)?;
    let mime_type = image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string());

    let img = match image::load_from_memory(&data) {
        Ok(img) => img,
        // Not something we can decode; let the model try the raw bytes
        Err(_) => return Ok((data, mime_type)),
    };

    let (width, height) = img.dimensions();
    if width <= MAX_IMAGE_SIDE && height <= MAX_IMAGE_SIDE {
        return Ok((data, mime_type));
    }

    debug!("Resizing {}x{} image {:?}", width, height, path);
    let resized = img.resize(MAX_IMAGE_SIDE, MAX_IMAGE_SIDE, image::imageops::FilterType::Triangle);
    let rgb = image::DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buffer = Vec::new();
    rgb.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Jpeg)?;

    Ok((buffer, "image/jpeg".to_string()))
}
