// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Archescan

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Web server settings
    #[serde(default)]
    pub web: WebConfig,

    /// Where records and uploaded files live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generative AI service settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Largest accepted request body for uploads
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_gallery_dir")]
    pub gallery_dir: PathBuf,
    #[serde(default = "default_artifacts_json")]
    pub artifacts_json: PathBuf,
    #[serde(default = "default_videos_json")]
    pub videos_json: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_ai_url")]
    pub url: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    /// Named-artifact prompt; `{name}` is replaced by the artifact name
    #[serde(default = "default_named_prompt")]
    pub named_artifact: String,
    #[serde(default = "default_identify_prompt")]
    pub identify_image: String,
}

// Default value functions
fn default_web_host() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 5000 }
fn default_max_upload_bytes() -> usize { 16 * 1024 * 1024 }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_gallery_dir() -> PathBuf { PathBuf::from("static/team_photos") }
fn default_artifacts_json() -> PathBuf { PathBuf::from("uploads.json") }
fn default_videos_json() -> PathBuf { PathBuf::from("videos.json") }
fn default_ai_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_ai_model() -> String { "gemini-3-flash-preview".to_string() }
fn default_timeout() -> u64 { 60 }

fn default_named_prompt() -> String {
    "Give a short, interesting historical fact about the artifact '{name}', \
     including its location or culture.".to_string()
}

fn default_identify_prompt() -> String {
    "Identify this historical artifact and provide a short, interesting historical fact \
     including its location or culture.".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            gallery_dir: default_gallery_dir(),
            artifacts_json: default_artifacts_json(),
            videos_json: default_videos_json(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            url: default_ai_url(),
            model: default_ai_model(),
            timeout_secs: default_timeout(),
            api_key: None,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            named_artifact: default_named_prompt(),
            identify_image: default_identify_prompt(),
        }
    }
}

impl PromptConfig {
    /// Fill the named-artifact template
    pub fn named_prompt(&self, name: &str) -> String {
        self.named_artifact.replace("{name}", name)
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::ArchescanError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load configuration and apply environment overrides
    pub fn load_with_env(path: &Path) -> crate::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.ai.api_key = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty());

        if let Some(port) = lookup(PORT_ENV) {
            self.web.port = port.trim().parse().map_err(|_| {
                crate::ArchescanError::Config(format!("{} is not a valid port: {}", PORT_ENV, port))
            })?;
        }

        Ok(())
    }

    /// Whether AI annotation can be attempted
    pub fn ai_enabled(&self) -> bool {
        self.ai.api_key.is_some()
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.storage.artifacts_json, PathBuf::from("uploads.json"));
        assert!(!config.ai_enabled());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"web": {"port": 9000}, "ai": {"model": "gemini-pro"}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.ai.model, "gemini-pro");
        assert_eq!(config.ai.timeout_secs, 60);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(crate::ArchescanError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [(API_KEY_ENV, "secret"), (PORT_ENV, "8081")].into();
        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.ai.api_key.as_deref(), Some("secret"));
        assert_eq!(config.web.port, 8081);
        assert!(config.ai_enabled());
    }

    #[test]
    fn test_blank_api_key_disables_ai() {
        let mut config = AppConfig::default();
        config
            .apply_env(|k| (k == API_KEY_ENV).then(|| "  ".to_string()))
            .unwrap();
        assert!(!config.ai_enabled());
    }

    #[test]
    fn test_bad_port_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|k| (k == PORT_ENV).then(|| "http".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_never_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.ai.api_key = Some("secret".into());
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("secret"));
    }

    #[test]
    fn test_named_prompt_template() {
        let prompts = PromptConfig::default();
        let prompt = prompts.named_prompt("Rosetta Stone");
        assert!(prompt.contains("'Rosetta Stone'"));
        assert!(!prompt.contains("{name}"));
    }
}
