// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Archescan

use thiserror::Error;

/// Result type alias for Archescan operations
pub type Result<T> = std::result::Result<T, ArchescanError>;

/// Archescan error types
#[derive(Error, Debug)]
pub enum ArchescanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("AI service not available: {0}")]
    AiUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("An artifact name is required")]
    MissingName,

    #[error("No file selected")]
    MissingFile,

    #[error("A video title is required")]
    MissingTitle,

    #[error("A video URL is required")]
    MissingUrl,

    #[error("Unsupported video URL: {0}")]
    UnsupportedVideoUrl(String),

    #[error("Invalid file name: {0}")]
    InvalidFilename(String),
}

impl ArchescanError {
    /// Whether the error was caused by the submitted input rather than the server
    pub fn is_intake_error(&self) -> bool {
        matches!(
            self,
            Self::MissingName
                | Self::MissingFile
                | Self::MissingTitle
                | Self::MissingUrl
                | Self::UnsupportedVideoUrl(_)
                | Self::InvalidFilename(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_errors_are_classified() {
        assert!(ArchescanError::MissingFile.is_intake_error());
        assert!(ArchescanError::UnsupportedVideoUrl("x".into()).is_intake_error());
        assert!(!ArchescanError::Config("bad".into()).is_intake_error());
        assert!(!ArchescanError::AiUnavailable("down".into()).is_intake_error());
    }
}
