// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Artifact intake: store the upload, annotate it, record it

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::annotator::Annotator;
use crate::config::{PromptConfig, StorageConfig};
use crate::store::{JsonStore, Keyed, MediaDirectory, MediaUpload, RecordStore};
use crate::{ArchescanError, Result};

/// A catalogued artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub filename: String,
    pub summary: String,
    /// Name was proposed by the AI rather than the user
    #[serde(default, skip_serializing_if = "is_false")]
    pub image_only: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Keyed for ArtifactRecord {
    fn key(&self) -> &str {
        &self.filename
    }
}

/// Upload with a user-supplied artifact name
#[derive(Debug, Clone, Default)]
pub struct NamedUpload {
    pub name: String,
    pub description: String,
    pub file: MediaUpload,
}

/// Upload where the AI identifies the artifact
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub description: String,
    pub file: MediaUpload,
}

/// Artifact records plus the directory holding their images
pub struct ArtifactCatalog {
    records: JsonStore<ArtifactRecord>,
    files: MediaDirectory,
    annotator: Annotator,
    prompts: PromptConfig,
}

impl ArtifactCatalog {
    pub fn new(
        records: JsonStore<ArtifactRecord>,
        files: MediaDirectory,
        annotator: Annotator,
        prompts: PromptConfig,
    ) -> Self {
        Self { records, files, annotator, prompts }
    }

    /// Open the catalogue at the configured locations
    pub fn open(storage: &StorageConfig, annotator: Annotator, prompts: PromptConfig) -> Result<Self> {
        Ok(Self::new(
            JsonStore::new(&storage.artifacts_json),
            MediaDirectory::open(&storage.upload_dir)?,
            annotator,
            prompts,
        ))
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// All artifacts in upload order
    pub fn list(&self) -> Result<Vec<ArtifactRecord>> {
        self.records.list()
    }

    /// Artifacts whose name came from AI identification
    pub fn list_image_only(&self) -> Result<Vec<ArtifactRecord>> {
        Ok(self.list()?.into_iter().filter(|a| a.image_only).collect())
    }

    /// Where an artifact's image is stored
    pub fn file_path(&self, filename: &str) -> Result<PathBuf> {
        self.files.path_of(filename)
    }

    /// Catalogue an artifact the user has named
    pub async fn upload_named(&self, upload: NamedUpload) -> Result<ArtifactRecord> {
        let name = upload.name.trim().to_string();
        if upload.file.is_empty() {
            return Err(ArchescanError::MissingFile);
        }
        if name.is_empty() {
            return Err(ArchescanError::MissingName);
        }

        let stored = self.files.append(upload.file)?;
        let summary = self.annotator.summarize(&self.prompts.named_prompt(&name)).await;

        self.record(ArtifactRecord {
            name,
            description: upload.description.trim().to_string(),
            filename: stored.filename,
            summary,
            image_only: false,
        })
    }

    /// Catalogue an artifact from its image alone
    pub async fn upload_image_only(&self, upload: ImageUpload) -> Result<ArtifactRecord> {
        if upload.file.is_empty() {
            return Err(ArchescanError::MissingFile);
        }

        let stored = self.files.append(upload.file)?;
        let path = self.file_path(&stored.filename)?;
        let (summary, name) = self
            .annotator
            .summarize_image(&path, &self.prompts.identify_image)
            .await;

        self.record(ArtifactRecord {
            name,
            description: upload.description.trim().to_string(),
            filename: stored.filename,
            summary,
            image_only: true,
        })
    }

    fn record(&self, artifact: ArtifactRecord) -> Result<ArtifactRecord> {
        let filename = artifact.filename.clone();
        match self.records.append(artifact) {
            Ok(artifact) => {
                info!("Catalogued {} as {:?}", artifact.filename, artifact.name);
                Ok(artifact)
            }
            Err(e) => {
                // Don't leave an image behind that no record points at
                if let Err(cleanup) = self.files.remove(&filename) {
                    warn!("Failed to clean up {}: {}", filename, cleanup);
                }
                Err(e)
            }
        }
    }

    /// Remove every record for `filename` and its stored image
    pub fn delete(&self, filename: &str) -> Result<usize> {
        // Reject traversal before touching the records
        self.files.path_of(filename)?;

        let removed = self.records.remove(filename)?;
        let files_removed = self.files.remove(filename)?;
        info!(
            "Deleted {}: {} record(s), {} file(s)",
            filename, removed, files_removed
        );
        Ok(removed)
    }
}
