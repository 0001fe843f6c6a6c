// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Team photo gallery

use std::path::{Path, PathBuf};
use tracing::info;

use crate::store::{MediaDirectory, MediaEntry, MediaUpload, RecordStore};
use crate::Result;

/// Extensions shown in the gallery
pub const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Photos stored as plain files in one directory
pub struct Gallery {
    photos: MediaDirectory,
}

impl Gallery {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            photos: MediaDirectory::open(dir)?.with_extensions(PHOTO_EXTENSIONS),
        })
    }

    pub fn root(&self) -> &Path {
        self.photos.root()
    }

    /// Photo file names, sorted
    pub fn photos(&self) -> Result<Vec<String>> {
        Ok(self.photos.list()?.into_iter().map(|p| p.filename).collect())
    }

    /// Store an uploaded file; any extension is accepted but only photos are listed
    pub fn upload(&self, file: MediaUpload) -> Result<MediaEntry> {
        let entry = self.photos.append(file)?;
        if !self.photos.accepts(&entry.filename) {
            info!("{} stored but will not appear in the gallery", entry.filename);
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchescanError;

    #[test]
    fn test_listing_only_shows_photos() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = Gallery::open(dir.path().join("team_photos")).unwrap();

        gallery.upload(MediaUpload::new("notes.txt", b"hello".to_vec())).unwrap();
        gallery.upload(MediaUpload::new("photo.JPG", b"jpg".to_vec())).unwrap();
        gallery.upload(MediaUpload::new("crew.png", b"png".to_vec())).unwrap();

        assert_eq!(gallery.photos().unwrap(), vec!["crew.png", "photo.JPG"]);
        assert!(gallery.root().join("notes.txt").exists());
    }

    #[test]
    fn test_empty_upload_is_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = Gallery::open(dir.path()).unwrap();
        assert!(matches!(
            gallery.upload(MediaUpload::default()),
            Err(ArchescanError::MissingFile)
        ));
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("static").join("team_photos");
        let gallery = Gallery::open(&root).unwrap();
        assert!(root.is_dir());
        assert!(gallery.photos().unwrap().is_empty());
    }
}
