// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Shared video links, normalized to embeddable URLs

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::{JsonStore, Keyed, RecordStore};
use crate::{ArchescanError, Result};

/// Prefix of every embed URL
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// A listed video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub title: String,
    pub embed_url: String,
}

impl Keyed for VideoRecord {
    fn key(&self) -> &str {
        &self.embed_url
    }
}

/// Extract the video id from a watch link or a short link
pub fn video_id(url: &str) -> Option<&str> {
    let id = if let Some((_, rest)) = url.split_once("watch?v=") {
        rest.split('&').next()
    } else if let Some((_, rest)) = url.split_once("youtu.be/") {
        rest.split('?').next()
    } else {
        None
    }?;

    (!id.is_empty()).then_some(id)
}

/// Embeddable form of a shared video link
pub fn embed_url(url: &str) -> Option<String> {
    video_id(url).map(|id| format!("{}{}", EMBED_BASE, id))
}

/// Append-only list of videos
pub struct VideoList {
    records: JsonStore<VideoRecord>,
}

impl VideoList {
    pub fn new(records: JsonStore<VideoRecord>) -> Self {
        Self { records }
    }

    pub fn list(&self) -> Result<Vec<VideoRecord>> {
        self.records.list()
    }

    /// Add a video from a title and a raw shared link
    pub fn add(&self, title: &str, url: &str) -> Result<VideoRecord> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() {
            return Err(ArchescanError::MissingTitle);
        }
        if url.is_empty() {
            return Err(ArchescanError::MissingUrl);
        }

        let embed_url =
            embed_url(url).ok_or_else(|| ArchescanError::UnsupportedVideoUrl(url.to_string()))?;

        let record = self.records.append(VideoRecord {
            title: title.to_string(),
            embed_url,
        })?;
        info!("Added video {:?}", record.title);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn videos() -> (tempfile::TempDir, VideoList) {
        let dir = tempfile::tempdir().unwrap();
        let list = VideoList::new(JsonStore::new(dir.path().join("videos.json")));
        (dir, list)
    }

    #[test]
    fn test_short_link() {
        assert_eq!(
            embed_url("https://youtu.be/abc123?t=5").as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );
    }

    #[test]
    fn test_watch_link() {
        assert_eq!(embed_url("https://x/watch?v=xyz&t=5").as_deref(), Some("https://www.youtube.com/embed/xyz"));
        assert_eq!(video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_watch_pattern_wins_over_short_pattern() {
        assert_eq!(video_id("https://youtu.be/watch?v=inner&x=1"), Some("inner"));
    }

    #[test]
    fn test_unrecognized_or_empty_ids() {
        assert_eq!(embed_url("https://vimeo.com/12345"), None);
        assert_eq!(embed_url("https://www.youtube.com/watch?v=&t=3"), None);
        assert_eq!(embed_url("https://youtu.be/?t=3"), None);
    }

    #[test]
    fn test_add_appends_in_order() {
        let (_dir, list) = videos();
        list.add("Dig site tour", "https://youtu.be/abc123?t=5").unwrap();
        list.add(" Museum talk ", "https://www.youtube.com/watch?v=xyz&t=5").unwrap();

        let all = list.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].embed_url, "https://www.youtube.com/embed/abc123");
        assert_eq!(all[1].title, "Museum talk");
    }

    #[test]
    fn test_add_rejects_unsupported_url_without_writing() {
        let (dir, list) = videos();
        let err = list.add("Elsewhere", "https://example.com/video.mp4").unwrap_err();

        assert!(matches!(err, ArchescanError::UnsupportedVideoUrl(_)));
        assert!(list.list().unwrap().is_empty());
        assert!(!dir.path().join("videos.json").exists());
    }

    #[test]
    fn test_add_requires_title_and_url() {
        let (_dir, list) = videos();
        assert!(matches!(list.add("", "https://youtu.be/a"), Err(ArchescanError::MissingTitle)));
        assert!(matches!(list.add("T", "  "), Err(ArchescanError::MissingUrl)));
    }
}
