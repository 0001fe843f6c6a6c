// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! One-shot status messages carried across form redirects

use axum::response::Redirect;
use serde::Serialize;

use crate::ArchescanError;

/// Outcome of a form submission, shown once on the next page load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    ArtifactUploaded,
    ArtifactIdentified,
    ArtifactDeleted,
    PhotoUploaded,
    VideoAdded,
    NoFileSelected,
    NameRequired,
    TitleRequired,
    UrlRequired,
    UnsupportedVideoUrl,
    InvalidFilename,
}

/// What templates receive
#[derive(Debug, Serialize)]
pub struct NoticeView {
    pub kind: &'static str,
    pub message: &'static str,
}

const ALL: &[Notice] = &[
    Notice::ArtifactUploaded,
    Notice::ArtifactIdentified,
    Notice::ArtifactDeleted,
    Notice::PhotoUploaded,
    Notice::VideoAdded,
    Notice::NoFileSelected,
    Notice::NameRequired,
    Notice::TitleRequired,
    Notice::UrlRequired,
    Notice::UnsupportedVideoUrl,
    Notice::InvalidFilename,
];

impl Notice {
    /// Query-string code
    pub fn code(self) -> &'static str {
        match self {
            Self::ArtifactUploaded => "uploaded",
            Self::ArtifactIdentified => "identified",
            Self::ArtifactDeleted => "deleted",
            Self::PhotoUploaded => "photo-uploaded",
            Self::VideoAdded => "video-added",
            Self::NoFileSelected => "no-file",
            Self::NameRequired => "no-name",
            Self::TitleRequired => "no-title",
            Self::UrlRequired => "no-url",
            Self::UnsupportedVideoUrl => "bad-video-url",
            Self::InvalidFilename => "bad-filename",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        ALL.iter().copied().find(|n| n.code() == code)
    }

    /// Notice for an input error; `None` for server faults
    pub fn from_error(e: &ArchescanError) -> Option<Self> {
        if !e.is_intake_error() {
            return None;
        }
        match e {
            ArchescanError::MissingFile => Some(Self::NoFileSelected),
            ArchescanError::MissingName => Some(Self::NameRequired),
            ArchescanError::MissingTitle => Some(Self::TitleRequired),
            ArchescanError::MissingUrl => Some(Self::UrlRequired),
            ArchescanError::UnsupportedVideoUrl(_) => Some(Self::UnsupportedVideoUrl),
            ArchescanError::InvalidFilename(_) => Some(Self::InvalidFilename),
            _ => None,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::NoFileSelected
                | Self::NameRequired
                | Self::TitleRequired
                | Self::UrlRequired
                | Self::UnsupportedVideoUrl
                | Self::InvalidFilename
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ArtifactUploaded => "Artifact uploaded.",
            Self::ArtifactIdentified => "Artifact uploaded and identified.",
            Self::ArtifactDeleted => "Artifact deleted.",
            Self::PhotoUploaded => "Photo uploaded successfully!",
            Self::VideoAdded => "Video added.",
            Self::NoFileSelected => "No file selected.",
            Self::NameRequired => "Please give the artifact a name.",
            Self::TitleRequired => "Please give the video a title.",
            Self::UrlRequired => "Please paste a video link.",
            Self::UnsupportedVideoUrl => "Only YouTube watch?v= and youtu.be links are supported.",
            Self::InvalidFilename => "That file name cannot be used.",
        }
    }

    pub fn view(self) -> NoticeView {
        NoticeView {
            kind: if self.is_error() { "error" } else { "success" },
            message: self.message(),
        }
    }

    /// Redirect to `page` carrying this notice
    pub fn redirect(self, page: &str) -> Redirect {
        Redirect::to(&format!("{}?notice={}", page, self.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for notice in ALL {
            assert_eq!(Notice::from_code(notice.code()), Some(*notice));
        }
        assert_eq!(Notice::from_code("nonsense"), None);
    }

    #[test]
    fn test_intake_errors_have_notices() {
        assert_eq!(Notice::from_error(&ArchescanError::MissingFile), Some(Notice::NoFileSelected));
        assert!(Notice::from_error(&ArchescanError::Config("x".into())).is_none());
        assert_eq!(Notice::NoFileSelected.view().kind, "error");
        assert_eq!(Notice::PhotoUploaded.view().kind, "success");
    }

    #[test]
    fn test_every_intake_error_maps() {
        let errors = [
            ArchescanError::MissingFile,
            ArchescanError::MissingName,
            ArchescanError::MissingTitle,
            ArchescanError::MissingUrl,
            ArchescanError::UnsupportedVideoUrl("u".into()),
            ArchescanError::InvalidFilename("f".into()),
        ];
        for e in &errors {
            assert!(e.is_intake_error());
            assert!(Notice::from_error(e).map(Notice::is_error).unwrap_or(false));
        }
    }
}
