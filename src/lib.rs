// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Archescan: historical artifact catalogue
//!
//! Upload photos of artifacts, get a short AI-written account of each one,
//! and keep a team photo gallery and video list alongside.

pub mod annotator;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gemini;
pub mod store;
pub mod videos;
pub mod web;

pub use config::AppConfig;
pub use error::{ArchescanError, Result};
