// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Record persistence: JSON array files and scanned media directories

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{ArchescanError, Result};

/// A record with an identity key used for removal
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A collection of records that can be listed, appended to and pruned
pub trait RecordStore {
    /// What callers hand to `append`
    type Input;
    /// What the store holds and lists
    type Record;

    /// All records in stored order
    fn list(&self) -> Result<Vec<Self::Record>>;

    /// Add an item, returning the record as stored
    fn append(&self, item: Self::Input) -> Result<Self::Record>;

    /// Remove every record with this key, returning how many went
    fn remove(&self, key: &str) -> Result<usize>;
}

/// Read a JSON array of records; a missing or blank file is an empty list
pub fn load<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(&content)?)
}

/// Write the full record list, replacing the file
pub fn save<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Rename over the target so readers never see a half-written array
    let tmp = temp_path(path);
    fs::write(&tmp, &buffer)?;
    fs::rename(&tmp, path)?;

    debug!("Saved {} records to {:?}", records.len(), path);
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "store".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Record store backed by a single JSON array file
pub struct JsonStore<R> {
    path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> R>,
}

impl<R> JsonStore<R> {
    /// Create a store for the given file (created on first save)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    /// Get store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| ArchescanError::Config(format!("Store lock poisoned: {:?}", self.path)))
    }
}

impl<R> RecordStore for JsonStore<R>
where
    R: Keyed + Clone + Serialize + DeserializeOwned,
{
    type Input = R;
    type Record = R;

    fn list(&self) -> Result<Vec<R>> {
        let _guard = self.guard()?;
        load(&self.path)
    }

    fn append(&self, record: R) -> Result<R> {
        let _guard = self.guard()?;
        let mut records: Vec<R> = load(&self.path)?;
        records.push(record.clone());
        save(&self.path, &records)?;
        Ok(record)
    }

    fn remove(&self, key: &str) -> Result<usize> {
        let _guard = self.guard()?;
        let mut records: Vec<R> = load(&self.path)?;
        let before = records.len();
        records.retain(|r| r.key() != key);

        let removed = before - records.len();
        if removed > 0 {
            save(&self.path, &records)?;
        }
        Ok(removed)
    }
}

/// A file found in a media directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub filename: String,
}

impl Keyed for MediaEntry {
    fn key(&self) -> &str {
        &self.filename
    }
}

/// An uploaded file waiting to be stored
#[derive(Debug, Clone, Default)]
pub struct MediaUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// True when no file was chosen in the form
    pub fn is_empty(&self) -> bool {
        self.filename.trim().is_empty()
    }
}

/// Record store backed by the files of one directory
pub struct MediaDirectory {
    root: PathBuf,
    extensions: Option<Vec<String>>,
}

impl MediaDirectory {
    /// Open a directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            fs::create_dir_all(&root)?;
            info!("Created media directory: {:?}", root);
        }
        Ok(Self { root, extensions: None })
    }

    /// Only list files with one of these extensions (case-insensitive)
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = Some(extensions.iter().map(|e| e.to_ascii_lowercase()).collect());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of a stored file
    pub fn path_of(&self, filename: &str) -> Result<PathBuf> {
        let name = sanitize_filename(filename)?;
        if name != filename {
            return Err(ArchescanError::InvalidFilename(filename.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Whether a file name passes the extension filter
    pub fn accepts(&self, filename: &str) -> bool {
        match &self.extensions {
            None => true,
            Some(allowed) => Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
                .unwrap_or(false),
        }
    }

    /// Write bytes under `filename`, choosing a fresh name if it is taken
    fn write_new(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let mut candidate = filename.to_string();
        loop {
            let path = self.root.join(&candidate);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(bytes) {
                        drop(file);
                        // Partial file would shadow the name for later uploads
                        if let Err(cleanup) = fs::remove_file(&path) {
                            warn!("Failed to remove partial {}: {}", candidate, cleanup);
                        }
                        return Err(e.into());
                    }
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    candidate = suffixed_name(filename);
                    debug!("{} already exists, trying {}", filename, candidate);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl RecordStore for MediaDirectory {
    type Input = MediaUpload;
    type Record = MediaEntry;

    fn list(&self) -> Result<Vec<MediaEntry>> {
        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.ends_with(".tmp") && self.accepts(name))
            .collect();
        names.sort();

        Ok(names.into_iter().map(|filename| MediaEntry { filename }).collect())
    }

    fn append(&self, upload: MediaUpload) -> Result<MediaEntry> {
        if upload.is_empty() {
            return Err(ArchescanError::MissingFile);
        }
        let filename = sanitize_filename(&upload.filename)?;
        let stored = self.write_new(&filename, &upload.bytes)?;
        info!("Stored {} ({} bytes) in {:?}", stored, upload.bytes.len(), self.root);
        Ok(MediaEntry { filename: stored })
    }

    fn remove(&self, filename: &str) -> Result<usize> {
        let path = self.path_of(filename)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(1),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{:?} already gone", path);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce a client-supplied file name to a bare file name
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ArchescanError::MissingFile);
    }

    let name = trimmed
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.chars().any(char::is_control) {
        return Err(ArchescanError::InvalidFilename(raw.to_string()));
    }

    Ok(name.to_string())
}

fn suffixed_name(filename: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    let tag = &tag[..8];
    let path = Path::new(filename);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, tag, ext),
        None => format!("{}-{}", stem, tag),
    }
}
