//! Fixture files used as upload payloads.
use crate::error::LoadTestError;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const OCTET_STREAM: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("geojson", "application/geo+json"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("zip", "application/zip"),
];

/// Content type for `filename`, looked up by extension exactly as written.
pub fn mime_type(filename: &str) -> &'static str {
    let Some((stem, ext)) = filename.rsplit_once('.') else {
        return OCTET_STREAM;
    };
    if stem.is_empty() {
        // dotfiles like ".pdf" have no extension
        return OCTET_STREAM;
    }

    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(OCTET_STREAM)
}

#[derive(Debug, Clone)]
pub struct SampleFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Picks fixture files uniformly at random from a directory listed once.
#[derive(Debug, Clone)]
pub struct FileSampler {
    files: Vec<PathBuf>,
}

impl FileSampler {
    /// List the regular files in `dir`. An empty directory is rejected here so
    /// the run fails before any traffic is generated.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, LoadTestError> {
        let dir = dir.as_ref().to_path_buf();
        let mut files = vec![];
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }

        if files.is_empty() {
            return Err(LoadTestError::EmptyFixtureDir(dir));
        }

        files.sort();
        debug!("Found {} fixture files in {}", files.len(), dir.display());
        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read a randomly chosen fixture in full.
    pub async fn sample(&self) -> std::io::Result<SampleFile> {
        let path = self.choose();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_type(&name);

        Ok(SampleFile { name, bytes, mime })
    }

    fn choose(&self) -> &Path {
        // `scan` guarantees at least one file
        self.files
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.files[0])
    }
}
