//! Media storage for uploaded files.
//!
//! Files live under a configurable root, one subdirectory per kind of upload. Records
//! store the path relative to that root, so the root can move without touching the
//! database.

use crate::errors::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Upper bound on collision suffixes tried before giving up
const MAX_SUFFIX: u32 = 10_000;

/// Where an upload is filed under the media root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadDir {
    /// Client identity papers, leases and insurance files
    ClientDocuments,
    /// Property photos
    PropertyImages,
    /// Expense receipt images
    ExpenseReceipts,
}

impl UploadDir {
    /// Directory name under the media root.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientDocuments => "client_documents",
            Self::PropertyImages => "property_images",
            Self::ExpenseReceipts => "expense_receipts",
        }
    }
}

/// File storage rooted at the configured media directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Creates a store rooted at `root`. Nothing is created on disk until the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The media root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored relative path.
    #[must_use]
    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes `bytes` under `dir` and returns the stored path relative to the root.
    ///
    /// The name is reduced to its final component with unsafe characters replaced. An
    /// existing file is never overwritten: `_1`, `_2`, ... is appended to the stem until
    /// the name is free.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, dir: UploadDir, file_name: &str, bytes: &[u8]) -> Result<String> {
        let clean = sanitize_file_name(file_name)
            .ok_or_else(|| Error::validation("file", "The submitted file name is empty."))?;
        let target_dir = self.root.join(dir.as_str());
        tokio::fs::create_dir_all(&target_dir).await?;

        let (stem, extension) = split_extension(&clean);
        for n in 0..MAX_SUFFIX {
            let candidate = if n == 0 {
                clean.clone()
            } else {
                format!("{stem}_{n}{extension}")
            };
            let path = target_dir.join(&candidate);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} taken, trying next suffix", candidate);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;

            let relative = format!("{}/{candidate}", dir.as_str());
            info!("Stored upload at {}", relative);
            return Ok(relative);
        }

        Err(Error::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for {clean}"),
        )))
    }

    /// Deletes a stored file whose record was never saved. A failure is only logged.
    pub async fn discard(&self, relative: &str) {
        match tokio::fs::remove_file(self.path_of(relative)).await {
            Ok(()) => debug!("Discarded unsaved upload {}", relative),
            Err(e) => warn!("Failed to discard upload {}: {}", relative, e),
        }
    }
}

/// Keeps the last path component, turns spaces into underscores and drops anything
/// that is not alphanumeric, `-`, `_` or `.`.
fn sanitize_file_name(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let clean: String = base
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let clean = clean.trim_start_matches('.').to_string();
    if clean.is_empty() { None } else { Some(clean) }
}

/// Splits `report.final.pdf` into `("report.final", ".pdf")`.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}
