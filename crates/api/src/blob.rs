//! On-disk blob storage for uploaded files.
//!
//! Blobs are written chunk by chunk while their SHA-256 checksum and length
//! are computed, so an upload is never held in memory as a whole. Each blob
//! gets a random name under the upload directory; the client-facing filename
//! lives only in the `stored_files` table.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Content types accepted by `POST /files/upload`.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "application/pdf"];

pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// A fully written blob.
#[derive(Debug, Clone)]
pub struct WrittenBlob {
    pub path: PathBuf,
    pub length: i64,
    /// Lowercase hex SHA-256 of the content.
    pub checksum: String,
}

/// Incremental writer for one blob, bounded by `max_bytes`.
pub struct BlobWriter {
    path: PathBuf,
    file: File,
    hasher: Sha256,
    written: usize,
    max_bytes: usize,
}

fn io_error(context: &str, err: std::io::Error) -> AppError {
    AppError::InternalError(format!("{context}: {err}"))
}

impl BlobWriter {
    /// Create a new empty blob under `dir`.
    pub async fn create(dir: &Path, max_bytes: usize) -> AppResult<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| io_error("Failed to create upload directory", e))?;

        let path = dir.join(Uuid::new_v4().to_string());
        let file = File::create(&path)
            .await
            .map_err(|e| io_error("Failed to create blob", e))?;

        Ok(Self {
            path,
            file,
            hasher: Sha256::new(),
            written: 0,
            max_bytes,
        })
    }

    /// Append one chunk. Exceeding the size bound removes the partial blob.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        self.written += chunk.len();
        if self.written > self.max_bytes {
            remove_blob(&self.path).await;
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_bytes
            )));
        }

        self.hasher.update(chunk);
        if let Err(e) = self.file.write_all(chunk).await {
            remove_blob(&self.path).await;
            return Err(io_error("Failed to write blob", e));
        }
        Ok(())
    }

    /// Flush to disk and return the blob's location, length and checksum.
    pub async fn finish(mut self) -> AppResult<WrittenBlob> {
        if let Err(e) = self.file.flush().await {
            remove_blob(&self.path).await;
            return Err(io_error("Failed to flush blob", e));
        }
        Ok(WrittenBlob {
            path: self.path,
            length: self.written as i64,
            checksum: format!("{:x}", self.hasher.finalize()),
        })
    }

    /// Drop a blob that will not be kept.
    pub async fn abort(self) {
        remove_blob(&self.path).await;
    }
}

/// Best-effort removal; a missing blob is not an error.
pub async fn remove_blob(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove blob");
        }
    }
}
