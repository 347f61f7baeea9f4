//! Uploaded file metadata.

use comanda_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `stored_files` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredFile {
    pub id: DbId,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub checksum: String,
    /// Location of the blob on disk; never exposed to clients.
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub uploaded_at: Timestamp,
}

/// Metadata for a blob that has already been written to disk.
#[derive(Debug, Clone)]
pub struct NewStoredFile {
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub checksum: String,
    pub storage_path: String,
}

/// Listing entry for `GET /files`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredFileSummary {
    pub filename: String,
    pub content_type: String,
    pub uploaded_at: Timestamp,
}
