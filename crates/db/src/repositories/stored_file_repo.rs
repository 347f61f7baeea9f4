//! Repository for the `stored_files` table (upload metadata).

use sqlx::PgPool;

use crate::models::stored_file::{NewStoredFile, StoredFile, StoredFileSummary};

const COLUMNS: &str = "id, filename, content_type, length, checksum, storage_path, uploaded_at";

pub struct StoredFileRepo;

impl StoredFileRepo {
    pub async fn filename_taken(pool: &PgPool, filename: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stored_files WHERE filename = $1)")
            .bind(filename)
            .fetch_one(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &NewStoredFile) -> Result<StoredFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO stored_files (filename, content_type, length, checksum, storage_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(&input.filename)
            .bind(&input.content_type)
            .bind(input.length)
            .bind(&input.checksum)
            .bind(&input.storage_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_filename(
        pool: &PgPool,
        filename: &str,
    ) -> Result<Option<StoredFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stored_files WHERE filename = $1");
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(filename)
            .fetch_optional(pool)
            .await
    }

    /// Newest uploads first.
    pub async fn list(pool: &PgPool) -> Result<Vec<StoredFileSummary>, sqlx::Error> {
        sqlx::query_as::<_, StoredFileSummary>(
            "SELECT filename, content_type, uploaded_at FROM stored_files
             ORDER BY uploaded_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Remove the metadata row, returning it so the caller can drop the blob.
    pub async fn delete_by_filename(
        pool: &PgPool,
        filename: &str,
    ) -> Result<Option<StoredFile>, sqlx::Error> {
        let query = format!("DELETE FROM stored_files WHERE filename = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(filename)
            .fetch_optional(pool)
            .await
    }
}
