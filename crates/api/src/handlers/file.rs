//! Handlers for `/files`: streamed upload, listing, download and removal.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use comanda_core::error::CoreError;
use comanda_db::models::stored_file::{NewStoredFile, StoredFile, StoredFileSummary};
use comanda_db::repositories::StoredFileRepo;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::blob::{is_allowed_content_type, remove_blob, BlobWriter, ALLOWED_CONTENT_TYPES};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart field that carries the upload.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file: StoredFile,
}

fn file_not_found(filename: &str) -> AppError {
    AppError::NotFound(format!("File '{filename}' not found"))
}

/// Strip any client-side directory components from an uploaded filename.
fn base_name(raw: &str) -> &str {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw).trim()
}

/// POST /api/v1/files/upload
///
/// Streams the `file` field to disk chunk by chunk. The size bound is
/// enforced while streaming, so oversized uploads fail with 413 without
/// being buffered.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = base_name(field.file_name().unwrap_or_default()).to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest(
                "The 'file' field must carry a filename".to_string(),
            ));
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_content_type(&content_type) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unsupported content type '{content_type}'. Must be one of: {}",
                ALLOWED_CONTENT_TYPES.join(", ")
            ))));
        }

        if StoredFileRepo::filename_taken(&state.pool, &filename).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "A file named '{filename}' already exists"
            ))));
        }

        let mut writer =
            BlobWriter::create(&state.config.upload_dir, state.config.max_upload_bytes).await?;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => writer.write_chunk(&chunk).await?,
                Ok(None) => break,
                Err(e) => {
                    writer.abort().await;
                    return Err(AppError::BadRequest(e.to_string()));
                }
            }
        }
        let blob = writer.finish().await?;

        let new_file = NewStoredFile {
            filename,
            content_type,
            length: blob.length,
            checksum: blob.checksum,
            storage_path: blob.path.to_string_lossy().into_owned(),
        };
        let file = match StoredFileRepo::create(&state.pool, &new_file).await {
            Ok(file) => file,
            Err(e) => {
                remove_blob(&blob.path).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            file_id = file.id,
            filename = %file.filename,
            length = file.length,
            "File uploaded"
        );
        return Ok((StatusCode::CREATED, Json(UploadResponse { file })));
    }

    Err(AppError::BadRequest(
        "Multipart body has no 'file' field".to_string(),
    ))
}

/// GET /api/v1/files
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<StoredFileSummary>>> {
    Ok(Json(StoredFileRepo::list(&state.pool).await?))
}

/// GET /api/v1/files/{filename}
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let file = StoredFileRepo::find_by_filename(&state.pool, &filename)
        .await?
        .ok_or_else(|| file_not_found(&filename))?;

    let blob = tokio::fs::File::open(PathBuf::from(&file.storage_path))
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                tracing::warn!(filename = %file.filename, "Blob missing for stored file");
                file_not_found(&filename)
            }
            _ => AppError::InternalError(format!("Failed to open blob: {e}")),
        })?;
    let stream = ReaderStream::new(blob);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.clone()),
            (header::CONTENT_LENGTH, file.length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename.replace('"', "")),
            ),
        ],
        Body::from_stream(stream),
    ))
}

/// DELETE /api/v1/files/{filename}
pub async fn delete(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<StatusCode> {
    let file = StoredFileRepo::delete_by_filename(&state.pool, &filename)
        .await?
        .ok_or_else(|| file_not_found(&filename))?;
    remove_blob(std::path::Path::new(&file.storage_path)).await;
    tracing::info!(filename = %file.filename, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_directories_are_stripped() {
        assert_eq!(base_name("menu.pdf"), "menu.pdf");
        assert_eq!(base_name("../../etc/passwd"), "passwd");
        assert_eq!(base_name("C:\\Users\\ana\\logo.png"), "logo.png");
        assert_eq!(base_name("dir/"), "");
    }
}
