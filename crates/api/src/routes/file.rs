//! Route definitions for the `/files` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::file;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// POST   /upload        -> upload (multipart field `file`)
/// GET    /              -> list
/// GET    /{filename}    -> download
/// DELETE /{filename}    -> delete
/// ```
///
/// The default body limit is lifted on `/upload`; the handler enforces
/// `MAX_UPLOAD_BYTES` itself while streaming.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(file::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/", get(file::list))
        .route("/{filename}", get(file::download).delete(file::delete))
}
