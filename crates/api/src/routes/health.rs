//! Liveness of the two things every request may touch: Postgres and the
//! upload directory.

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency is usable, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The upload directory exists and is writable.
    pub storage_healthy: bool,
}

/// Whether `dir` is an existing directory that is not read-only.
async fn storage_usable(dir: &Path) -> bool {
    match tokio::fs::metadata(dir).await {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "Upload directory unavailable");
            false
        }
    }
}

/// GET /health -- 200 when healthy, 503 with the same body when degraded.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (db, storage_healthy) = tokio::join!(
        comanda_db::health_check(&state.pool),
        storage_usable(&state.config.upload_dir),
    );
    let db_healthy = match db {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let healthy = db_healthy && storage_healthy;
    let (code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            storage_healthy,
        }),
    )
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
