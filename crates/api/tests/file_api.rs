//! HTTP-level tests for `/files`.

mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, body_json, delete, get, post_multipart, test_config};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

const UPLOAD_URI: &str = "/api/v1/files/upload";

fn app_in(pool: PgPool, dir: &tempfile::TempDir) -> axum::Router {
    common::build_test_app_with_config(pool, test_config(dir.path().to_path_buf()))
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_list_download_delete(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);
    let bytes = b"\x89PNG\r\n\x1a\nnot-really-a-png".to_vec();

    let response = post_multipart(app.clone(), UPLOAD_URI, "file", "logo.png", "image/png", &bytes).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["file"]["filename"], "logo.png");
    assert_eq!(json["file"]["content_type"], "image/png");
    assert_eq!(json["file"]["length"], bytes.len());
    assert_eq!(
        json["file"]["checksum"],
        format!("{:x}", Sha256::digest(&bytes))
    );
    assert!(json["file"].get("storage_path").is_none());

    let json = body_json(get(app.clone(), "/api/v1/files").await).await;
    let files = json.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "logo.png");

    let response = get(app.clone(), "/api/v1/files/logo.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"logo.png\""
    );
    assert_eq!(body_bytes(response).await, bytes);

    let response = delete(app.clone(), "/api/v1/files/logo.png").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), "/api/v1/files/logo.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File 'logo.png' not found");

    let response = delete(app, "/api/v1/files/logo.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_filename_is_rejected(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);

    let first = post_multipart(app.clone(), UPLOAD_URI, "file", "menu.pdf", "application/pdf", b"%PDF-1").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_multipart(app.clone(), UPLOAD_URI, "file", "menu.pdf", "application/pdf", b"%PDF-2").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["code"], "DUPLICATE");

    let json = body_json(get(app, "/api/v1/files").await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_disallowed_content_type(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);

    let response = post_multipart(app, UPLOAD_URI, "file", "page.html", "text/html", b"<html>").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_oversized_upload_leaves_nothing_behind(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);
    let bytes = vec![7u8; 2048];

    let response = post_multipart(app.clone(), UPLOAD_URI, "file", "big.jpg", "image/jpeg", &bytes).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = body_json(get(app, "/api/v1/files").await).await;
    assert!(json.as_array().unwrap().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_file_field(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);

    let response = post_multipart(app, UPLOAD_URI, "attachment", "a.png", "image/png", b"x").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_path_is_stripped(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(pool, &dir);

    let response =
        post_multipart(app.clone(), UPLOAD_URI, "file", "../../secret.png", "image/png", b"x").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["file"]["filename"], "secret.png");

    let response = get(app, "/api/v1/files/secret.png").await;
    assert_eq!(response.status(), StatusCode::OK);
}
