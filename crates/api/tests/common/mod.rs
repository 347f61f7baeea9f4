#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use comanda_api::auth::jwt::issue_token;
use comanda_api::config::{JwtConfig, ServerConfig};
use comanda_api::router::build_app_router;
use comanda_api::state::AppState;
use comanda_db::models::menu_item::{CreateMenuItem, MenuItem};
use comanda_db::models::restaurant::{CreateRestaurant, Restaurant};
use comanda_db::models::user::{CreateUser, User};
use comanda_db::repositories::{MenuItemRepo, RestaurantRepo, UserRepo};

pub const TEST_JWT_SECRET: &str = "test-secret-not-for-production";

/// Build a test `ServerConfig` with safe defaults and the given upload dir.
pub fn test_config(upload_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        upload_dir,
        max_upload_bytes: 1024,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
        bootstrap_admin: None,
    }
}

/// Build the full application router (same middleware stack as `main.rs`).
///
/// Uploads go to a fresh directory under the system temp dir, created here
/// as `main.rs` does at startup; tests that inspect files should use
/// [`build_test_app_with_config`] with a `tempfile::TempDir` instead.
pub fn build_test_app(pool: PgPool) -> Router {
    let upload_dir = std::env::temp_dir().join(format!("comanda-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&upload_dir).expect("upload dir should be creatable");
    build_test_app_with_config(pool, test_config(upload_dir))
}

pub fn build_test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Sign an access token with the test secret.
pub fn token_for(user_id: i64, role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 60,
    };
    issue_token(&config, user_id, role)
        .expect("token generation should succeed")
        .token
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn new_user(name: &str, email: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
        longitude: -74.08,
        latitude: 4.61,
        registered_at: None,
        age: 30,
        gender: "female".to_string(),
        password: None,
        address: None,
        profile: None,
    }
}

/// Insert a user directly and return it together with a token for its role.
pub async fn seed_user(pool: &PgPool, name: &str, email: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(pool, &new_user(name, email), None)
        .await
        .expect("user creation should succeed");
    let user = if role == "user" {
        user
    } else {
        UserRepo::set_role(pool, user.id, role)
            .await
            .expect("role update should succeed")
            .expect("user should exist")
    };
    let token = token_for(user.id, role);
    (user, token)
}

pub async fn seed_restaurant(pool: &PgPool, name: &str, categories: &[&str]) -> Restaurant {
    let input = CreateRestaurant {
        name: name.to_string(),
        address: "Calle 10 # 5-20".to_string(),
        longitude: -74.07,
        latitude: 4.60,
        categories: categories.iter().map(|c| c.to_string()).collect(),
    };
    RestaurantRepo::create(pool, &input)
        .await
        .expect("restaurant creation should succeed")
}

pub async fn seed_menu_item(
    pool: &PgPool,
    restaurant_id: i64,
    name: &str,
    price: &str,
    tags: &[&str],
) -> MenuItem {
    let input = CreateMenuItem {
        restaurant_id,
        name: name.to_string(),
        description: format!("{name} of the house"),
        price: price.parse().expect("valid price"),
        available: None,
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    };
    MenuItemRepo::create(pool, &input)
        .await
        .expect("menu item creation should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn build_request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, build_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, build_request(Method::GET, uri, None, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, build_request(Method::POST, uri, Some(body), None)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, build_request(Method::POST, uri, Some(body), Some(token))).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, build_request(Method::PUT, uri, Some(body), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, build_request(Method::PUT, uri, Some(body), Some(token))).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, build_request(Method::PUT, uri, None, Some(token))).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, build_request(Method::DELETE, uri, None, None)).await
}

pub async fn delete_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, build_request(Method::DELETE, uri, Some(body), None)).await
}

/// POST a single-field `multipart/form-data` body.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "comanda-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
