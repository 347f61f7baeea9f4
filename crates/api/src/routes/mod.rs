pub mod aggregation;
pub mod auth;
pub mod file;
pub mod health;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod restaurant;
pub mod review;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                                      login (public)
///
/// /users                                           CRUD + bulk, /{id}/role (admin)
/// /restaurants                                     CRUD + bulk
/// /menu                                            CRUD + bulk
/// /promotions                                      CRUD + bulk
/// /reviews                                         CRUD + bulk
/// /payments                                        CRUD + bulk
/// /orders                                          lifecycle routes (requires auth)
///
/// /files/upload                                    multipart upload
/// /files                                           list
/// /files/{filename}                                download, delete
///
/// /aggregations/simples/*                          counts and distinct values
/// /aggregations/complejas/*                        reports
/// /aggregations/arrays/*                           tag / id array helpers
/// /aggregations/embedded/*                         address / profile helpers
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", user::router())
        .nest("/restaurants", restaurant::router())
        .nest("/menu", menu_item::router())
        .nest("/promotions", promotion::router())
        .nest("/orders", order::router())
        .nest("/reviews", review::router())
        .nest("/payments", payment::router())
        .nest("/files", file::router())
        .nest("/aggregations", aggregation::router())
}
