//! Route definitions for the `/users` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /              -> list (paginated)
/// POST   /              -> create
/// GET    /all           -> list_all
/// POST   /bulk          -> bulk_create
/// PUT    /bulk/update   -> bulk_update (by id or email)
/// DELETE /bulk/delete   -> bulk_delete (by ids and/or emails)
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// PUT    /{id}/role     -> set_role (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list).post(user::create))
        .route("/all", get(user::list_all))
        .route("/bulk", post(user::bulk_create))
        .route("/bulk/update", put(user::bulk_update))
        .route("/bulk/delete", delete(user::bulk_delete))
        .route(
            "/{id}",
            get(user::get_by_id).put(user::update).delete(user::delete),
        )
        .route("/{id}/role", put(user::set_role))
}
