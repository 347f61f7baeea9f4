//! Route definitions for the `/restaurants` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::restaurant;
use crate::state::AppState;

/// Routes mounted at `/restaurants`.
///
/// ```text
/// GET    /              -> list (paginated)
/// POST   /              -> create
/// GET    /all           -> list_all
/// POST   /bulk          -> bulk_create
/// PUT    /bulk/update   -> bulk_update
/// DELETE /bulk/delete   -> bulk_delete
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurant::list).post(restaurant::create))
        .route("/all", get(restaurant::list_all))
        .route("/bulk", post(restaurant::bulk_create))
        .route("/bulk/update", put(restaurant::bulk_update))
        .route("/bulk/delete", delete(restaurant::bulk_delete))
        .route(
            "/{id}",
            get(restaurant::get_by_id)
                .put(restaurant::update)
                .delete(restaurant::delete),
        )
}
