//! Route definitions for the `/reviews` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// Routes mounted at `/reviews`.
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
        .route("/", get(review::list).post(review::create))
        .route("/all", get(review::list_all))
        .route("/bulk", post(review::bulk_create))
        .route("/bulk/update", put(review::bulk_update))
        .route("/bulk/delete", delete(review::bulk_delete))
        .route(
            "/{id}",
            get(review::get_by_id)
                .put(review::update)
                .delete(review::delete),
        )
}
