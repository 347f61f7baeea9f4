//! Route definitions for the `/payments` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Routes mounted at `/payments`.
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
        .route("/", get(payment::list).post(payment::create))
        .route("/all", get(payment::list_all))
        .route("/bulk", post(payment::bulk_create))
        .route("/bulk/update", put(payment::bulk_update))
        .route("/bulk/delete", delete(payment::bulk_delete))
        .route(
            "/{id}",
            get(payment::get_by_id)
                .put(payment::update)
                .delete(payment::delete),
        )
}
