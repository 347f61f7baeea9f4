//! Route definitions for the `/promotions` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::promotion;
use crate::state::AppState;

/// Routes mounted at `/promotions`.
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
        .route("/", get(promotion::list).post(promotion::create))
        .route("/all", get(promotion::list_all))
        .route("/bulk", post(promotion::bulk_create))
        .route("/bulk/update", put(promotion::bulk_update))
        .route("/bulk/delete", delete(promotion::bulk_delete))
        .route(
            "/{id}",
            get(promotion::get_by_id)
                .put(promotion::update)
                .delete(promotion::delete),
        )
}
