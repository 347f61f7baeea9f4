//! Route definitions for the `/menu` resource (menu items).

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::menu_item;
use crate::state::AppState;

/// Routes mounted at `/menu`.
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
        .route("/", get(menu_item::list).post(menu_item::create))
        .route("/all", get(menu_item::list_all))
        .route("/bulk", post(menu_item::bulk_create))
        .route("/bulk/update", put(menu_item::bulk_update))
        .route("/bulk/delete", delete(menu_item::bulk_delete))
        .route(
            "/{id}",
            get(menu_item::get_by_id)
                .put(menu_item::update)
                .delete(menu_item::delete),
        )
}
