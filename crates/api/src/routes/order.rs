//! Route definitions for the `/orders` resource.
//!
//! Every route requires a bearer token; see the handlers for which ones
//! are admin-only.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::order;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /                               -> list (admin)
/// POST   /                               -> create
/// GET    /all                            -> list_all (admin)
/// GET    /my-orders                      -> my_orders
/// GET    /restaurant/{restaurant_id}     -> restaurant_orders (admin)
/// POST   /bulk                           -> bulk_create (admin)
/// PUT    /bulk/update                    -> bulk_update (admin)
/// DELETE /bulk/delete                    -> bulk_delete (admin)
/// GET    /{id}                           -> get_by_id (owner or admin)
/// PUT    /{id}                           -> update (admin)
/// DELETE /{id}                           -> delete (admin)
/// PUT    /{id}/status                    -> update_status (admin)
/// PUT    /{id}/cancel                    -> cancel (owner)
/// PUT    /{id}/items                     -> update_items (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(order::list).post(order::create))
        .route("/all", get(order::list_all))
        .route("/my-orders", get(order::my_orders))
        .route("/restaurant/{restaurant_id}", get(order::restaurant_orders))
        .route("/bulk", post(order::bulk_create))
        .route("/bulk/update", put(order::bulk_update))
        .route("/bulk/delete", delete(order::bulk_delete))
        .route(
            "/{id}",
            get(order::get_by_id).put(order::update).delete(order::delete),
        )
        .route("/{id}/status", put(order::update_status))
        .route("/{id}/cancel", put(order::cancel))
        .route("/{id}/items", put(order::update_items))
}
