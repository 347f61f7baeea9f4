//! Handlers for the `/orders` resource.
//!
//! Every status change goes through [`plan_transition`] and is written with
//! a conditional update on the status it was planned from, so two racing
//! requests cannot both move the same order.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::error::CoreError;
use comanda_core::order_pricing::{price_items, referenced_ids, PricedOrder, RequestedItem};
use comanda_core::order_status::{check_items_editable, plan_transition, OrderStatus};
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::order::{
    CreateOrder, Order, OrderStatusChange, UpdateOrder, UpdateOrderItems, UpdateOrderStatus,
    ORDER_FIELDS,
};
use comanda_db::repositories::{MenuItemRepo, OrderRepo, RestaurantRepo, UserRepo};
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{FieldsParams, MyOrdersParams, OrderListParams, RestaurantOrdersParams};
use crate::response::{paginated, project};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_order(state: &AppState, id: DbId) -> AppResult<Order> {
    OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Order", id))
}

/// Price requested lines against the live menu of `restaurant_id`.
async fn price(
    state: &AppState,
    restaurant_id: DbId,
    items: &[RequestedItem],
) -> AppResult<PricedOrder> {
    let menu = MenuItemRepo::find_prices(&state.pool, &referenced_ids(items)).await?;
    Ok(price_items(restaurant_id, items, &menu)?)
}

fn raced(id: DbId) -> AppError {
    AppError::Core(CoreError::InvalidState(format!(
        "Order {id} was modified by another request; reload and retry"
    )))
}

async fn create_one(state: &AppState, caller: &AuthUser, input: &CreateOrder) -> AppResult<Order> {
    let user_id = match input.user_id {
        Some(user_id) if user_id != caller.user_id && !caller.is_admin() => {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only admins may place orders for other users".into(),
            )));
        }
        Some(user_id) => user_id,
        None => caller.user_id,
    };

    let (user_exists, restaurant_exists) = tokio::try_join!(
        UserRepo::exists(&state.pool, user_id),
        RestaurantRepo::exists(&state.pool, input.restaurant_id),
    )?;
    if !user_exists {
        return Err(AppError::not_found("User", user_id));
    }
    if !restaurant_exists {
        return Err(AppError::not_found("Restaurant", input.restaurant_id));
    }

    let priced = price(state, input.restaurant_id, &input.items).await?;
    let order = OrderRepo::create(&state.pool, user_id, input.restaurant_id, &priced).await?;
    tracing::info!(
        order_id = order.id,
        user_id,
        restaurant_id = order.restaurant_id,
        total = %order.total,
        "Order placed"
    );
    Ok(order)
}

/// Validate and apply a status change on `order`.
async fn transition(state: &AppState, order: &Order, next: OrderStatus) -> AppResult<Order> {
    let current = order.lifecycle_status()?;
    let change = plan_transition(current, next)?;
    let updated = OrderRepo::apply_status(&state.pool, order.id, current, &change)
        .await?
        .ok_or_else(|| raced(order.id))?;
    tracing::info!(order_id = order.id, from = %current, to = %next, "Order status changed");
    Ok(updated)
}

/// Re-price and replace the lines of a pending `order`.
async fn replace_items(
    state: &AppState,
    order: &Order,
    items: &[RequestedItem],
) -> AppResult<Order> {
    check_items_editable(order.lifecycle_status()?)?;
    let priced = price(state, order.restaurant_id, items).await?;
    let updated = OrderRepo::replace_items(&state.pool, order.id, &priced)
        .await?
        .ok_or_else(|| raced(order.id))?;
    tracing::info!(order_id = order.id, total = %updated.total, "Order items replaced");
    Ok(updated)
}

/// Apply `PUT /orders/{id}`.
///
/// Both parts are validated against the stored status before anything is
/// written, then land together in one conditional update.
async fn update_one(state: &AppState, id: DbId, input: &UpdateOrder) -> AppResult<Order> {
    if input.status.is_none() && input.items.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Provide 'status' and/or 'items'".into(),
        )));
    }
    let next = input
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let order = find_order(state, id).await?;
    let current = order.lifecycle_status()?;
    let change = next.map(|next| plan_transition(current, next)).transpose()?;
    let priced = match &input.items {
        Some(items) => {
            check_items_editable(current)?;
            Some(price(state, order.restaurant_id, items).await?)
        }
        None => None,
    };

    let updated =
        OrderRepo::apply_update(&state.pool, id, current, priced.as_ref(), change.as_ref())
            .await?
            .ok_or_else(|| raced(id))?;
    tracing::info!(
        order_id = id,
        from = %current,
        to = %updated.status,
        total = %updated.total,
        "Order updated"
    );
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Places an order for the caller. Admins may name another `user_id`.
pub async fn create(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = create_one(&state, &caller, &input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /api/v1/orders/bulk
pub async fn bulk_create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<Order>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreateOrder>(item) {
            Ok(input) => create_one(&state, &admin, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/orders
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = OrderRepo::list(&state.pool, &spec).await?;
    paginated("orders", page, spec.projection.as_ref())
}

/// GET /api/v1/orders/all
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(OrderRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/orders/my-orders
pub async fn my_orders(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<MyOrdersParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec(caller.user_id)?;
    let page = OrderRepo::list(&state.pool, &spec).await?;
    paginated("orders", page, None)
}

/// GET /api/v1/orders/restaurant/{restaurant_id}
pub async fn restaurant_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(restaurant_id): Path<DbId>,
    Query(params): Query<RestaurantOrdersParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec(restaurant_id)?;
    if !RestaurantRepo::exists(&state.pool, restaurant_id).await? {
        return Err(AppError::not_found("Restaurant", restaurant_id));
    }
    let page = OrderRepo::list(&state.pool, &spec).await?;
    paginated("orders", page, None)
}

/// GET /api/v1/orders/{id}
///
/// Owner or admin.
pub async fn get_by_id(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &ORDER_FIELDS)?,
        None => None,
    };
    let order = find_order(&state, id).await?;
    caller.ensure_owner_or_admin(order.user_id)?;
    Ok(Json(project(&order, projection.as_ref())?))
}

/// PUT /api/v1/orders/{id}/status
///
/// Admin only.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrderStatus>,
) -> AppResult<Json<Order>> {
    let next: OrderStatus = input.status.parse()?;
    let order = find_order(&state, id).await?;
    Ok(Json(transition(&state, &order, next).await?))
}

/// PUT /api/v1/orders/{id}/cancel
///
/// Only the user who placed the order may cancel it.
pub async fn cancel(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Order>> {
    let order = find_order(&state, id).await?;
    if order.user_id != caller.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the user who placed the order can cancel it".into(),
        )));
    }
    Ok(Json(transition(&state, &order, OrderStatus::Cancelled).await?))
}

/// PUT /api/v1/orders/{id}/items
///
/// Owner or admin, pending orders only. Lines are re-priced from the
/// current menu; client prices are never read.
pub async fn update_items(
    RequireAuth(caller): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrderItems>,
) -> AppResult<Json<Order>> {
    let order = find_order(&state, id).await?;
    caller.ensure_owner_or_admin(order.user_id)?;
    Ok(Json(replace_items(&state, &order, &input.items).await?))
}

/// PUT /api/v1/orders/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrder>,
) -> AppResult<Json<Order>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/orders/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if OrderRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Order", id))
    }
}

/// PUT /api/v1/orders/bulk/update
///
/// Takes `[{ "id", "status" }]`; each item passes the lifecycle guards on its own.
pub async fn bulk_update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> Json<BulkUpdateResponse> {
    let mut response = BulkUpdateResponse::default();
    for (index, item) in items.into_iter().enumerate() {
        match bulk_update_item(&state, item).await {
            Ok((before, after)) => response.record_update(&before, &after),
            Err(err) => response.record_error(index, &err),
        }
    }
    Json(response)
}

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(Order, Order)> {
    let item: OrderStatusChange = parse_item(item)?;
    let next: OrderStatus = item.status.parse()?;
    let before = find_order(state, item.id).await?;
    let after = transition(state, &before, next).await?;
    Ok((before, after))
}

/// DELETE /api/v1/orders/bulk/delete
pub async fn bulk_delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = OrderRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
