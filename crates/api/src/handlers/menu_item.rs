//! Handlers for the `/menu` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::menu_item::{CreateMenuItem, MenuItem, UpdateMenuItem, MENU_ITEM_FIELDS};
use comanda_db::repositories::{MenuItemRepo, RestaurantRepo};
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateItem,
    BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::query::{FieldsParams, MenuListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

async fn create_one(state: &AppState, input: &CreateMenuItem) -> AppResult<MenuItem> {
    if !RestaurantRepo::exists(&state.pool, input.restaurant_id).await? {
        return Err(AppError::not_found("Restaurant", input.restaurant_id));
    }
    MenuItemRepo::check_create(&state.pool, input).await?.into_result()?;
    let item = MenuItemRepo::create(&state.pool, input).await?;
    tracing::info!(menu_item_id = item.id, restaurant_id = item.restaurant_id, "Menu item created");
    Ok(item)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdateMenuItem) -> AppResult<MenuItem> {
    MenuItemRepo::check_update(&state.pool, id, input).await?.into_result()?;
    MenuItemRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("MenuItem", id))
}

/// POST /api/v1/menu
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateMenuItem>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    let item = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /api/v1/menu/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<MenuItem>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreateMenuItem>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/menu
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<MenuListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = MenuItemRepo::list(&state.pool, &spec).await?;
    paginated("menu", page, spec.projection.as_ref())
}

/// GET /api/v1/menu/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(MenuItemRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/menu/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &MENU_ITEM_FIELDS)?,
        None => None,
    };
    let item = MenuItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("MenuItem", id))?;
    Ok(Json(project(&item, projection.as_ref())?))
}

/// PUT /api/v1/menu/{id}
///
/// Price changes apply to future orders and to item edits of pending
/// orders; lines already priced keep their stored price.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMenuItem>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/menu/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if MenuItemRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("MenuItem", id))
    }
}

/// PUT /api/v1/menu/bulk/update
pub async fn bulk_update(
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

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(MenuItem, MenuItem)> {
    let item: BulkUpdateItem<UpdateMenuItem> = parse_item(item)?;
    let before = MenuItemRepo::find_by_id(&state.pool, item.id)
        .await?
        .ok_or(AppError::not_found("MenuItem", item.id))?;
    let after = update_one(state, item.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/menu/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = MenuItemRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
