//! Handlers for the `/restaurants` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::restaurant::{
    CreateRestaurant, Restaurant, UpdateRestaurant, RESTAURANT_FIELDS,
};
use comanda_db::repositories::RestaurantRepo;
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateItem,
    BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::query::{FieldsParams, RestaurantListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

async fn create_one(state: &AppState, input: &CreateRestaurant) -> AppResult<Restaurant> {
    RestaurantRepo::check_create(&state.pool, input).await?.into_result()?;
    let restaurant = RestaurantRepo::create(&state.pool, input).await?;
    tracing::info!(restaurant_id = restaurant.id, "Restaurant created");
    Ok(restaurant)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdateRestaurant) -> AppResult<Restaurant> {
    RestaurantRepo::check_update(&state.pool, id, input).await?.into_result()?;
    RestaurantRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("Restaurant", id))
}

/// POST /api/v1/restaurants
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateRestaurant>,
) -> AppResult<(StatusCode, Json<Restaurant>)> {
    let restaurant = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// POST /api/v1/restaurants/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<Restaurant>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreateRestaurant>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/restaurants
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RestaurantListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = RestaurantRepo::list(&state.pool, &spec).await?;
    paginated("restaurants", page, spec.projection.as_ref())
}

/// GET /api/v1/restaurants/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Restaurant>>> {
    Ok(Json(RestaurantRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/restaurants/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &RESTAURANT_FIELDS)?,
        None => None,
    };
    let restaurant = RestaurantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Restaurant", id))?;
    Ok(Json(project(&restaurant, projection.as_ref())?))
}

/// PUT /api/v1/restaurants/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRestaurant>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/restaurants/{id}
///
/// Cascades to the restaurant's menu items, orders and reviews.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if RestaurantRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Restaurant", id))
    }
}

/// PUT /api/v1/restaurants/bulk/update
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

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(Restaurant, Restaurant)> {
    let item: BulkUpdateItem<UpdateRestaurant> = parse_item(item)?;
    let before = RestaurantRepo::find_by_id(&state.pool, item.id)
        .await?
        .ok_or(AppError::not_found("Restaurant", item.id))?;
    let after = update_one(state, item.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/restaurants/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = RestaurantRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
