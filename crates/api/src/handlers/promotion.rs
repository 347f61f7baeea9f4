//! Handlers for the `/promotions` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::promotion::{
    CreatePromotion, Promotion, UpdatePromotion, PROMOTION_FIELDS,
};
use comanda_db::repositories::{MenuItemRepo, PromotionRepo};
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateItem,
    BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::query::{FieldsParams, PromotionListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

/// Every referenced menu item must exist; the first missing one is reported.
async fn ensure_menu_items_exist(state: &AppState, ids: &[DbId]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    match MenuItemRepo::missing_ids(&state.pool, ids).await?.first() {
        Some(&missing) => Err(AppError::not_found("MenuItem", missing)),
        None => Ok(()),
    }
}

async fn create_one(state: &AppState, input: &CreatePromotion) -> AppResult<Promotion> {
    PromotionRepo::check_create(input).into_result()?;
    ensure_menu_items_exist(state, &input.menu_item_ids).await?;
    let promotion = PromotionRepo::create(&state.pool, input).await?;
    tracing::info!(promotion_id = promotion.id, kind = %promotion.kind, "Promotion created");
    Ok(promotion)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdatePromotion) -> AppResult<Promotion> {
    PromotionRepo::check_update(&state.pool, id, input).await?.into_result()?;
    if let Some(ids) = &input.menu_item_ids {
        ensure_menu_items_exist(state, ids).await?;
    }
    PromotionRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("Promotion", id))
}

/// POST /api/v1/promotions
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePromotion>,
) -> AppResult<(StatusCode, Json<Promotion>)> {
    let promotion = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// POST /api/v1/promotions/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<Promotion>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreatePromotion>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/promotions
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PromotionListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = PromotionRepo::list(&state.pool, &spec).await?;
    paginated("promotions", page, spec.projection.as_ref())
}

/// GET /api/v1/promotions/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Promotion>>> {
    Ok(Json(PromotionRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/promotions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &PROMOTION_FIELDS)?,
        None => None,
    };
    let promotion = PromotionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Promotion", id))?;
    Ok(Json(project(&promotion, projection.as_ref())?))
}

/// PUT /api/v1/promotions/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePromotion>,
) -> AppResult<Json<Promotion>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/promotions/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if PromotionRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Promotion", id))
    }
}

/// PUT /api/v1/promotions/bulk/update
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

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(Promotion, Promotion)> {
    let item: BulkUpdateItem<UpdatePromotion> = parse_item(item)?;
    let before = PromotionRepo::find_by_id(&state.pool, item.id)
        .await?
        .ok_or(AppError::not_found("Promotion", item.id))?;
    let after = update_one(state, item.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/promotions/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = PromotionRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
