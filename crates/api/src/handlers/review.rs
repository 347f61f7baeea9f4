//! Handlers for the `/reviews` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::review::{CreateReview, Review, UpdateReview, REVIEW_FIELDS};
use comanda_db::repositories::{RestaurantRepo, ReviewRepo, UserRepo};
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateItem,
    BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::query::{FieldsParams, ReviewListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

async fn create_one(state: &AppState, input: &CreateReview) -> AppResult<Review> {
    let (user_exists, restaurant_exists) = tokio::try_join!(
        UserRepo::exists(&state.pool, input.user_id),
        RestaurantRepo::exists(&state.pool, input.restaurant_id),
    )?;
    if !user_exists {
        return Err(AppError::not_found("User", input.user_id));
    }
    if !restaurant_exists {
        return Err(AppError::not_found("Restaurant", input.restaurant_id));
    }

    ReviewRepo::check_create(&state.pool, input).await?.into_result()?;
    let review = ReviewRepo::create(&state.pool, input).await?;
    tracing::info!(
        review_id = review.id,
        user_id = review.user_id,
        restaurant_id = review.restaurant_id,
        "Review created"
    );
    Ok(review)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdateReview) -> AppResult<Review> {
    ReviewRepo::check_update(input).into_result()?;
    ReviewRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("Review", id))
}

/// POST /api/v1/reviews
///
/// One review per (user, restaurant); a second one is a 400 `DUPLICATE`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// POST /api/v1/reviews/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<Review>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreateReview>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/reviews
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = ReviewRepo::list(&state.pool, &spec).await?;
    paginated("reviews", page, spec.projection.as_ref())
}

/// GET /api/v1/reviews/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(ReviewRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &REVIEW_FIELDS)?,
        None => None,
    };
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Review", id))?;
    Ok(Json(project(&review, projection.as_ref())?))
}

/// PUT /api/v1/reviews/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/reviews/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ReviewRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Review", id))
    }
}

/// PUT /api/v1/reviews/bulk/update
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

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(Review, Review)> {
    let item: BulkUpdateItem<UpdateReview> = parse_item(item)?;
    let before = ReviewRepo::find_by_id(&state.pool, item.id)
        .await?
        .ok_or(AppError::not_found("Review", item.id))?;
    let after = update_one(state, item.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/reviews/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = ReviewRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
