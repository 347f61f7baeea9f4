//! Handlers for the `/payments` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use comanda_core::projection::Projection;
use comanda_core::types::DbId;
use comanda_db::models::payment::{CreatePayment, Payment, UpdatePayment, PAYMENT_FIELDS};
use comanda_db::repositories::{OrderRepo, PaymentRepo, UserRepo};
use serde_json::Value;

use crate::bulk::{
    parse_item, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkUpdateItem,
    BulkUpdateResponse,
};
use crate::error::{AppError, AppResult};
use crate::query::{FieldsParams, PaymentListParams};
use crate::response::{paginated, project};
use crate::state::AppState;

async fn create_one(state: &AppState, input: &CreatePayment) -> AppResult<Payment> {
    PaymentRepo::check_create(input).into_result()?;

    let (user_exists, order) = tokio::try_join!(
        UserRepo::exists(&state.pool, input.user_id),
        OrderRepo::find_by_id(&state.pool, input.order_id),
    )?;
    if !user_exists {
        return Err(AppError::not_found("User", input.user_id));
    }
    if order.is_none() {
        return Err(AppError::not_found("Order", input.order_id));
    }

    let payment = PaymentRepo::create(&state.pool, input).await?;
    tracing::info!(
        payment_id = payment.id,
        order_id = payment.order_id,
        method = %payment.method,
        "Payment recorded"
    );
    Ok(payment)
}

async fn update_one(state: &AppState, id: DbId, input: &UpdatePayment) -> AppResult<Payment> {
    PaymentRepo::check_update(input).into_result()?;
    PaymentRepo::update(&state.pool, id, input)
        .await?
        .ok_or(AppError::not_found("Payment", id))
}

/// POST /api/v1/payments
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let payment = create_one(&state, &input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /api/v1/payments/bulk
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(items): Json<Vec<Value>>,
) -> (StatusCode, Json<BulkCreateResponse<Payment>>) {
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let result = match parse_item::<CreatePayment>(item) {
            Ok(input) => create_one(&state, &input).await,
            Err(e) => Err(e),
        };
        results.push(result);
    }
    BulkCreateResponse::collect(results).into_reply()
}

/// GET /api/v1/payments
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaymentListParams>,
) -> AppResult<Json<Value>> {
    let spec = params.to_spec()?;
    let page = PaymentRepo::list(&state.pool, &spec).await?;
    paginated("payments", page, spec.projection.as_ref())
}

/// GET /api/v1/payments/all
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(PaymentRepo::list_all(&state.pool).await?))
}

/// GET /api/v1/payments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<Value>> {
    let projection = match params.fields.as_deref() {
        Some(raw) => Projection::parse(raw, &PAYMENT_FIELDS)?,
        None => None,
    };
    let payment = PaymentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Payment", id))?;
    Ok(Json(project(&payment, projection.as_ref())?))
}

/// PUT /api/v1/payments/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePayment>,
) -> AppResult<Json<Payment>> {
    Ok(Json(update_one(&state, id, &input).await?))
}

/// DELETE /api/v1/payments/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if PaymentRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Payment", id))
    }
}

/// PUT /api/v1/payments/bulk/update
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

async fn bulk_update_item(state: &AppState, item: Value) -> AppResult<(Payment, Payment)> {
    let item: BulkUpdateItem<UpdatePayment> = parse_item(item)?;
    let before = PaymentRepo::find_by_id(&state.pool, item.id)
        .await?
        .ok_or(AppError::not_found("Payment", item.id))?;
    let after = update_one(state, item.id, &item.changes).await?;
    Ok((before, after))
}

/// DELETE /api/v1/payments/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    let deleted_count = PaymentRepo::delete_many(&state.pool, &input.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
