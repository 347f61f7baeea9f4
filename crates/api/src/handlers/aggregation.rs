//! Handlers for `/aggregations`: the fixed reporting catalog plus the
//! array and embedded-document helpers.
//!
//! Every report is a single read-only statement in [`AggregationRepo`]; every
//! helper is a single `UPDATE ... RETURNING` on one row.

use axum::extract::{Query, State};
use axum::Json;
use comanda_core::error::CoreError;
use comanda_core::types::{DbId, Money};
use comanda_db::models::aggregation::{
    CategoryCount, MonthlyUsers, OrderItemsProjection, RestaurantRating, RestaurantRevenue,
    TagCount, TagSales, UserOrderCount, WeekdaySales,
};
use comanda_db::models::menu_item::MenuItem;
use comanda_db::models::promotion::Promotion;
use comanda_db::models::user::User;
use comanda_db::repositories::{
    AggregationRepo, MenuItemRepo, OrderRepo, PromotionRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::response::{project, StatsResponse, TotalResponse, UpdatedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GendersResponse {
    pub genders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AvgValueResponse {
    #[serde(rename = "avgValue")]
    pub avg_value: Money,
}

#[derive(Debug, Serialize)]
pub struct PromosResponse {
    pub promos: Vec<Promotion>,
}

#[derive(Debug, Serialize)]
pub struct AvgTimeResponse {
    #[serde(rename = "avgTimeMs")]
    pub avg_time_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct ModifiedCountResponse {
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
}

/// Body of `pushTag` and `pullTag`.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub menu_item_id: DbId,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToSetRequest {
    pub promotion_id: DbId,
    pub menu_item_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct PopFirstRequest {
    pub menu_item_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct PullAllRequest {
    pub menu_item_id: DbId,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdParams {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct AddAddressRequest {
    pub user_id: DbId,
    pub address: Value,
}

#[derive(Debug, Deserialize)]
pub struct MergeProfileRequest {
    pub user_id: DbId,
    pub profile_updates: Value,
}

fn require_tag(tag: &str) -> AppResult<&str> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "'tag' must not be empty".into(),
        )));
    }
    Ok(tag)
}

fn require_object(field: &str, value: &Value) -> AppResult<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "'{field}' must be a JSON object"
        ))))
    }
}

fn menu_item_updated(item: Option<MenuItem>, id: DbId) -> AppResult<Json<UpdatedResponse<MenuItem>>> {
    let updated = item.ok_or(AppError::not_found("MenuItem", id))?;
    Ok(Json(UpdatedResponse { updated }))
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("User", id))
}

// ---------------------------------------------------------------------------
// Simple reports
// ---------------------------------------------------------------------------

/// GET /api/v1/aggregations/simples/countUsers
pub async fn count_users(State(state): State<AppState>) -> AppResult<Json<TotalResponse>> {
    let total = AggregationRepo::count_users(&state.pool).await?;
    Ok(Json(TotalResponse { total }))
}

/// GET /api/v1/aggregations/simples/distinctGenders
pub async fn distinct_genders(State(state): State<AppState>) -> AppResult<Json<GendersResponse>> {
    let genders = AggregationRepo::distinct_genders(&state.pool).await?;
    Ok(Json(GendersResponse { genders }))
}

/// GET /api/v1/aggregations/simples/countByCategory
pub async fn count_by_category(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<CategoryCount>>> {
    let stats = AggregationRepo::count_by_category(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/simples/distinctMenuTags
pub async fn distinct_menu_tags(State(state): State<AppState>) -> AppResult<Json<TagsResponse>> {
    let tags = AggregationRepo::distinct_menu_tags(&state.pool).await?;
    Ok(Json(TagsResponse { tags }))
}

/// GET /api/v1/aggregations/simples/countDeliveredOrders
pub async fn count_delivered_orders(
    State(state): State<AppState>,
) -> AppResult<Json<TotalResponse>> {
    let total = AggregationRepo::count_delivered_orders(&state.pool).await?;
    Ok(Json(TotalResponse { total }))
}

// ---------------------------------------------------------------------------
// Complex reports
// ---------------------------------------------------------------------------

/// GET /api/v1/aggregations/complejas/topRestaurants
///
/// Five highest-revenue restaurants, highest first.
pub async fn top_restaurants(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<RestaurantRevenue>>> {
    let stats = AggregationRepo::top_restaurants(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/salesByWeekday
pub async fn sales_by_weekday(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<WeekdaySales>>> {
    let stats = AggregationRepo::sales_by_weekday(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/avgRatingPerRestaurant
pub async fn avg_rating_per_restaurant(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<RestaurantRating>>> {
    let stats = AggregationRepo::avg_rating_per_restaurant(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/avgOrderValue
pub async fn avg_order_value(State(state): State<AppState>) -> AppResult<Json<AvgValueResponse>> {
    let avg_value = AggregationRepo::avg_order_value(&state.pool).await?;
    Ok(Json(AvgValueResponse { avg_value }))
}

/// GET /api/v1/aggregations/complejas/mostPopularTags
pub async fn most_popular_tags(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<TagCount>>> {
    let stats = AggregationRepo::most_popular_tags(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/activePromotions
pub async fn active_promotions(State(state): State<AppState>) -> AppResult<Json<PromosResponse>> {
    let promos = PromotionRepo::list_active(&state.pool, chrono::Utc::now()).await?;
    Ok(Json(PromosResponse { promos }))
}

/// GET /api/v1/aggregations/complejas/avgDeliveryTime
pub async fn avg_delivery_time(State(state): State<AppState>) -> AppResult<Json<AvgTimeResponse>> {
    let avg_time_ms = AggregationRepo::avg_delivery_time_ms(&state.pool).await?;
    Ok(Json(AvgTimeResponse { avg_time_ms }))
}

/// GET /api/v1/aggregations/complejas/ordersPerUser
pub async fn orders_per_user(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<UserOrderCount>>> {
    let stats = AggregationRepo::orders_per_user(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/totalSalesByCategory
pub async fn total_sales_by_category(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<TagSales>>> {
    let stats = AggregationRepo::total_sales_by_category(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

/// GET /api/v1/aggregations/complejas/monthlyNewUsers
pub async fn monthly_new_users(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<MonthlyUsers>>> {
    let stats = AggregationRepo::monthly_new_users(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

// ---------------------------------------------------------------------------
// Array helpers
// ---------------------------------------------------------------------------

/// POST /api/v1/aggregations/arrays/pushTag
pub async fn push_tag(
    State(state): State<AppState>,
    Json(input): Json<TagRequest>,
) -> AppResult<Json<UpdatedResponse<MenuItem>>> {
    let tag = require_tag(&input.tag)?;
    let item = MenuItemRepo::push_tag(&state.pool, input.menu_item_id, tag).await?;
    menu_item_updated(item, input.menu_item_id)
}

/// POST /api/v1/aggregations/arrays/pullTag
pub async fn pull_tag(
    State(state): State<AppState>,
    Json(input): Json<TagRequest>,
) -> AppResult<Json<UpdatedResponse<MenuItem>>> {
    let tag = require_tag(&input.tag)?;
    let item = MenuItemRepo::pull_tag(&state.pool, input.menu_item_id, tag).await?;
    menu_item_updated(item, input.menu_item_id)
}

/// POST /api/v1/aggregations/arrays/addToSet
///
/// Adds a menu item to a promotion unless it is already listed.
pub async fn add_to_set(
    State(state): State<AppState>,
    Json(input): Json<AddToSetRequest>,
) -> AppResult<Json<UpdatedResponse<Promotion>>> {
    if !MenuItemRepo::exists(&state.pool, input.menu_item_id).await? {
        return Err(AppError::not_found("MenuItem", input.menu_item_id));
    }
    let updated = PromotionRepo::add_menu_item(&state.pool, input.promotion_id, input.menu_item_id)
        .await?
        .ok_or(AppError::not_found("Promotion", input.promotion_id))?;
    Ok(Json(UpdatedResponse { updated }))
}

/// POST /api/v1/aggregations/arrays/popFirst
pub async fn pop_first(
    State(state): State<AppState>,
    Json(input): Json<PopFirstRequest>,
) -> AppResult<Json<UpdatedResponse<MenuItem>>> {
    let item = MenuItemRepo::pop_first_tag(&state.pool, input.menu_item_id).await?;
    menu_item_updated(item, input.menu_item_id)
}

/// POST /api/v1/aggregations/arrays/pullAll
pub async fn pull_all(
    State(state): State<AppState>,
    Json(input): Json<PullAllRequest>,
) -> AppResult<Json<UpdatedResponse<MenuItem>>> {
    let item = MenuItemRepo::pull_all_tags(&state.pool, input.menu_item_id, &input.tags).await?;
    menu_item_updated(item, input.menu_item_id)
}

// ---------------------------------------------------------------------------
// Embedded-document helpers
// ---------------------------------------------------------------------------

/// GET /api/v1/aggregations/embedded/userOrders?user_id=
///
/// The user record with an `orders` array embedded.
pub async fn user_orders(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<Json<Value>> {
    let user = find_user(&state, params.user_id).await?;
    let orders = OrderRepo::list_for_user(&state.pool, user.id).await?;

    let mut body = project(&user, None)?;
    if let Value::Object(map) = &mut body {
        map.insert("orders".into(), project(&orders, None)?);
    }
    Ok(Json(body))
}

/// POST /api/v1/aggregations/embedded/addAddress
pub async fn add_address(
    State(state): State<AppState>,
    Json(input): Json<AddAddressRequest>,
) -> AppResult<Json<UpdatedResponse<User>>> {
    require_object("address", &input.address)?;
    let updated = UserRepo::set_address(&state.pool, input.user_id, &input.address)
        .await?
        .ok_or(AppError::not_found("User", input.user_id))?;
    Ok(Json(UpdatedResponse { updated }))
}

/// POST /api/v1/aggregations/embedded/mergeProfile
///
/// `modifiedCount` is 0 when the user does not exist or nothing changed.
pub async fn merge_profile(
    State(state): State<AppState>,
    Json(input): Json<MergeProfileRequest>,
) -> AppResult<Json<ModifiedCountResponse>> {
    require_object("profile_updates", &input.profile_updates)?;
    let modified_count =
        UserRepo::merge_profile(&state.pool, input.user_id, &input.profile_updates).await?;
    Ok(Json(ModifiedCountResponse { modified_count }))
}

/// GET /api/v1/aggregations/embedded/getAddress?user_id=
///
/// The address sub-document itself, or `{}` when none is set.
pub async fn get_address(
    State(state): State<AppState>,
    Query(params): Query<UserIdParams>,
) -> AppResult<Json<Value>> {
    let user = find_user(&state, params.user_id).await?;
    Ok(Json(user.address.unwrap_or_else(|| Value::Object(Map::new()))))
}

/// GET /api/v1/aggregations/embedded/projectOrders
pub async fn project_orders(
    State(state): State<AppState>,
) -> AppResult<Json<StatsResponse<OrderItemsProjection>>> {
    let stats = AggregationRepo::project_order_items(&state.pool).await?;
    Ok(Json(StatsResponse { stats }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn blank_tags_are_rejected() {
        assert!(require_tag("   ").is_err());
        assert_eq!(require_tag(" vegan ").unwrap(), "vegan");
    }

    #[test]
    fn embedded_documents_must_be_objects() {
        assert!(require_object("address", &json!({"city": "Lima"})).is_ok());
        assert!(require_object("address", &json!("Lima")).is_err());
        assert!(require_object("profile_updates", &json!([1])).is_err());
    }

    #[test]
    fn camel_case_envelope_keys() {
        let body = serde_json::to_value(ModifiedCountResponse { modified_count: 1 }).unwrap();
        assert_eq!(body, json!({"modifiedCount": 1}));
        let body = serde_json::to_value(AvgTimeResponse { avg_time_ms: 1500.0 }).unwrap();
        assert_eq!(body, json!({"avgTimeMs": 1500.0}));
    }
}
