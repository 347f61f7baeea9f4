//! Result rows of the fixed reporting catalog.

use comanda_core::order_pricing::OrderLine;
use comanda_core::types::{DbId, Money};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RestaurantRevenue {
    pub restaurant_id: DbId,
    pub restaurant: String,
    pub revenue: Money,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeekdaySales {
    /// 1 = Sunday ... 7 = Saturday.
    pub weekday: i32,
    pub sales: Money,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RestaurantRating {
    pub restaurant_id: DbId,
    pub restaurant: String,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserOrderCount {
    pub user_id: DbId,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagSales {
    pub tag: String,
    pub total_sales: Money,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthlyUsers {
    pub year: i32,
    pub month: i32,
    pub count: i64,
}

/// `user_id` + `items` projection of an order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItemsProjection {
    pub user_id: DbId,
    pub items: Json<Vec<OrderLine>>,
}
