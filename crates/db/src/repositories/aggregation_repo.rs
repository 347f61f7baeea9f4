//! Fixed catalog of read-only reports.
//!
//! Each report is one SQL statement over the live tables; nothing is cached
//! or materialised. Order revenue is always computed from the embedded lines
//! as `unit_price * quantity`.

use comanda_core::order_status::STATUS_DELIVERED;
use comanda_core::types::Money;
use sqlx::PgPool;

use crate::models::aggregation::{
    CategoryCount, MonthlyUsers, OrderItemsProjection, RestaurantRating, RestaurantRevenue,
    TagCount, TagSales, UserOrderCount, WeekdaySales,
};

/// Revenue of one embedded order line (`line` is a `jsonb_array_elements` alias).
const LINE_REVENUE: &str = "(line->>'unit_price')::NUMERIC * (line->>'quantity')::INTEGER";

/// Number of rows returned by the "top N" reports.
pub const TOP_N: i64 = 5;

pub struct AggregationRepo;

impl AggregationRepo {
    // -----------------------------------------------------------------------
    // Simple
    // -----------------------------------------------------------------------

    pub async fn count_users(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn distinct_genders(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT gender FROM users ORDER BY gender")
            .fetch_all(pool)
            .await
    }

    /// Restaurants per category; a restaurant counts once for each of its categories.
    pub async fn count_by_category(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count
             FROM restaurants, unnest(categories) AS category
             GROUP BY category
             ORDER BY count DESC, category",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn distinct_menu_tags(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT tag FROM menu_items, unnest(tags) AS tag ORDER BY tag",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn count_delivered_orders(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
            .bind(STATUS_DELIVERED)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Complex
    // -----------------------------------------------------------------------

    /// The [`TOP_N`] restaurants by line revenue, highest first.
    pub async fn top_restaurants(pool: &PgPool) -> Result<Vec<RestaurantRevenue>, sqlx::Error> {
        let query = format!(
            "SELECT o.restaurant_id, r.name AS restaurant, SUM({LINE_REVENUE}) AS revenue
             FROM orders o
             CROSS JOIN LATERAL jsonb_array_elements(o.items) AS line
             JOIN restaurants r ON r.id = o.restaurant_id
             GROUP BY o.restaurant_id, r.name
             ORDER BY revenue DESC, o.restaurant_id
             LIMIT $1"
        );
        sqlx::query_as::<_, RestaurantRevenue>(&query)
            .bind(TOP_N)
            .fetch_all(pool)
            .await
    }

    /// Line revenue per weekday of `ordered_at` (1 = Sunday ... 7 = Saturday).
    pub async fn sales_by_weekday(pool: &PgPool) -> Result<Vec<WeekdaySales>, sqlx::Error> {
        let query = format!(
            "SELECT (EXTRACT(DOW FROM o.ordered_at)::INTEGER + 1) AS weekday,
                    SUM({LINE_REVENUE}) AS sales
             FROM orders o
             CROSS JOIN LATERAL jsonb_array_elements(o.items) AS line
             GROUP BY weekday
             ORDER BY weekday"
        );
        sqlx::query_as::<_, WeekdaySales>(&query).fetch_all(pool).await
    }

    /// Mean rating of every restaurant with at least one review, best first.
    pub async fn avg_rating_per_restaurant(
        pool: &PgPool,
    ) -> Result<Vec<RestaurantRating>, sqlx::Error> {
        sqlx::query_as::<_, RestaurantRating>(
            "SELECT r.id AS restaurant_id, r.name AS restaurant, AVG(v.rating) AS avg_rating
             FROM restaurants r
             JOIN reviews v ON v.restaurant_id = r.id
             GROUP BY r.id, r.name
             ORDER BY avg_rating DESC, r.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Mean order total, zero when there are no orders.
    pub async fn avg_order_value(pool: &PgPool) -> Result<Money, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(AVG(total), 0)::NUMERIC(12, 2) FROM orders")
            .fetch_one(pool)
            .await
    }

    /// The [`TOP_N`] tags by number of menu items carrying them.
    pub async fn most_popular_tags(pool: &PgPool) -> Result<Vec<TagCount>, sqlx::Error> {
        sqlx::query_as::<_, TagCount>(
            "SELECT tag, COUNT(*) AS count
             FROM menu_items, unnest(tags) AS tag
             GROUP BY tag
             ORDER BY count DESC, tag
             LIMIT $1",
        )
        .bind(TOP_N)
        .fetch_all(pool)
        .await
    }

    /// Mean preparation-to-delivery time in milliseconds over orders that
    /// have both timestamps; zero when there are none.
    pub async fn avg_delivery_time_ms(pool: &PgPool) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(
                AVG(EXTRACT(EPOCH FROM (delivered_at - preparation_started_at)) * 1000),
                0)::DOUBLE PRECISION
             FROM orders
             WHERE delivered_at IS NOT NULL AND preparation_started_at IS NOT NULL",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn orders_per_user(pool: &PgPool) -> Result<Vec<UserOrderCount>, sqlx::Error> {
        sqlx::query_as::<_, UserOrderCount>(
            "SELECT user_id, COUNT(*) AS count
             FROM orders
             GROUP BY user_id
             ORDER BY count DESC, user_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Line revenue attributed to every tag of the line's menu item.
    ///
    /// Lines whose menu item has since been deleted are skipped.
    pub async fn total_sales_by_category(pool: &PgPool) -> Result<Vec<TagSales>, sqlx::Error> {
        let query = format!(
            "SELECT tag, SUM({LINE_REVENUE}) AS total_sales
             FROM orders o
             CROSS JOIN LATERAL jsonb_array_elements(o.items) AS line
             JOIN menu_items m ON m.id = (line->>'menu_item_id')::BIGINT
             CROSS JOIN LATERAL unnest(m.tags) AS tag
             GROUP BY tag
             ORDER BY total_sales DESC, tag"
        );
        sqlx::query_as::<_, TagSales>(&query).fetch_all(pool).await
    }

    /// New users per calendar month (UTC), oldest month first.
    pub async fn monthly_new_users(pool: &PgPool) -> Result<Vec<MonthlyUsers>, sqlx::Error> {
        sqlx::query_as::<_, MonthlyUsers>(
            "SELECT EXTRACT(YEAR FROM registered_at AT TIME ZONE 'UTC')::INTEGER AS year,
                    EXTRACT(MONTH FROM registered_at AT TIME ZONE 'UTC')::INTEGER AS month,
                    COUNT(*) AS count
             FROM users
             GROUP BY year, month
             ORDER BY year, month",
        )
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Embedded documents
    // -----------------------------------------------------------------------

    /// `user_id` and embedded lines of every order.
    pub async fn project_order_items(
        pool: &PgPool,
    ) -> Result<Vec<OrderItemsProjection>, sqlx::Error> {
        sqlx::query_as::<_, OrderItemsProjection>(
            "SELECT user_id, items FROM orders ORDER BY ordered_at DESC, id DESC",
        )
        .fetch_all(pool)
        .await
    }
}
