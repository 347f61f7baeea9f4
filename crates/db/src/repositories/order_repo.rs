//! Repository for the `orders` table.
//!
//! Status and item writes are conditional on the status the caller
//! validated against, so a concurrent transition makes them match no row
//! instead of overwriting a newer state.

use comanda_core::order_pricing::PricedOrder;
use comanda_core::order_status::{OrderStatus, StatusChange, STATUS_PENDING};
use comanda_core::query_spec::QuerySpec;
use comanda_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::order::Order;
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, user_id, restaurant_id, status, ordered_at, \
                        preparation_started_at, delivered_at, items, total";

/// Provides CRUD and lifecycle operations for orders.
pub struct OrderRepo;

impl OrderRepo {
    /// Insert a new `pending` order with already-priced lines.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        restaurant_id: DbId,
        priced: &PricedOrder,
    ) -> Result<Order, sqlx::Error> {
        let query = format!(
            "INSERT INTO orders (user_id, restaurant_id, status, items, total)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .bind(restaurant_id)
            .bind(STATUS_PENDING)
            .bind(Json(&priced.lines))
            .bind(priced.total)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<Order>, sqlx::Error> {
        fetch_page(pool, "orders", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders ORDER BY ordered_at DESC, id DESC");
        sqlx::query_as::<_, Order>(&query).fetch_all(pool).await
    }

    /// All orders of one user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY ordered_at DESC, id DESC"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Move an order to `change.status`, stamping lifecycle timestamps.
    ///
    /// Returns `None` if the order is gone or no longer in `from`.
    pub async fn apply_status(
        pool: &PgPool,
        id: DbId,
        from: OrderStatus,
        change: &StatusChange,
    ) -> Result<Option<Order>, sqlx::Error> {
        Self::apply_update(pool, id, from, None, Some(change)).await
    }

    /// Replace the lines and total of a `pending` order.
    ///
    /// Returns `None` if the order does not exist or is not pending.
    pub async fn replace_items(
        pool: &PgPool,
        id: DbId,
        priced: &PricedOrder,
    ) -> Result<Option<Order>, sqlx::Error> {
        Self::apply_update(pool, id, OrderStatus::Pending, Some(priced), None).await
    }

    /// Write new lines and/or a status change in one statement, guarded on
    /// the order still being in `from`. Either both parts land or neither.
    pub async fn apply_update(
        pool: &PgPool,
        id: DbId,
        from: OrderStatus,
        priced: Option<&PricedOrder>,
        change: Option<&StatusChange>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET
                items = COALESCE($3, items),
                total = COALESCE($4, total),
                status = COALESCE($5, status),
                preparation_started_at =
                    CASE WHEN $6 THEN NOW() ELSE preparation_started_at END,
                delivered_at = CASE WHEN $7 THEN NOW() ELSE delivered_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(priced.map(|p| Json(&p.lines)))
            .bind(priced.map(|p| p.total))
            .bind(change.map(|c| c.status.as_str()))
            .bind(change.is_some_and(|c| c.stamp_preparation_started))
            .bind(change.is_some_and(|c| c.stamp_delivered))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
