//! Repository for the `promotions` table.

use comanda_core::promotion;
use comanda_core::query_spec::QuerySpec;
use comanda_core::types::{DbId, Timestamp};
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;
use validator::Validate;

use crate::models::promotion::{CreatePromotion, Promotion, UpdatePromotion};
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, name, starts_at, ends_at, kind, menu_item_ids, discount";

/// Provides CRUD operations for promotions.
pub struct PromotionRepo;

/// Kind, discount and window rules over a complete set of values.
fn check_rules(kind: &str, discount: Option<f64>, starts_at: Timestamp, ends_at: Timestamp) -> WriteCheck {
    WriteCheck::from_rule(promotion::validate_kind(kind))
        .and_then(|| WriteCheck::from_rule(promotion::validate_discount(kind, discount)))
        .and_then(|| WriteCheck::from_rule(promotion::validate_window(starts_at, ends_at)))
}

impl PromotionRepo {
    /// Promotions have no natural key, so this never reports a conflict.
    pub fn check_create(input: &CreatePromotion) -> WriteCheck {
        WriteCheck::from_validation(input.validate())
            .and_then(|| check_rules(&input.kind, input.discount, input.starts_at, input.ends_at))
    }

    /// Validates the patch merged over the stored row, since the discount
    /// and window rules span several fields.
    pub async fn check_update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePromotion,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate());
        if !check.is_ok() {
            return Ok(check);
        }
        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(WriteCheck::Ok);
        };

        Ok(check_rules(
            input.kind.as_deref().unwrap_or(&existing.kind),
            input.discount.or(existing.discount),
            input.starts_at.unwrap_or(existing.starts_at),
            input.ends_at.unwrap_or(existing.ends_at),
        ))
    }

    pub async fn create(pool: &PgPool, input: &CreatePromotion) -> Result<Promotion, sqlx::Error> {
        let query = format!(
            "INSERT INTO promotions (name, starts_at, ends_at, kind, menu_item_ids, discount)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Promotion>(&query)
            .bind(&input.name)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.kind)
            .bind(&input.menu_item_ids)
            .bind(input.discount)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Promotion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promotions WHERE id = $1");
        sqlx::query_as::<_, Promotion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<Promotion>, sqlx::Error> {
        fetch_page(pool, "promotions", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Promotion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM promotions ORDER BY starts_at DESC, id DESC");
        sqlx::query_as::<_, Promotion>(&query).fetch_all(pool).await
    }

    /// Promotions whose window contains `now`.
    pub async fn list_active(pool: &PgPool, now: Timestamp) -> Result<Vec<Promotion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM promotions
             WHERE starts_at <= $1 AND ends_at >= $1
             ORDER BY starts_at DESC, id DESC"
        );
        sqlx::query_as::<_, Promotion>(&query)
            .bind(now)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePromotion,
    ) -> Result<Option<Promotion>, sqlx::Error> {
        let query = format!(
            "UPDATE promotions SET
                name = COALESCE($2, name),
                starts_at = COALESCE($3, starts_at),
                ends_at = COALESCE($4, ends_at),
                kind = COALESCE($5, kind),
                menu_item_ids = COALESCE($6, menu_item_ids),
                discount = COALESCE($7, discount)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Promotion>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(&input.kind)
            .bind(&input.menu_item_ids)
            .bind(input.discount)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Add `menu_item_id` to the promotion unless it is already listed.
    pub async fn add_menu_item(
        pool: &PgPool,
        id: DbId,
        menu_item_id: DbId,
    ) -> Result<Option<Promotion>, sqlx::Error> {
        let query = format!(
            "UPDATE promotions SET menu_item_ids = CASE
                WHEN $2 = ANY(menu_item_ids) THEN menu_item_ids
                ELSE array_append(menu_item_ids, $2)
             END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Promotion>(&query)
            .bind(id)
            .bind(menu_item_id)
            .fetch_optional(pool)
            .await
    }
}
