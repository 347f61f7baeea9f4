//! Repository for the `menu_items` table, including the tag-array helpers.

use comanda_core::order_pricing::MenuPrice;
use comanda_core::query_spec::QuerySpec;
use comanda_core::types::{DbId, Money};
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;
use validator::Validate;

use crate::models::menu_item::{CreateMenuItem, MenuItem, UpdateMenuItem};
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, restaurant_id, name, description, price, available, tags, created_at";

/// Provides CRUD operations for menu items.
pub struct MenuItemRepo;

fn check_price(price: Option<Money>) -> WriteCheck {
    match price {
        Some(p) if p < Money::ZERO => WriteCheck::Invalid(format!("price: must not be negative, got {p}")),
        _ => WriteCheck::Ok,
    }
}

impl MenuItemRepo {
    pub async fn check_create(
        pool: &PgPool,
        input: &CreateMenuItem,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check =
            WriteCheck::from_validation(input.validate()).and_then(|| check_price(Some(input.price)));
        if !check.is_ok() {
            return Ok(check);
        }
        Self::check_name(pool, input.restaurant_id, &input.name, None).await
    }

    pub async fn check_update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMenuItem,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate()).and_then(|| check_price(input.price));
        let Some(name) = input.name.as_deref() else {
            return Ok(check);
        };
        if !check.is_ok() {
            return Ok(check);
        }

        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(WriteCheck::Ok);
        };
        Self::check_name(pool, existing.restaurant_id, name, Some(id)).await
    }

    async fn check_name(
        pool: &PgPool,
        restaurant_id: DbId,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<WriteCheck, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM menu_items
                WHERE restaurant_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
        )
        .bind(restaurant_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(if taken {
            WriteCheck::Conflict(format!(
                "Restaurant {restaurant_id} already has a menu item named '{name}'"
            ))
        } else {
            WriteCheck::Ok
        })
    }

    pub async fn create(pool: &PgPool, input: &CreateMenuItem) -> Result<MenuItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO menu_items (restaurant_id, name, description, price, available, tags)
             VALUES ($1, $2, $3, $4, COALESCE($5, TRUE), COALESCE($6, '{{}}'::TEXT[]))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(input.restaurant_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.available)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<MenuItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menu_items WHERE id = $1");
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM menu_items WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Those of `ids` that have no menu item row, in input order.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT wanted.id
             FROM unnest($1::BIGINT[]) WITH ORDINALITY AS wanted(id, ord)
             WHERE NOT EXISTS (SELECT 1 FROM menu_items m WHERE m.id = wanted.id)
             ORDER BY wanted.ord",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Current prices for the given menu items, for order pricing.
    pub async fn find_prices(pool: &PgPool, ids: &[DbId]) -> Result<Vec<MenuPrice>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menu_items WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, MenuItem>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(MenuPrice::from).collect())
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<MenuItem>, sqlx::Error> {
        fetch_page(pool, "menu_items", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<MenuItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menu_items ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, MenuItem>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMenuItem,
    ) -> Result<Option<MenuItem>, sqlx::Error> {
        let query = format!(
            "UPDATE menu_items SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                available = COALESCE($5, available),
                tags = COALESCE($6, tags)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.available)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Tag array helpers (single-statement, atomic)
    // -----------------------------------------------------------------------

    /// Append `tag` to the item's tags.
    pub async fn push_tag(pool: &PgPool, id: DbId, tag: &str) -> Result<Option<MenuItem>, sqlx::Error> {
        let query =
            format!("UPDATE menu_items SET tags = array_append(tags, $2) WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    /// Remove every occurrence of `tag`.
    pub async fn pull_tag(pool: &PgPool, id: DbId, tag: &str) -> Result<Option<MenuItem>, sqlx::Error> {
        let query =
            format!("UPDATE menu_items SET tags = array_remove(tags, $2) WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    /// Drop the first tag, if any.
    pub async fn pop_first_tag(pool: &PgPool, id: DbId) -> Result<Option<MenuItem>, sqlx::Error> {
        let query = format!(
            "UPDATE menu_items SET tags = COALESCE(tags[2:], '{{}}'::TEXT[])
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Remove every occurrence of each of `tags`, keeping the order of the rest.
    pub async fn pull_all_tags(
        pool: &PgPool,
        id: DbId,
        tags: &[String],
    ) -> Result<Option<MenuItem>, sqlx::Error> {
        let query = format!(
            "UPDATE menu_items SET tags = ARRAY(
                SELECT t FROM unnest(tags) WITH ORDINALITY AS u(t, ord)
                WHERE t <> ALL($2)
                ORDER BY ord)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MenuItem>(&query)
            .bind(id)
            .bind(tags)
            .fetch_optional(pool)
            .await
    }
}
