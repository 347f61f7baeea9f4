//! Repository for the `restaurants` table.

use comanda_core::query_spec::QuerySpec;
use comanda_core::types::DbId;
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;
use validator::Validate;

use crate::models::restaurant::{CreateRestaurant, Restaurant, UpdateRestaurant};
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, name, address, longitude, latitude, categories, created_at";

/// Provides CRUD operations for restaurants.
pub struct RestaurantRepo;

impl RestaurantRepo {
    pub async fn check_create(
        pool: &PgPool,
        input: &CreateRestaurant,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate());
        if !check.is_ok() {
            return Ok(check);
        }
        Self::check_name_address(pool, &input.name, &input.address, None).await
    }

    /// Validates the patch and, when the name or address changes, probes the
    /// merged (name, address) pair. A missing row passes; the update reports it.
    pub async fn check_update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRestaurant,
    ) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_validation(input.validate());
        if !check.is_ok() || (input.name.is_none() && input.address.is_none()) {
            return Ok(check);
        }

        let Some(existing) = Self::find_by_id(pool, id).await? else {
            return Ok(WriteCheck::Ok);
        };
        let name = input.name.as_deref().unwrap_or(&existing.name);
        let address = input.address.as_deref().unwrap_or(&existing.address);
        Self::check_name_address(pool, name, address, Some(id)).await
    }

    async fn check_name_address(
        pool: &PgPool,
        name: &str,
        address: &str,
        exclude_id: Option<DbId>,
    ) -> Result<WriteCheck, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM restaurants
                WHERE name = $1 AND address = $2 AND ($3::BIGINT IS NULL OR id <> $3))",
        )
        .bind(name)
        .bind(address)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(if taken {
            WriteCheck::Conflict(format!(
                "A restaurant named '{name}' already exists at '{address}'"
            ))
        } else {
            WriteCheck::Ok
        })
    }

    /// Insert a new restaurant, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRestaurant) -> Result<Restaurant, sqlx::Error> {
        let query = format!(
            "INSERT INTO restaurants (name, address, longitude, latitude, categories)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(&input.categories)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants WHERE id = $1");
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<Restaurant>, sqlx::Error> {
        fetch_page(pool, "restaurants", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Restaurant>(&query).fetch_all(pool).await
    }

    /// Update a restaurant. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRestaurant,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        let query = format!(
            "UPDATE restaurants SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                longitude = COALESCE($4, longitude),
                latitude = COALESCE($5, latitude),
                categories = COALESCE($6, categories)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Restaurant>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.longitude)
            .bind(input.latitude)
            .bind(&input.categories)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
