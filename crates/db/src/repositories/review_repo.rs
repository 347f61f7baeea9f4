//! Repository for the `reviews` table.

use comanda_core::query_spec::QuerySpec;
use comanda_core::review::{normalize_rating, validate_comment, validate_rating};
use comanda_core::types::DbId;
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;

use crate::models::review::{CreateReview, Review, UpdateReview};
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, user_id, restaurant_id, rating, comment, reviewed_at";

/// Provides CRUD operations for reviews.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Field rules plus the one-review-per-restaurant probe.
    pub async fn check_create(pool: &PgPool, input: &CreateReview) -> Result<WriteCheck, sqlx::Error> {
        let check = WriteCheck::from_rule(validate_rating(normalize_rating(input.rating)))
            .and_then(|| WriteCheck::from_rule(validate_comment(&input.comment)));
        if !check.is_ok() {
            return Ok(check);
        }

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND restaurant_id = $2)",
        )
        .bind(input.user_id)
        .bind(input.restaurant_id)
        .fetch_one(pool)
        .await?;

        Ok(if taken {
            WriteCheck::Conflict("User has already reviewed this restaurant".to_string())
        } else {
            WriteCheck::Ok
        })
    }

    pub fn check_update(input: &UpdateReview) -> WriteCheck {
        let rating = input.rating.map(|r| validate_rating(normalize_rating(r)));
        let comment = input.comment.as_deref().map(validate_comment);
        WriteCheck::from_rule(rating.unwrap_or(Ok(())))
            .and_then(|| WriteCheck::from_rule(comment.unwrap_or(Ok(()))))
    }

    /// Insert a review with its rating rounded to one decimal.
    pub async fn create(pool: &PgPool, input: &CreateReview) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews (user_id, restaurant_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(input.user_id)
            .bind(input.restaurant_id)
            .bind(normalize_rating(input.rating))
            .bind(&input.comment)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<Review>, sqlx::Error> {
        fetch_page(pool, "reviews", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews ORDER BY reviewed_at DESC, id DESC");
        sqlx::query_as::<_, Review>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(input.rating.map(normalize_rating))
            .bind(&input.comment)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
