//! Repository for the `payments` table.

use comanda_core::payment::{self, DEFAULT_STATUS};
use comanda_core::query_spec::QuerySpec;
use comanda_core::types::DbId;
use comanda_core::write_check::WriteCheck;
use sqlx::PgPool;

use crate::models::payment::{CreatePayment, Payment, UpdatePayment};
use crate::query::{fetch_page, Page};

const COLUMNS: &str = "id, user_id, order_id, amount, method, status, paid_at";

/// Provides CRUD operations for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    pub fn check_create(input: &CreatePayment) -> WriteCheck {
        WriteCheck::from_rule(payment::validate_amount(input.amount))
            .and_then(|| WriteCheck::from_rule(payment::validate_method(&input.method)))
            .and_then(|| match &input.status {
                Some(status) => WriteCheck::from_rule(payment::validate_status(status)),
                None => WriteCheck::Ok,
            })
    }

    pub fn check_update(input: &UpdatePayment) -> WriteCheck {
        let mut check = WriteCheck::Ok;
        if let Some(amount) = input.amount {
            check = check.and_then(|| WriteCheck::from_rule(payment::validate_amount(amount)));
        }
        if let Some(method) = &input.method {
            check = check.and_then(|| WriteCheck::from_rule(payment::validate_method(method)));
        }
        if let Some(status) = &input.status {
            check = check.and_then(|| WriteCheck::from_rule(payment::validate_status(status)));
        }
        check
    }

    pub async fn create(pool: &PgPool, input: &CreatePayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (user_id, order_id, amount, method, status, paid_at)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(input.order_id)
            .bind(input.amount)
            .bind(&input.method)
            .bind(input.status.as_deref().unwrap_or(DEFAULT_STATUS))
            .bind(input.paid_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, spec: &QuerySpec) -> Result<Page<Payment>, sqlx::Error> {
        fetch_page(pool, "payments", COLUMNS, spec).await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments ORDER BY paid_at DESC, id DESC");
        sqlx::query_as::<_, Payment>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePayment,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET
                amount = COALESCE($2, amount),
                method = COALESCE($3, method),
                status = COALESCE($4, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(input.amount)
            .bind(&input.method)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
