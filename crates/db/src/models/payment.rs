//! Payment entity model and DTOs.

use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub user_id: DbId,
    pub order_id: DbId,
    pub amount: Money,
    pub method: String,
    pub status: String,
    pub paid_at: Timestamp,
}

pub static PAYMENT_FIELDS: EntityFields = EntityFields {
    entity: "payment",
    fields: &["id", "user_id", "order_id", "amount", "method", "status", "paid_at"],
    default_sort: "paid_at",
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub user_id: DbId,
    pub order_id: DbId,
    pub amount: Money,
    pub method: String,
    /// Defaults to `completed`.
    pub status: Option<String>,
    pub paid_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePayment {
    pub amount: Option<Money>,
    pub method: Option<String>,
    pub status: Option<String>,
}
