//! Review entity model and DTOs.

use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub restaurant_id: DbId,
    pub rating: f64,
    pub comment: String,
    pub reviewed_at: Timestamp,
}

pub static REVIEW_FIELDS: EntityFields = EntityFields {
    entity: "review",
    fields: &["id", "user_id", "restaurant_id", "rating", "comment", "reviewed_at"],
    default_sort: "reviewed_at",
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub user_id: DbId,
    pub restaurant_id: DbId,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<f64>,
    pub comment: Option<String>,
}
