//! Promotion entity model and DTOs.

use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `promotions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Promotion {
    pub id: DbId,
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub kind: String,
    pub menu_item_ids: Vec<DbId>,
    pub discount: Option<f64>,
}

pub static PROMOTION_FIELDS: EntityFields = EntityFields {
    entity: "promotion",
    fields: &["id", "name", "starts_at", "ends_at", "kind", "menu_item_ids", "discount"],
    default_sort: "starts_at",
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePromotion {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub kind: String,
    #[serde(default)]
    pub menu_item_ids: Vec<DbId>,
    pub discount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePromotion {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub kind: Option<String>,
    pub menu_item_ids: Option<Vec<DbId>>,
    pub discount: Option<f64>,
}
