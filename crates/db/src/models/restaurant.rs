//! Restaurant entity model and DTOs.

use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `restaurants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Restaurant {
    pub id: DbId,
    pub name: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
    pub categories: Vec<String>,
    pub created_at: Timestamp,
}

pub static RESTAURANT_FIELDS: EntityFields = EntityFields {
    entity: "restaurant",
    fields: &["id", "name", "address", "longitude", "latitude", "categories", "created_at"],
    default_sort: "created_at",
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRestaurant {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(length(min = 1, message = "at least one category is required"))]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRestaurant {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(length(min = 1, message = "at least one category is required"))]
    pub categories: Option<Vec<String>>,
}
