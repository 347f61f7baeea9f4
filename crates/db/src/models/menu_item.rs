//! Menu item entity model and DTOs.

use comanda_core::order_pricing::MenuPrice;
use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `menu_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MenuItem {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub available: bool,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

impl From<MenuItem> for MenuPrice {
    fn from(item: MenuItem) -> Self {
        MenuPrice {
            id: item.id,
            restaurant_id: item.restaurant_id,
            name: item.name,
            price: item.price,
            available: item.available,
        }
    }
}

pub static MENU_ITEM_FIELDS: EntityFields = EntityFields {
    entity: "menu item",
    fields: &[
        "id",
        "restaurant_id",
        "name",
        "description",
        "price",
        "available",
        "tags",
        "created_at",
    ],
    default_sort: "created_at",
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMenuItem {
    pub restaurant_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub price: Money,
    pub available: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMenuItem {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    pub price: Option<Money>,
    pub available: Option<bool>,
    pub tags: Option<Vec<String>>,
}
