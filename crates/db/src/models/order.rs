//! Order entity model and DTOs.

use comanda_core::error::CoreError;
use comanda_core::order_pricing::{OrderLine, RequestedItem};
use comanda_core::order_status::OrderStatus;
use comanda_core::query_spec::EntityFields;
use comanda_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub restaurant_id: DbId,
    pub status: String,
    pub ordered_at: Timestamp,
    pub preparation_started_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub items: Json<Vec<OrderLine>>,
    pub total: Money,
}

impl Order {
    /// Parse the stored status string.
    pub fn lifecycle_status(&self) -> Result<OrderStatus, CoreError> {
        self.status.parse().map_err(|_| {
            CoreError::Internal(format!(
                "Order {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }
}

pub static ORDER_FIELDS: EntityFields = EntityFields {
    entity: "order",
    fields: &[
        "id",
        "user_id",
        "restaurant_id",
        "status",
        "ordered_at",
        "preparation_started_at",
        "delivered_at",
        "items",
        "total",
    ],
    default_sort: "ordered_at",
};

/// DTO for creating an order. `user_id` is only honoured for admins;
/// everyone else orders for themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrder {
    pub user_id: Option<DbId>,
    pub restaurant_id: DbId,
    pub items: Vec<RequestedItem>,
}

/// DTO for `PUT /orders/{id}`. Each field goes through the lifecycle guards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    pub status: Option<String>,
    pub items: Option<Vec<RequestedItem>>,
}

/// DTO for `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: String,
}

/// DTO for `PUT /orders/{id}/items`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderItems {
    pub items: Vec<RequestedItem>,
}

/// One item of an order bulk update.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusChange {
    pub id: DbId,
    pub status: String,
}
