//! Order line pricing from authoritative menu prices.
//!
//! Clients only say *which* menu items they want and how many. Names and
//! prices always come from the menu rows as they are right now.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Money};

/// Maximum quantity accepted for a single line.
pub const MAX_LINE_QUANTITY: i32 = 1_000;

/// A line as requested by the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestedItem {
    pub menu_item_id: DbId,
    pub quantity: i32,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

/// The subset of a menu item needed to price a line.
#[derive(Debug, Clone)]
pub struct MenuPrice {
    pub id: DbId,
    pub restaurant_id: DbId,
    pub name: String,
    pub price: Money,
    pub available: bool,
}

/// A priced line as stored inside `orders.items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: DbId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i32,
    pub line_total: Money,
    #[serde(default)]
    pub special_instructions: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

/// Distinct menu item ids referenced by a request, in first-seen order.
pub fn referenced_ids(requested: &[RequestedItem]) -> Vec<DbId> {
    let mut ids: Vec<DbId> = Vec::with_capacity(requested.len());
    for item in requested {
        if !ids.contains(&item.menu_item_id) {
            ids.push(item.menu_item_id);
        }
    }
    ids
}

/// Price `requested` against the current `menu` rows of `restaurant_id`.
///
/// The whole request is rejected if any line references an item that is
/// missing, belongs to another restaurant, or is unavailable.
pub fn price_items(
    restaurant_id: DbId,
    requested: &[RequestedItem],
    menu: &[MenuPrice],
) -> Result<PricedOrder, CoreError> {
    if requested.is_empty() {
        return Err(CoreError::Validation(
            "An order needs at least one item".to_string(),
        ));
    }

    let by_id: HashMap<DbId, &MenuPrice> = menu
        .iter()
        .filter(|m| m.restaurant_id == restaurant_id && m.available)
        .map(|m| (m.id, m))
        .collect();

    let mut unavailable: Vec<DbId> = Vec::new();
    let mut lines = Vec::with_capacity(requested.len());
    let mut total = Money::ZERO;

    for item in requested {
        if item.quantity < 1 || item.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::Validation(format!(
                "Quantity for menu item {} must be between 1 and {MAX_LINE_QUANTITY}",
                item.menu_item_id
            )));
        }

        let Some(menu_item) = by_id.get(&item.menu_item_id) else {
            if !unavailable.contains(&item.menu_item_id) {
                unavailable.push(item.menu_item_id);
            }
            continue;
        };

        let line_total = menu_item.price * Money::from(item.quantity);
        total += line_total;
        lines.push(OrderLine {
            menu_item_id: menu_item.id,
            name: menu_item.name.clone(),
            unit_price: menu_item.price,
            quantity: item.quantity,
            line_total,
            special_instructions: item.special_instructions.clone().unwrap_or_default(),
        });
    }

    if !unavailable.is_empty() {
        return Err(CoreError::Validation(format!(
            "Some items are unavailable or do not exist: {unavailable:?}"
        )));
    }

    Ok(PricedOrder { lines, total })
}
