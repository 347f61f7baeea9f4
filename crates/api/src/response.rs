//! Shared response envelope types for API handlers.
//!
//! Single records are returned raw. Lists, reports and helpers use the small
//! named envelopes below so the JSON keys stay identical across handlers.

use axum::Json;
use comanda_core::projection::Projection;
use comanda_db::query::Page;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// `{ "stats": [..] }`, the shape of most reports.
#[derive(Debug, Serialize)]
pub struct StatsResponse<T: Serialize> {
    pub stats: Vec<T>,
}

/// `{ "total": n }`.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: i64,
}

/// `{ "updated": record }`, returned by the array and embedded helpers.
#[derive(Debug, Serialize)]
pub struct UpdatedResponse<T: Serialize> {
    pub updated: T,
}

fn to_value<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Serialization error: {e}")))
}

/// Serialize one record, keeping only the projected fields.
pub fn project<T: Serialize>(record: &T, projection: Option<&Projection>) -> AppResult<Value> {
    let value = to_value(record)?;
    Ok(match projection {
        Some(projection) => projection.apply(value),
        None => value,
    })
}

/// Build `{ "total", "totalPages", "page", "<items_key>": [..] }`.
pub fn paginated<T: Serialize>(
    items_key: &'static str,
    page: Page<T>,
    projection: Option<&Projection>,
) -> AppResult<Json<Value>> {
    let items = page
        .items
        .iter()
        .map(|item| project(item, projection))
        .collect::<AppResult<Vec<_>>>()?;

    let mut body = Map::new();
    body.insert("total".into(), page.total.into());
    body.insert("totalPages".into(), page.total_pages.into());
    body.insert("page".into(), page.page.into());
    body.insert(items_key.into(), Value::Array(items));
    Ok(Json(Value::Object(body)))
}

#[cfg(test)]
mod tests {
    use comanda_core::query_spec::EntityFields;
    use serde_json::json;

    use super::*;

    static ROWS: EntityFields = EntityFields {
        entity: "row",
        fields: &["id", "name", "size"],
        default_sort: "id",
    };

    #[derive(Serialize)]
    struct Row {
        id: i64,
        name: &'static str,
        size: i32,
    }

    #[test]
    fn envelope_uses_the_given_items_key() {
        let page = Page {
            items: vec![Row { id: 1, name: "a", size: 3 }],
            total: 11,
            page: 2,
            total_pages: 2,
        };
        let Json(body) = paginated("rows", page, None).unwrap();
        assert_eq!(
            body,
            json!({"total": 11, "totalPages": 2, "page": 2, "rows": [{"id": 1, "name": "a", "size": 3}]})
        );
    }

    #[test]
    fn projection_is_applied_to_every_item() {
        let projection = Projection::parse("size", &ROWS).unwrap();
        let page = Page {
            items: vec![Row { id: 1, name: "a", size: 3 }, Row { id: 2, name: "b", size: 4 }],
            total: 2,
            page: 1,
            total_pages: 1,
        };
        let Json(body) = paginated("rows", page, projection.as_ref()).unwrap();
        assert_eq!(body["rows"], json!([{"id": 1, "size": 3}, {"id": 2, "size": 4}]));
    }
}
