//! Query-string parameter types for list endpoints.
//!
//! Each struct mirrors one entity's documented filters and converts itself
//! into a [`QuerySpec`] exactly once per request.

use chrono::Utc;
use comanda_core::error::CoreError;
use comanda_core::order_status::OrderStatus;
use comanda_core::query_spec::{EntityFields, Filter, FilterValue, QuerySpec, QuerySpecBuilder};
use comanda_core::types::{DbId, Timestamp};
use comanda_db::models::menu_item::MENU_ITEM_FIELDS;
use comanda_db::models::order::ORDER_FIELDS;
use comanda_db::models::payment::PAYMENT_FIELDS;
use comanda_db::models::promotion::PROMOTION_FIELDS;
use comanda_db::models::restaurant::RESTAURANT_FIELDS;
use comanda_db::models::review::REVIEW_FIELDS;
use comanda_db::models::user::USER_FIELDS;
use serde::Deserialize;

fn base(
    fields: &'static EntityFields,
    page: Option<i64>,
    limit: Option<i64>,
    sort_by: Option<&str>,
    order: Option<&str>,
    projection: Option<&str>,
) -> QuerySpecBuilder {
    QuerySpec::builder(fields)
        .paginate(page, limit)
        .sort(sort_by, order)
        .project(projection)
}

fn eq_int(column: &'static str) -> impl FnOnce(i64) -> Filter {
    move |v| Filter::Eq { column, value: FilterValue::Int(v) }
}

fn eq_text(column: &'static str) -> impl FnOnce(String) -> Filter {
    move |v| Filter::Eq { column, value: FilterValue::Text(v) }
}

fn parse_status(status: Option<&str>) -> Result<Option<OrderStatus>, CoreError> {
    status.map(str::parse).transpose()
}

/// `sort=newest|oldest` on the order listings.
fn order_direction(sort: Option<&str>) -> Result<&'static str, CoreError> {
    match sort {
        None | Some("newest") => Ok("desc"),
        Some("oldest") => Ok("asc"),
        Some(other) => Err(CoreError::Validation(format!(
            "Invalid sort '{other}'. Must be 'newest' or 'oldest'"
        ))),
    }
}

/// `?name=&age=&gender=` plus paging, sorting and projection.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
}

impl UserListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        base(
            &USER_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.name.clone(), |v| Filter::Contains { column: "name", value: v })
        .filter_opt(self.age, eq_int("age"))
        .filter_opt(self.gender.clone(), eq_text("gender"))
        .build()
    }
}

/// `?name=&category=`.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
}

impl RestaurantListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        base(
            &RESTAURANT_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.name.clone(), |v| Filter::Contains { column: "name", value: v })
        .filter_opt(self.category.clone(), |v| Filter::HasElement {
            column: "categories",
            value: v,
        })
        .build()
    }
}

/// `?name=&available=&tag=&restaurant_id=`.
#[derive(Debug, Default, Deserialize)]
pub struct MenuListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub name: Option<String>,
    pub available: Option<bool>,
    pub tag: Option<String>,
    pub restaurant_id: Option<DbId>,
}

impl MenuListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        base(
            &MENU_ITEM_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.name.clone(), |v| Filter::Contains { column: "name", value: v })
        .filter_opt(self.available, |v| Filter::Eq {
            column: "available",
            value: FilterValue::Bool(v),
        })
        .filter_opt(self.tag.clone(), |v| Filter::HasElement { column: "tags", value: v })
        .filter_opt(self.restaurant_id, eq_int("restaurant_id"))
        .build()
    }
}

/// `?kind=&active=true`.
#[derive(Debug, Default, Deserialize)]
pub struct PromotionListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub kind: Option<String>,
    pub active: Option<bool>,
}

impl PromotionListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        let mut builder = base(
            &PROMOTION_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.kind.clone(), eq_text("kind"));

        if self.active == Some(true) {
            let now = Utc::now();
            builder = builder
                .filter(Filter::Lte { column: "starts_at", value: FilterValue::Timestamp(now) })
                .filter(Filter::Gte { column: "ends_at", value: FilterValue::Timestamp(now) });
        }
        builder.build()
    }
}

/// `?user_id=&restaurant_id=&status=&start_date=&end_date=`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub user_id: Option<DbId>,
    pub restaurant_id: Option<DbId>,
    pub status: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

impl OrderListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        let status = parse_status(self.status.as_deref())?;
        base(
            &ORDER_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.user_id, eq_int("user_id"))
        .filter_opt(self.restaurant_id, eq_int("restaurant_id"))
        .filter_opt(status, |s| Filter::Eq {
            column: "status",
            value: FilterValue::Text(s.as_str().to_string()),
        })
        .filter_opt(self.start_date, |v| Filter::Gte {
            column: "ordered_at",
            value: FilterValue::Timestamp(v),
        })
        .filter_opt(self.end_date, |v| Filter::Lte {
            column: "ordered_at",
            value: FilterValue::Timestamp(v),
        })
        .build()
    }
}

/// `GET /orders/my-orders`: `?status=&sort=newest|oldest&page=&limit=`.
#[derive(Debug, Default, Deserialize)]
pub struct MyOrdersParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl MyOrdersParams {
    pub fn to_spec(&self, user_id: DbId) -> Result<QuerySpec, CoreError> {
        let status = parse_status(self.status.as_deref())?;
        QuerySpec::builder(&ORDER_FIELDS)
            .paginate(self.page, self.limit)
            .sort(Some("ordered_at"), Some(order_direction(self.sort.as_deref())?))
            .filter(Filter::Eq { column: "user_id", value: FilterValue::Int(user_id) })
            .filter_opt(status, |s| Filter::Eq {
                column: "status",
                value: FilterValue::Text(s.as_str().to_string()),
            })
            .build()
    }
}

/// `GET /orders/restaurant/{id}`: `?status=&start_date=&end_date=&sort=&page=&limit=`.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantOrdersParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

impl RestaurantOrdersParams {
    pub fn to_spec(&self, restaurant_id: DbId) -> Result<QuerySpec, CoreError> {
        let status = parse_status(self.status.as_deref())?;
        QuerySpec::builder(&ORDER_FIELDS)
            .paginate(self.page, self.limit)
            .sort(Some("ordered_at"), Some(order_direction(self.sort.as_deref())?))
            .filter(Filter::Eq { column: "restaurant_id", value: FilterValue::Int(restaurant_id) })
            .filter_opt(status, |s| Filter::Eq {
                column: "status",
                value: FilterValue::Text(s.as_str().to_string()),
            })
            .filter_opt(self.start_date, |v| Filter::Gte {
                column: "ordered_at",
                value: FilterValue::Timestamp(v),
            })
            .filter_opt(self.end_date, |v| Filter::Lte {
                column: "ordered_at",
                value: FilterValue::Timestamp(v),
            })
            .build()
    }
}

/// `?user_id=&restaurant_id=&min_rating=&max_rating=`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub user_id: Option<DbId>,
    pub restaurant_id: Option<DbId>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

impl ReviewListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        base(
            &REVIEW_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.user_id, eq_int("user_id"))
        .filter_opt(self.restaurant_id, eq_int("restaurant_id"))
        .filter_opt(self.min_rating, |v| Filter::Gte {
            column: "rating",
            value: FilterValue::Float(v),
        })
        .filter_opt(self.max_rating, |v| Filter::Lte {
            column: "rating",
            value: FilterValue::Float(v),
        })
        .build()
    }
}

/// `?user_id=&order_id=&method=&status=`.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub user_id: Option<DbId>,
    pub order_id: Option<DbId>,
    pub method: Option<String>,
    pub status: Option<String>,
}

impl PaymentListParams {
    pub fn to_spec(&self) -> Result<QuerySpec, CoreError> {
        base(
            &PAYMENT_FIELDS,
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.fields.as_deref(),
        )
        .filter_opt(self.user_id, eq_int("user_id"))
        .filter_opt(self.order_id, eq_int("order_id"))
        .filter_opt(self.method.clone(), eq_text("method"))
        .filter_opt(self.status.clone(), eq_text("status"))
        .build()
    }
}

/// `?fields=` on single-record reads.
#[derive(Debug, Default, Deserialize)]
pub struct FieldsParams {
    pub fields: Option<String>,
}
