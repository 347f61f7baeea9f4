//! Translation of a [`QuerySpec`] into paginated SQL.
//!
//! Every identifier pushed into SQL here comes from the [`QuerySpec`]'s `&'static str`
//! columns; every client value goes through `push_bind`.

use comanda_core::query_spec::{escape_like, Filter, FilterValue, QuerySpec};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// One page of rows plus the numbers needed for the paginated envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}

/// Append ` WHERE ...` for `filters` (nothing when empty).
pub fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Contains { column, value } => {
                qb.push(*column)
                    .push(" ILIKE '%' || ")
                    .push_bind(escape_like(value))
                    .push(" || '%'");
            }
            Filter::Eq { column, value } => {
                qb.push(*column).push(" = ");
                push_value(qb, value);
            }
            Filter::Gte { column, value } => {
                qb.push(*column).push(" >= ");
                push_value(qb, value);
            }
            Filter::Lte { column, value } => {
                qb.push(*column).push(" <= ");
                push_value(qb, value);
            }
            Filter::HasElement { column, value } => {
                qb.push_bind(value.clone()).push(" = ANY(").push(*column).push(")");
            }
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Text(v) => qb.push_bind(v.clone()),
        FilterValue::Int(v) => qb.push_bind(*v),
        FilterValue::Float(v) => qb.push_bind(*v),
        FilterValue::Bool(v) => qb.push_bind(*v),
        FilterValue::Timestamp(v) => qb.push_bind(*v),
    };
}

/// Count and fetch one page of `table` according to `spec`.
///
/// Rows are ordered by the `QuerySpec` sort column, with `id` in the same
/// direction as the tie-breaker so pages are stable.
pub async fn fetch_page<T>(
    pool: &PgPool,
    table: &str,
    columns: &str,
    spec: &QuerySpec,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count_qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {table}"));
    push_filters(&mut count_qb, &spec.filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let direction = spec.sort.direction.as_sql();
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {columns} FROM {table}"));
    push_filters(&mut qb, &spec.filters);
    qb.push(format!(
        " ORDER BY {} {direction}, id {direction} LIMIT ",
        spec.sort.column
    ))
    .push_bind(spec.pagination.limit)
    .push(" OFFSET ")
    .push_bind(spec.pagination.offset());

    let items = qb.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page {
        items,
        total,
        page: spec.pagination.page,
        total_pages: spec.pagination.total_pages(total),
    })
}
