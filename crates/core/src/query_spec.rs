//! Explicit list-query specification.
//!
//! A [`QuerySpec`] is built once per list request from the query string and
//! handed to the repository layer unchanged. Column names inside a spec are
//! always `&'static str` taken from an [`EntityFields`] whitelist or from
//! handler code, never from the client, so translating a spec into SQL needs
//! no escaping of identifiers.

use std::str::FromStr;

use crate::error::CoreError;
use crate::projection::Projection;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

// ---------------------------------------------------------------------------
// Field whitelists
// ---------------------------------------------------------------------------

/// The sortable / projectable fields of one entity.
#[derive(Debug)]
pub struct EntityFields {
    /// Entity name used in error messages.
    pub entity: &'static str,
    /// Columns a client may sort by or project.
    pub fields: &'static [&'static str],
    /// Sort column used when the client does not pick one. Sorted
    /// descending unless the client asks otherwise.
    pub default_sort: &'static str,
}

impl EntityFields {
    /// Map a client-supplied field name onto its whitelisted column.
    pub fn resolve(&self, name: &str) -> Result<&'static str, CoreError> {
        self.fields
            .iter()
            .copied()
            .find(|field| *field == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown {} field '{name}'. Must be one of: {}",
                    self.entity,
                    self.fields.join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(Timestamp),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on a text column.
    Contains { column: &'static str, value: String },
    Eq { column: &'static str, value: FilterValue },
    Gte { column: &'static str, value: FilterValue },
    Lte { column: &'static str, value: FilterValue },
    /// An array column contains `value`.
    HasElement { column: &'static str, value: String },
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Contains { column, .. }
            | Filter::Eq { column, .. }
            | Filter::Gte { column, .. }
            | Filter::Lte { column, .. }
            | Filter::HasElement { column, .. } => column,
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CoreError::Validation(format!(
                "Invalid sort order '{other}'. Must be 'asc' or 'desc'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: SortDirection,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    /// Page size.
    pub limit: i64,
}

impl Pagination {
    /// Clamp client values into range: page >= 1, 1 <= limit <= [`MAX_PAGE_SIZE`].
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

// ---------------------------------------------------------------------------
// QuerySpec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filters: Vec<Filter>,
    pub sort: Sort,
    pub pagination: Pagination,
    pub projection: Option<Projection>,
}

impl QuerySpec {
    pub fn builder(fields: &'static EntityFields) -> QuerySpecBuilder {
        QuerySpecBuilder {
            fields,
            filters: Vec::new(),
            sort_by: None,
            order: None,
            pagination: Pagination::default(),
            projection: None,
        }
    }
}

/// Collects request parameters, then validates them all at once in
/// [`QuerySpecBuilder::build`].
#[derive(Debug)]
pub struct QuerySpecBuilder {
    fields: &'static EntityFields,
    filters: Vec<Filter>,
    sort_by: Option<String>,
    order: Option<String>,
    pagination: Pagination,
    projection: Option<String>,
}

impl QuerySpecBuilder {
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add `filter` only when `value` is present.
    pub fn filter_opt<T>(mut self, value: Option<T>, make: impl FnOnce(T) -> Filter) -> Self {
        if let Some(value) = value {
            self.filters.push(make(value));
        }
        self
    }

    pub fn sort(mut self, sort_by: Option<&str>, order: Option<&str>) -> Self {
        self.sort_by = sort_by.map(str::to_string);
        self.order = order.map(str::to_string);
        self
    }

    pub fn paginate(mut self, page: Option<i64>, limit: Option<i64>) -> Self {
        self.pagination = Pagination::new(page, limit);
        self
    }

    pub fn project(mut self, fields: Option<&str>) -> Self {
        self.projection = fields.map(str::to_string);
        self
    }

    pub fn build(self) -> Result<QuerySpec, CoreError> {
        let column = match self.sort_by.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => self.fields.resolve(name)?,
            _ => self.fields.default_sort,
        };

        let direction = match self.order.as_deref() {
            Some(order) => order.parse()?,
            None if column == self.fields.default_sort => SortDirection::Desc,
            None => SortDirection::Asc,
        };

        let projection = match self.projection.as_deref() {
            Some(raw) => Projection::parse(raw, self.fields)?,
            None => None,
        };

        Ok(QuerySpec {
            filters: self.filters,
            sort: Sort { column, direction },
            pagination: self.pagination,
            projection,
        })
    }
}

/// Escape `%`, `_` and `\` so user text is matched literally by `ILIKE`.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    static WIDGETS: EntityFields = EntityFields {
        entity: "widget",
        fields: &["id", "name", "size", "created_at"],
        default_sort: "created_at",
    };

    #[test]
    fn defaults_to_descending_default_sort() {
        let spec = QuerySpec::builder(&WIDGETS).build().unwrap();
        assert_eq!(spec.sort.column, "created_at");
        assert_eq!(spec.sort.direction, SortDirection::Desc);
        assert_eq!(spec.pagination, Pagination { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert!(spec.projection.is_none());
        assert!(spec.filters.is_empty());
    }

    #[test]
    fn other_sort_fields_default_to_ascending() {
        let spec = QuerySpec::builder(&WIDGETS)
            .sort(Some("name"), None)
            .build()
            .unwrap();
        assert_eq!(spec.sort, Sort { column: "name", direction: SortDirection::Asc });

        let spec = QuerySpec::builder(&WIDGETS)
            .sort(Some("name"), Some("DESC"))
            .build()
            .unwrap();
        assert_eq!(spec.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let result = QuerySpec::builder(&WIDGETS)
            .sort(Some("name; DROP TABLE widgets"), None)
            .build();
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn bad_sort_order_is_rejected() {
        let result = QuerySpec::builder(&WIDGETS).sort(None, Some("sideways")).build();
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination::new(Some(0), Some(10_000));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, MAX_PAGE_SIZE);

        let p = Pagination::new(Some(3), Some(0));
        assert_eq!(p.limit, 1);
        assert_eq!(p.offset(), 2);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = Pagination::new(Some(1), Some(10));
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(11), 2);
    }

    #[test]
    fn optional_filters_are_skipped_when_absent() {
        let spec = QuerySpec::builder(&WIDGETS)
            .filter_opt(None::<String>, |v| Filter::Contains { column: "name", value: v })
            .filter_opt(Some(3_i64), |v| Filter::Eq {
                column: "size",
                value: FilterValue::Int(v),
            })
            .build()
            .unwrap();
        assert_eq!(spec.filters.len(), 1);
        assert_eq!(spec.filters[0].column(), "size");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
