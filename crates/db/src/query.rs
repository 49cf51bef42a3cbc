//! Table request model shared by every gateway.
//!
//! A [`TableRequest`] describes one round trip against a table: the verb,
//! the filter conditions, ordering, an optional row range and whether an
//! exact count is wanted. Gateways translate it to their own wire form
//! (query-string parameters for the REST service, in-process evaluation for
//! the memory gateway).

use serde::{Deserialize, Serialize};

use crate::error::DbError;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Comparison operators understood by the hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-sensitive pattern match (`%` any run, `_` any single char).
    Like,
    /// Case-insensitive pattern match.
    Ilike,
    /// Set membership; the value must be a JSON array.
    In,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Ilike => "ilike",
            FilterOperator::In => "in",
        }
    }
}

/// A `(column, operator, value)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(column, FilterOperator::Eq, value)
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Ilike, pattern.into())
    }

    pub fn is_in<V: Into<serde_json::Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<serde_json::Value> = values.into_iter().map(Into::into).collect();
        Self::new(column, FilterOperator::In, values)
    }

    /// Members of an `in` filter. Errors when the value is not an array.
    pub(crate) fn members(&self) -> Result<&[serde_json::Value], DbError> {
        self.value.as_array().map(Vec::as_slice).ok_or_else(|| {
            DbError::InvalidQuery(format!(
                "'in' filter on '{}' needs an array value",
                self.column
            ))
        })
    }
}

/// A single filter, or a group of filters joined with logical OR.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Filter(Filter),
    AnyOf(Vec<Filter>),
}

// ---------------------------------------------------------------------------
// Ordering and paging
// ---------------------------------------------------------------------------

/// Sort on one column. `ascending` defaults to `false` (newest / largest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub column: String,
    #[serde(default)]
    pub ascending: bool,
}

impl Sort {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

/// Zero-based row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    /// Row window for this page: rows `[(page-1)*size, (page-1)*size + size - 1]`.
    pub fn range(self) -> Result<RowRange, DbError> {
        if self.page == 0 || self.page_size == 0 {
            return Err(DbError::InvalidQuery(format!(
                "page and pageSize must be at least 1 (got page={}, pageSize={})",
                self.page, self.page_size
            )));
        }
        Ok(RowRange {
            offset: u64::from(self.page - 1) * u64::from(self.page_size),
            limit: u64::from(self.page_size),
        })
    }
}

/// Caller-facing options for list operations.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub pagination: Option<Pagination>,
    pub sort: Option<Sort>,
    pub filters: Vec<Filter>,
}

impl ListOptions {
    /// Apply filters, sort and pagination to a select request. No sort is
    /// added when none was given.
    pub fn apply_to(&self, mut request: TableRequest) -> Result<TableRequest, DbError> {
        for filter in &self.filters {
            request = request.filter(filter.clone());
        }
        if let Some(sort) = &self.sort {
            request = request.order(sort.clone());
        }
        if let Some(pagination) = self.pagination {
            request = request.range(pagination.range()?);
        }
        Ok(request)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMethod {
    Select,
    Insert,
    Update,
    Delete,
}

/// One round trip against a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRequest {
    pub table: String,
    pub method: TableMethod,
    pub conditions: Vec<Condition>,
    pub order: Vec<Sort>,
    pub range: Option<RowRange>,
    /// Ask the service for an exact row count.
    pub count: bool,
    /// Count only: no rows are returned.
    pub head: bool,
    /// Row to insert or patch to apply.
    pub body: Option<serde_json::Value>,
}

impl TableRequest {
    fn new(table: &str, method: TableMethod, body: Option<serde_json::Value>) -> Self {
        Self {
            table: table.to_string(),
            method,
            conditions: Vec::new(),
            order: Vec::new(),
            range: None,
            count: false,
            head: false,
            body,
        }
    }

    pub fn select(table: &str) -> Self {
        Self::new(table, TableMethod::Select, None)
    }

    pub fn insert(table: &str, row: serde_json::Value) -> Self {
        Self::new(table, TableMethod::Insert, Some(row))
    }

    pub fn update(table: &str, patch: serde_json::Value) -> Self {
        Self::new(table, TableMethod::Update, Some(patch))
    }

    pub fn delete(table: &str) -> Self {
        Self::new(table, TableMethod::Delete, None)
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.conditions.push(Condition::Filter(filter));
        self
    }

    pub fn any_of(mut self, filters: Vec<Filter>) -> Self {
        self.conditions.push(Condition::AnyOf(filters));
        self
    }

    pub fn order(mut self, sort: Sort) -> Self {
        self.order.push(sort);
        self
    }

    pub fn range(mut self, range: RowRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.count = true;
        self
    }

    /// Count-only request: implies an exact count and returns no rows.
    pub fn head(mut self) -> Self {
        self.count = true;
        self.head = true;
        self
    }
}

/// Rows (and optional exact count) returned by a gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableResponse {
    pub rows: Vec<serde_json::Value>,
    pub count: Option<i64>,
}
