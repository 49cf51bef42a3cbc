//! In-process gateway that mimics the hosted service.
//!
//! Tables are JSON rows held in memory. Every request is evaluated the way
//! the service would evaluate it, including the row-level-security policy:
//! selects, updates and deletes only see rows whose `tenantid` / `projectid`
//! match the credential's claims, and inserts or updates that would produce
//! an out-of-scope row are rejected. Used for local development without a
//! hosted project and by the test suites.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use regex::RegexBuilder;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use webmarket_core::scope::{ScopeClaims, PROJECT_COLUMN, TENANT_COLUMN};
use webmarket_core::types::Timestamp;

use crate::client::{ScopedCredential, TableGateway};
use crate::error::{DbError, RLS_VIOLATION_CODE};
use crate::query::{Condition, Filter, FilterOperator, Sort, TableMethod, TableRequest, TableResponse};

type Row = Map<String, Value>;

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Row>>,
    /// Last timestamp handed out, so `created_at` is strictly increasing.
    last_timestamp: Option<Timestamp>,
}

/// In-memory tables evaluated with the hosted service's semantics.
#[derive(Default)]
pub struct MemoryGateway {
    state: RwLock<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty table. Requests against unregistered tables fail
    /// the way the service fails for an unknown relation.
    pub fn with_table(mut self, table: &str) -> Self {
        self.state
            .get_mut()
            .tables
            .entry(table.to_string())
            .or_default();
        self
    }

    /// Load rows as-is, bypassing the row-level policy. Used to seed data
    /// belonging to other tenants.
    pub async fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut state = self.state.write().await;
        let target = state.tables.entry(table.to_string()).or_default();
        target.extend(rows.into_iter().filter_map(|row| match row {
            Value::Object(map) => Some(map),
            _ => None,
        }));
    }

    /// Number of rows in a table regardless of scope.
    pub async fn row_count(&self, table: &str) -> usize {
        self.state
            .read()
            .await
            .tables
            .get(table)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl TableGateway for MemoryGateway {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn execute(
        &self,
        request: TableRequest,
        credential: &ScopedCredential,
    ) -> Result<TableResponse, DbError> {
        let claims = credential.claims();

        match request.method {
            TableMethod::Select => {
                let state = self.state.read().await;
                let rows = table(&state.tables, &request.table)?;
                select(rows, &request, claims)
            }
            TableMethod::Insert => {
                let mut state = self.state.write().await;
                let now = state.next_timestamp();
                let rows = table_mut(&mut state.tables, &request.table)?;
                insert(rows, &request, claims, now)
            }
            TableMethod::Update => {
                let mut state = self.state.write().await;
                let now = state.next_timestamp();
                let rows = table_mut(&mut state.tables, &request.table)?;
                update(rows, &request, claims, now)
            }
            TableMethod::Delete => {
                let mut state = self.state.write().await;
                let rows = table_mut(&mut state.tables, &request.table)?;
                delete(rows, &request, claims)
            }
        }
    }
}

impl MemoryState {
    fn next_timestamp(&mut self) -> Timestamp {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + chrono::Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

fn select(rows: &[Row], request: &TableRequest, claims: &ScopeClaims) -> Result<TableResponse, DbError> {
    let mut matched = Vec::new();
    for row in rows {
        if visible(row, claims) && matches_all(row, &request.conditions)? {
            matched.push(row.clone());
        }
    }

    sort_rows(&mut matched, &request.order);
    let count = request.count.then_some(matched.len() as i64);

    if request.head {
        return Ok(TableResponse { rows: Vec::new(), count });
    }

    let window: Vec<Value> = match request.range {
        Some(range) => matched
            .into_iter()
            .skip(range.offset as usize)
            .take(range.limit as usize)
            .map(Value::Object)
            .collect(),
        None => matched.into_iter().map(Value::Object).collect(),
    };

    Ok(TableResponse { rows: window, count })
}

fn insert(
    rows: &mut Vec<Row>,
    request: &TableRequest,
    claims: &ScopeClaims,
    now: Timestamp,
) -> Result<TableResponse, DbError> {
    let mut row = match &request.body {
        Some(Value::Object(map)) => map.clone(),
        _ => return Err(DbError::InvalidQuery("insert body must be a JSON object".into())),
    };

    let stamp = Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true));
    row.entry("id")
        .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    row.entry("created_at").or_insert_with(|| stamp.clone());
    row.entry("updated_at").or_insert(stamp);

    if !visible(&row, claims) {
        return Err(rls_violation(&request.table));
    }

    rows.push(row.clone());
    Ok(TableResponse {
        rows: vec![Value::Object(row)],
        count: request.count.then_some(1),
    })
}

fn update(
    rows: &mut [Row],
    request: &TableRequest,
    claims: &ScopeClaims,
    now: Timestamp,
) -> Result<TableResponse, DbError> {
    let patch = match &request.body {
        Some(Value::Object(map)) => map,
        _ => return Err(DbError::InvalidQuery("update body must be a JSON object".into())),
    };

    let mut targets = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if visible(row, claims) && matches_all(row, &request.conditions)? {
            let mut updated = row.clone();
            for (k, v) in patch {
                updated.insert(k.clone(), v.clone());
            }
            if !visible(&updated, claims) {
                return Err(rls_violation(&request.table));
            }
            targets.push((idx, updated));
        }
    }

    let stamp = Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true));
    let mut returned = Vec::with_capacity(targets.len());
    for (idx, mut updated) in targets {
        updated.insert("updated_at".into(), stamp.clone());
        rows[idx] = updated.clone();
        returned.push(Value::Object(updated));
    }

    let count = request.count.then_some(returned.len() as i64);
    Ok(TableResponse { rows: returned, count })
}

fn delete(rows: &mut Vec<Row>, request: &TableRequest, claims: &ScopeClaims) -> Result<TableResponse, DbError> {
    // Evaluate every row first so a bad filter leaves the table untouched.
    let mut hits = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        hits.push(visible(row, claims) && matches_all(row, &request.conditions)?);
    }

    let mut removed = Vec::new();
    let mut hits = hits.into_iter();
    rows.retain(|row| {
        let hit = hits.next().unwrap_or(false);
        if hit {
            removed.push(Value::Object(row.clone()));
        }
        !hit
    });

    let count = request.count.then_some(removed.len() as i64);
    Ok(TableResponse { rows: removed, count })
}

// ---------------------------------------------------------------------------
// Evaluation helpers
// ---------------------------------------------------------------------------

fn table<'a>(tables: &'a HashMap<String, Vec<Row>>, name: &str) -> Result<&'a [Row], DbError> {
    tables
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| unknown_table(name))
}

fn table_mut<'a>(tables: &'a mut HashMap<String, Vec<Row>>, name: &str) -> Result<&'a mut Vec<Row>, DbError> {
    tables.get_mut(name).ok_or_else(|| unknown_table(name))
}

fn unknown_table(name: &str) -> DbError {
    DbError::Api {
        status: 404,
        code: Some("PGRST205".into()),
        message: format!("Could not find the table 'public.{name}' in the schema cache"),
        details: None,
        hint: None,
    }
}

fn rls_violation(table: &str) -> DbError {
    DbError::Api {
        status: 403,
        code: Some(RLS_VIOLATION_CODE.into()),
        message: format!("new row violates row-level security policy for table \"{table}\""),
        details: None,
        hint: None,
    }
}

fn visible(row: &Row, claims: &ScopeClaims) -> bool {
    claims.permits(
        row.get(TENANT_COLUMN).and_then(Value::as_str),
        row.get(PROJECT_COLUMN).and_then(Value::as_str),
    )
}

fn matches_all(row: &Row, conditions: &[Condition]) -> Result<bool, DbError> {
    for condition in conditions {
        let hit = match condition {
            Condition::Filter(filter) => matches(row, filter)?,
            Condition::AnyOf(filters) => {
                let mut any = false;
                for filter in filters {
                    if matches(row, filter)? {
                        any = true;
                        break;
                    }
                }
                any
            }
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches(row: &Row, filter: &Filter) -> Result<bool, DbError> {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);

    let hit = match filter.operator {
        FilterOperator::Eq if filter.value.is_null() => cell.is_null(),
        FilterOperator::Neq if filter.value.is_null() => !cell.is_null(),
        FilterOperator::Eq => compare(cell, &filter.value) == Some(Ordering::Equal),
        FilterOperator::Neq => matches!(compare(cell, &filter.value), Some(o) if o != Ordering::Equal),
        FilterOperator::Gt => compare(cell, &filter.value) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(compare(cell, &filter.value), Some(Ordering::Greater | Ordering::Equal)),
        FilterOperator::Lt => compare(cell, &filter.value) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(compare(cell, &filter.value), Some(Ordering::Less | Ordering::Equal)),
        FilterOperator::Like => like(cell, &filter.value, false)?,
        FilterOperator::Ilike => like(cell, &filter.value, true)?,
        FilterOperator::In => filter
            .members()?
            .iter()
            .any(|member| compare(cell, member) == Some(Ordering::Equal)),
    };
    Ok(hit)
}

/// SQL-style comparison: `None` when either side is null or the types
/// cannot be compared. Text is coerced the way query-string values are.
fn compare(cell: &Value, operand: &Value) -> Option<Ordering> {
    match (cell, operand) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        (Value::String(a), Value::Number(b)) => a.parse::<f64>().ok()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::String(b)) => Some(a.cmp(&b.parse::<bool>().ok()?)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn like(cell: &Value, pattern: &Value, case_insensitive: bool) -> Result<bool, DbError> {
    let (Some(text), Some(pattern)) = (cell.as_str(), pattern.as_str()) else {
        return Ok(false);
    };

    let mut expr = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '%' | '*' => expr.push_str(".*"),
            '_' => expr.push('.'),
            other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');

    let re = RegexBuilder::new(&expr)
        .case_insensitive(case_insensitive)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| DbError::InvalidQuery(format!("bad pattern '{pattern}': {e}")))?;
    Ok(re.is_match(text))
}

/// Postgres ordering: nulls sort last ascending and first descending.
fn sort_rows(rows: &mut [Row], order: &[Sort]) {
    if order.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for sort in order {
            let left = a.get(&sort.column).unwrap_or(&Value::Null);
            let right = b.get(&sort.column).unwrap_or(&Value::Null);
            let ord = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
            };
            let ord = if sort.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}
