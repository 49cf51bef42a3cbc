//! Table-agnostic CRUD helpers.
//!
//! Each helper performs one round trip and returns an envelope instead of a
//! `Result`; failures are logged here and carried in `error`. Inserts are
//! stamped with the client's tenant / project pair. Reads, updates and
//! deletes carry no scope filter of their own: isolation is the service's
//! row-level policy.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ScopedClient;
use crate::error::DbError;
use crate::query::{Filter, ListOptions, TableRequest, TableResponse};
use crate::response::{ListResponse, QueryResponse};

/// Primary-key column of every scoped table.
pub const ID_COLUMN: &str = "id";

/// Fetch rows with optional filters, sort and pagination, plus an exact count.
///
/// Unlike the table-specific list helpers, no ordering is applied when
/// `options.sort` is `None`.
pub async fn fetch_all<T: DeserializeOwned>(
    client: &ScopedClient,
    table: &str,
    options: &ListOptions,
) -> ListResponse<T> {
    let result: Result<(Vec<T>, Option<i64>), DbError> = async {
        let request = options.apply_to(TableRequest::select(table).count_exact())?;
        fetch_rows(client, request).await
    }
    .await;
    report(table, "fetch_all", result).into()
}

/// Fetch one row by primary key.
///
/// Zero matching rows produce the service's generic single-row error, not a
/// dedicated not-found variant.
pub async fn fetch_by_id<T: DeserializeOwned>(
    client: &ScopedClient,
    table: &str,
    id: &str,
) -> QueryResponse<T> {
    let request = TableRequest::select(table).filter(Filter::eq(ID_COLUMN, id));
    let result: Result<T, DbError> = async { single(client.execute(request).await?) }.await;
    report(table, "fetch_by_id", result).into()
}

/// Insert one row, stamped with the client's tenant / project pair.
pub async fn insert_record<T: DeserializeOwned>(
    client: &ScopedClient,
    table: &str,
    fields: &impl Serialize,
) -> QueryResponse<T> {
    let result: Result<T, DbError> = async {
        let mut row = to_object(fields)?;
        client.stamp(&mut row);
        let response = client
            .execute(TableRequest::insert(table, serde_json::Value::Object(row)))
            .await?;
        single(response)
    }
    .await;
    report(table, "insert_record", result).into()
}

/// Apply a partial update to the row with `id` and return the updated row.
pub async fn update_record<T: DeserializeOwned>(
    client: &ScopedClient,
    table: &str,
    id: &str,
    patch: &impl Serialize,
) -> QueryResponse<T> {
    let result: Result<T, DbError> = async {
        let patch = to_object(patch)?;
        let request = TableRequest::update(table, serde_json::Value::Object(patch))
            .filter(Filter::eq(ID_COLUMN, id));
        single(client.execute(request).await?)
    }
    .await;
    report(table, "update_record", result).into()
}

/// Delete the row with `id`. Deleting an id that is absent (or invisible
/// under the row-level policy) is not an error.
pub async fn delete_record(client: &ScopedClient, table: &str, id: &str) -> QueryResponse<()> {
    let request = TableRequest::delete(table).filter(Filter::eq(ID_COLUMN, id));
    let result = client.execute(request).await.map(|_| ());
    report(table, "delete_record", result).into()
}

// ---------------------------------------------------------------------------
// Shared plumbing (also used by the repositories)
// ---------------------------------------------------------------------------

/// Execute a select and decode every row.
pub(crate) async fn fetch_rows<T: DeserializeOwned>(
    client: &ScopedClient,
    request: TableRequest,
) -> Result<(Vec<T>, Option<i64>), DbError> {
    let response = client.execute(request).await?;
    let rows = response
        .rows
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;
    Ok((rows, response.count))
}

/// Decode exactly one row, or fail with the generic single-row error.
pub(crate) fn single<T: DeserializeOwned>(response: TableResponse) -> Result<T, DbError> {
    let mut rows = response.rows;
    if rows.len() != 1 {
        return Err(DbError::not_single(rows.len()));
    }
    Ok(serde_json::from_value(rows.remove(0))?)
}

pub(crate) fn to_object(
    value: &impl Serialize,
) -> Result<serde_json::Map<String, serde_json::Value>, DbError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(DbError::InvalidQuery("record must serialize to a JSON object".into())),
    }
}

/// Log a failed operation and pass the result through.
pub(crate) fn report<T>(
    table: &str,
    operation: &'static str,
    result: Result<T, DbError>,
) -> Result<T, DbError> {
    if let Err(err) = &result {
        tracing::error!(table, operation, error = %err, "Database operation failed");
    }
    result
}
