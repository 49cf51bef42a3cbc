//! Repository for the `todos` demo table.
//!
//! Thin wrappers over the generic helpers that add the table name, typed
//! filters and the default newest-first ordering.

use webmarket_core::todo::TodoPriority;

use crate::client::ScopedClient;
use crate::error::DbError;
use crate::generic::{self, fetch_rows, report, ID_COLUMN};
use crate::models::todo::{CreateTodo, Todo, TodoFilter, TodoStats, UpdateTodo};
use crate::query::{Filter, Pagination, Sort, TableRequest};
use crate::response::{ListResponse, QueryResponse};

pub const TODOS_TABLE: &str = "todos";

const CREATED_AT: &str = "created_at";

/// Provides CRUD, search and statistics for todos.
pub struct TodoRepo;

impl TodoRepo {
    /// List todos matching `filter`, newest first unless `sort` says otherwise.
    pub async fn list(
        client: &ScopedClient,
        filter: &TodoFilter,
        pagination: Option<Pagination>,
        sort: Option<Sort>,
    ) -> ListResponse<Todo> {
        let result: Result<(Vec<Todo>, Option<i64>), DbError> = async {
            let mut request = TableRequest::select(TODOS_TABLE).count_exact();
            if let Some(priority) = filter.priority {
                request = request.filter(Filter::eq("priority", priority.as_str()));
            }
            if let Some(completed) = filter.completed {
                request = request.filter(Filter::eq("completed", completed));
            }
            if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
                request = request.any_of(search_filters(term));
            }
            request = request.order(sort.unwrap_or_else(|| Sort::desc(CREATED_AT)));
            if let Some(pagination) = pagination {
                request = request.range(pagination.range()?);
            }
            fetch_rows(client, request).await
        }
        .await;
        report(TODOS_TABLE, "list", result).into()
    }

    /// Open todos, most urgent first, then by due date (undated last).
    ///
    /// Priority is ordered as stored text, which yields urgent, medium, low,
    /// high.
    pub async fn list_incomplete(client: &ScopedClient) -> ListResponse<Todo> {
        let request = TableRequest::select(TODOS_TABLE)
            .filter(Filter::eq("completed", false))
            .order(Sort::desc("priority"))
            .order(Sort::asc("due_date"));
        report(TODOS_TABLE, "list_incomplete", fetch_rows(client, request).await).into()
    }

    pub async fn list_by_priority(client: &ScopedClient, priority: TodoPriority) -> ListResponse<Todo> {
        let request = TableRequest::select(TODOS_TABLE)
            .filter(Filter::eq("priority", priority.as_str()))
            .order(Sort::desc(CREATED_AT));
        report(TODOS_TABLE, "list_by_priority", fetch_rows(client, request).await).into()
    }

    /// Case-insensitive substring search over title and description.
    pub async fn search(client: &ScopedClient, term: &str) -> ListResponse<Todo> {
        let request = TableRequest::select(TODOS_TABLE)
            .any_of(search_filters(term))
            .order(Sort::desc(CREATED_AT));
        report(TODOS_TABLE, "search", fetch_rows(client, request).await).into()
    }

    pub async fn find_by_id(client: &ScopedClient, id: &str) -> QueryResponse<Todo> {
        generic::fetch_by_id(client, TODOS_TABLE, id).await
    }

    pub async fn create(client: &ScopedClient, input: &CreateTodo) -> QueryResponse<Todo> {
        generic::insert_record(client, TODOS_TABLE, input).await
    }

    pub async fn update(client: &ScopedClient, id: &str, input: &UpdateTodo) -> QueryResponse<Todo> {
        generic::update_record(client, TODOS_TABLE, id, input).await
    }

    /// Set the completion flag. Not a read-modify-write: the caller supplies
    /// the new value.
    pub async fn toggle(client: &ScopedClient, id: &str, completed: bool) -> QueryResponse<Todo> {
        let patch = UpdateTodo {
            completed: Some(completed),
            ..Default::default()
        };
        generic::update_record(client, TODOS_TABLE, id, &patch).await
    }

    pub async fn delete(client: &ScopedClient, id: &str) -> QueryResponse<()> {
        generic::delete_record(client, TODOS_TABLE, id).await
    }

    /// Delete every listed todo in one request. Returns how many rows the
    /// service reported as removed.
    pub async fn delete_many(client: &ScopedClient, ids: &[String]) -> QueryResponse<usize> {
        if ids.is_empty() {
            return Ok::<_, DbError>(0).into();
        }
        let request = TableRequest::delete(TODOS_TABLE).filter(Filter::is_in(ID_COLUMN, ids.iter().cloned()));
        let result = client.execute(request).await.map(|r| r.rows.len());
        report(TODOS_TABLE, "delete_many", result).into()
    }

    /// Totals by completion and by priority.
    ///
    /// Runs eight count-only queries one after another; the first failure
    /// aborts the rest. Rows whose `completed` or `priority` is null match
    /// no bucket, so `completed + incomplete == total` and the priority sum
    /// only hold when those columns are set.
    pub async fn stats(client: &ScopedClient) -> QueryResponse<TodoStats> {
        let result: Result<TodoStats, DbError> = async {
            let mut stats = TodoStats {
                total: count(client, None).await?,
                completed: count(client, Some(Filter::eq("completed", true))).await?,
                incomplete: count(client, Some(Filter::eq("completed", false))).await?,
                ..Default::default()
            };
            for priority in TodoPriority::ALL {
                let n = count(client, Some(Filter::eq("priority", priority.as_str()))).await?;
                stats.by_priority.set(priority, n);
            }
            Ok(stats)
        }
        .await;
        report(TODOS_TABLE, "stats", result).into()
    }
}

fn search_filters(term: &str) -> Vec<Filter> {
    let pattern = format!("%{term}%");
    vec![
        Filter::ilike("title", pattern.clone()),
        Filter::ilike("description", pattern),
    ]
}

async fn count(client: &ScopedClient, filter: Option<Filter>) -> Result<i64, DbError> {
    let mut request = TableRequest::select(TODOS_TABLE).head();
    if let Some(filter) = filter {
        request = request.filter(filter);
    }
    Ok(client.execute(request).await?.count.unwrap_or(0))
}
