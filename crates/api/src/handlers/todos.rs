//! Handlers for the tenant-scoped `todos` table.
//!
//! Every handler answers with the data-access envelope; see
//! [`crate::response::envelope_status`] for the status mapping. Requests
//! that fail validation before reaching the database get the standard
//! failure body instead.

use axum::extract::{Path, State};
use axum::response::Response;
use serde::Deserialize;
use webmarket_core::todo::TodoPriority;
use webmarket_db::models::todo::{CreateTodo, TodoFilter, UpdateTodo, TODO_SORT_COLUMNS};
use webmarket_db::query::{Pagination, Sort};
use webmarket_db::repositories::TodoRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::{list_envelope, query_envelope};
use crate::state::AppState;

/// Page size used when only `page` is given.
const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Column to order by; defaults to `created_at`.
    pub sort: Option<String>,
    #[serde(default)]
    pub ascending: bool,
    pub priority: Option<TodoPriority>,
    pub completed: Option<bool>,
    pub search: Option<String>,
}

impl TodoListParams {
    fn pagination(&self) -> Option<Pagination> {
        match (self.page, self.page_size) {
            (None, None) => None,
            (page, page_size) => Some(Pagination {
                page: page.unwrap_or(1),
                page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            }),
        }
    }

    fn sort(&self) -> AppResult<Option<Sort>> {
        let Some(column) = self.sort.as_deref() else {
            return Ok(None);
        };
        if !TODO_SORT_COLUMNS.contains(&column) {
            return Err(AppError::BadRequest(format!(
                "Cannot sort by '{column}'. Must be one of: {}",
                TODO_SORT_COLUMNS.join(", ")
            )));
        }
        Ok(Some(Sort {
            column: column.to_string(),
            ascending: self.ascending,
        }))
    }

    fn filter(&self) -> TodoFilter {
        TodoFilter {
            priority: self.priority,
            completed: self.completed,
            search: self.search.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/todos
///
/// Paginated, filtered listing with an exact `count`. Newest first unless
/// `sort` names another column.
pub async fn list_todos(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TodoListParams>,
) -> AppResult<Response> {
    let sort = params.sort()?;
    let response = TodoRepo::list(&state.db, &params.filter(), params.pagination(), sort).await;
    Ok(list_envelope(response))
}

/// GET /api/todos/incomplete
pub async fn list_incomplete_todos(State(state): State<AppState>) -> Response {
    list_envelope(TodoRepo::list_incomplete(&state.db).await)
}

/// GET /api/todos/priority/{priority}
pub async fn list_todos_by_priority(
    State(state): State<AppState>,
    Path(priority): Path<String>,
) -> AppResult<Response> {
    let priority: TodoPriority = priority.parse()?;
    Ok(list_envelope(TodoRepo::list_by_priority(&state.db, priority).await))
}

/// GET /api/todos/search?q=
pub async fn search_todos(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<Response> {
    let term = params.q.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search term must not be empty".into()));
    }
    Ok(list_envelope(TodoRepo::search(&state.db, term).await))
}

/// GET /api/todos/stats
///
/// Totals by completion state and by priority.
pub async fn todo_stats(State(state): State<AppState>) -> Response {
    query_envelope(TodoRepo::stats(&state.db).await)
}

// ---------------------------------------------------------------------------
// Single-row operations
// ---------------------------------------------------------------------------

/// GET /api/todos/{id}
pub async fn get_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    query_envelope(TodoRepo::find_by_id(&state.db, &id).await)
}

/// POST /api/todos
///
/// The tenant and project columns are stamped from the server's scope.
pub async fn create_todo(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateTodo>,
) -> AppResult<Response> {
    input.validate()?;
    let response = TodoRepo::create(&state.db, &input).await;
    if let Some(todo) = &response.data {
        tracing::info!(todo_id = %todo.id, priority = %todo.priority, "Todo created");
    }
    Ok(query_envelope(response))
}

/// PATCH /api/todos/{id}
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateTodo>,
) -> AppResult<Response> {
    input.validate()?;
    Ok(query_envelope(TodoRepo::update(&state.db, &id, &input).await))
}

/// POST /api/todos/{id}/toggle
///
/// Sets `completed` to the supplied value.
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ToggleRequest>,
) -> Response {
    query_envelope(TodoRepo::toggle(&state.db, &id, input.completed).await)
}

/// DELETE /api/todos/{id}
pub async fn delete_todo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let response = TodoRepo::delete(&state.db, &id).await;
    if response.is_ok() {
        tracing::info!(todo_id = %id, "Todo deleted");
    }
    query_envelope(response)
}

/// POST /api/todos/bulk-delete
///
/// Deletes every listed id in one request; `data` is the number removed.
pub async fn delete_todos(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<BulkDeleteRequest>,
) -> AppResult<Response> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("ids must not be empty".into()));
    }
    let response = TodoRepo::delete_many(&state.db, &input.ids).await;
    if let Some(removed) = response.data {
        tracing::info!(requested = input.ids.len(), removed, "Todos deleted");
    }
    Ok(query_envelope(response))
}
