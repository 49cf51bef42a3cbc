//! Route definitions for the tenant-scoped todo table, mounted at `/todos`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::todos;
use crate::state::AppState;

/// ```text
/// GET    /                      -> list_todos
/// POST   /                      -> create_todo
/// GET    /incomplete            -> list_incomplete_todos
/// GET    /stats                 -> todo_stats
/// GET    /search                -> search_todos (?q=)
/// GET    /priority/{priority}   -> list_todos_by_priority
/// POST   /bulk-delete           -> delete_todos
/// GET    /{id}                  -> get_todo
/// PATCH  /{id}                  -> update_todo
/// DELETE /{id}                  -> delete_todo
/// POST   /{id}/toggle           -> toggle_todo
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(todos::list_todos).post(todos::create_todo))
        .route("/incomplete", get(todos::list_incomplete_todos))
        .route("/stats", get(todos::todo_stats))
        .route("/search", get(todos::search_todos))
        .route("/priority/{priority}", get(todos::list_todos_by_priority))
        .route("/bulk-delete", post(todos::delete_todos))
        .route(
            "/{id}",
            get(todos::get_todo)
                .patch(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/{id}/toggle", post(todos::toggle_todo))
}
