pub mod email;
pub mod form_submissions;
pub mod health;
pub mod todos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /form-submissions                     list, create, delete (?id=)
///
/// /send-email                           relay a form by email (POST)
///
/// /todos                                list, create
/// /todos/incomplete                     open todos by urgency
/// /todos/stats                          completion and priority counts
/// /todos/search                         title/description search (?q=)
/// /todos/priority/{priority}            todos with one priority
/// /todos/bulk-delete                    delete many by id (POST)
/// /todos/{id}                           get, update (PATCH), delete
/// /todos/{id}/toggle                    set completion (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/form-submissions", form_submissions::router())
        .nest("/send-email", email::router())
        .nest("/todos", todos::router())
}
