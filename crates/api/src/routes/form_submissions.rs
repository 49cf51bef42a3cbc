//! Route definitions for stored form submissions, mounted at `/form-submissions`.

use axum::routing::get;
use axum::Router;

use crate::handlers::form_submissions;
use crate::state::AppState;

/// ```text
/// GET    /            -> list_submissions (?formType=&search=)
/// POST   /            -> create_submission
/// DELETE /            -> delete_submission (?id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(form_submissions::list_submissions)
            .post(form_submissions::create_submission)
            .delete(form_submissions::delete_submission),
    )
}
