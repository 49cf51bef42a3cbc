use axum::routing::post;
use axum::Router;

use crate::handlers::email;
use crate::state::AppState;

/// Email relay, mounted at `/send-email`.
///
/// ```text
/// POST   /            -> send_form_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(email::send_form_email))
}
