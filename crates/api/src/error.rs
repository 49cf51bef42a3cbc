use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use webmarket_core::error::CoreError;
use webmarket_db::submissions::StoreError;
use webmarket_notify::EmailError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `{ success: false, error, code,
/// details? }` failure body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `webmarket_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure of the submissions file store. `action` is the
    /// user-facing summary ("Failed to save submission").
    #[error("{action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    /// SMTP delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A dependency the request needs is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Adapter for `map_err` on store calls.
    pub fn store(action: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Store { action, source }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- Domain validation ---
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }

            // --- File store errors ---
            AppError::Store { action, source } => classify_store_error(action, source),

            AppError::Email(err) => {
                tracing::error!(error = %err, "Email delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMAIL_ERROR",
                    "Failed to send email".to_string(),
                    Some(err.to_string()),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            error: message,
            code,
            details,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a store error into an HTTP status, error code, message and
/// optional details.
///
/// - `NotFound` maps to 404.
/// - `Validation` maps to 400.
/// - Disk and encoding failures map to 500 with the cause in `details`.
fn classify_store_error(
    action: &str,
    err: &StoreError,
) -> (StatusCode, &'static str, String, Option<String>) {
    match err {
        StoreError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Submission not found".to_string(),
            None,
        ),
        StoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
        other => {
            tracing::error!(error = %other, action, "Submission store error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                action.to_string(),
                Some(other.to_string()),
            )
        }
    }
}
