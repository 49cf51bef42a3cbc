use serde::Deserialize;

/// Error code the hosted service uses when a single-row request matched
/// zero or several rows.
pub const NOT_SINGLE_CODE: &str = "PGRST116";

/// Error code for a write rejected by the row-level-security policy.
pub const RLS_VIOLATION_CODE: &str = "42501";

/// Errors from the tenant-scoped data access layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with an error body.
    #[error("Database API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// A response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request could not be built (bad pagination, malformed filter value).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl DbError {
    /// The error returned when a single-row lookup did not find exactly one row.
    ///
    /// This is the same generic shape the service produces; callers cannot
    /// tell "no such id" apart from other failures by variant alone.
    pub fn not_single(rows: usize) -> Self {
        DbError::Api {
            status: 406,
            code: Some(NOT_SINGLE_CODE.to_string()),
            message: "JSON object requested, multiple (or no) rows returned".to_string(),
            details: Some(format!("The result contains {rows} rows")),
            hint: None,
        }
    }

    /// Service error code, when the service supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Build a [`DbError::Api`] from a status and the raw body text.
    ///
    /// Falls back to the raw text as the message when the body is not the
    /// usual JSON error object.
    pub(crate) fn into_error(status: u16, raw: &str) -> DbError {
        let body: ApiErrorBody = serde_json::from_str(raw).unwrap_or_default();
        let message = body.message.unwrap_or_else(|| {
            if raw.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                raw.to_string()
            }
        });
        DbError::Api {
            status,
            code: body.code,
            message,
            details: body.details,
            hint: body.hint,
        }
    }
}
