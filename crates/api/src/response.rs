//! Shared response types for API handlers.
//!
//! Form-submission and email endpoints answer with `{ success: true, ... }`
//! bodies. Todo endpoints pass the data-access envelope through unchanged
//! (`{ data, error }` or `{ data, error, count }`), choosing the status code
//! from `error`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use webmarket_db::{DbError, ListResponse, QueryResponse};

/// `{ "success": true, "message": ... }`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Status for a data-access envelope: 200 on success, 400 when the request
/// itself was malformed, 502 when the hosted database failed.
pub fn envelope_status(error: Option<&DbError>) -> StatusCode {
    match error {
        None => StatusCode::OK,
        Some(DbError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::BAD_GATEWAY,
    }
}

pub fn query_envelope<T: Serialize>(response: QueryResponse<T>) -> Response {
    (envelope_status(response.error.as_ref()), Json(response)).into_response()
}

pub fn list_envelope<T: Serialize>(response: ListResponse<T>) -> Response {
    (envelope_status(response.error.as_ref()), Json(response)).into_response()
}
