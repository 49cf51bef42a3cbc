//! Uniform result envelopes for the data access layer.
//!
//! Every public data-access function returns one of these instead of a
//! `Result`: failures are carried in `error` and `data` is `None`. Callers
//! must check `error` (or call `into_result`) rather than expect a panic or
//! an early return.

use serde::{Serialize, Serializer};

use crate::error::DbError;

/// `{ data, error }` envelope for single-value operations.
#[derive(Debug, Serialize)]
pub struct QueryResponse<T> {
    pub data: Option<T>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<DbError>,
}

/// `{ data, error, count }` envelope for list operations.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Option<Vec<T>>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<DbError>,
    pub count: Option<i64>,
}

impl<T> QueryResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Option<T>, DbError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }
}

impl<T> From<Result<T, DbError>> for QueryResponse<T> {
    fn from(result: Result<T, DbError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                data: None,
                error: Some(err),
            },
        }
    }
}

impl<T> ListResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Rows on success (empty when the service sent none), or the error.
    pub fn into_result(self) -> Result<Vec<T>, DbError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data.unwrap_or_default()),
        }
    }
}

impl<T> From<Result<(Vec<T>, Option<i64>), DbError>> for ListResponse<T> {
    fn from(result: Result<(Vec<T>, Option<i64>), DbError>) -> Self {
        match result {
            Ok((rows, count)) => Self {
                data: Some(rows),
                error: None,
                count,
            },
            Err(err) => Self {
                data: None,
                error: Some(err),
                count: None,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    code: Option<&'a str>,
}

fn serialize_error<S: Serializer>(error: &Option<DbError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => ErrorBody {
            message: err.to_string(),
            code: err.code(),
        }
        .serialize(serializer),
        None => serializer.serialize_none(),
    }
}
