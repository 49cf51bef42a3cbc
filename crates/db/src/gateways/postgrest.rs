//! REST gateway for the hosted Postgres service.
//!
//! Translates a [`TableRequest`] into a PostgREST call under `/rest/v1` using
//! [`reqwest`]. The project's anon key goes in the `apikey` header and the
//! scoped access token in `Authorization`; the service applies row-level
//! security from the token's claims.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::Method;

use crate::client::{ScopedCredential, TableGateway};
use crate::error::{ApiErrorBody, DbError};
use crate::query::{Condition, Filter, FilterOperator, TableMethod, TableRequest, TableResponse};

/// Characters that force a value inside `in.(...)` or `or=(...)` to be quoted.
const RESERVED_CHARS: &[char] = &[',', '.', ':', '(', ')', '"', '\\', ' '];

/// HTTP client for one hosted project.
pub struct PostgrestGateway {
    client: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl PostgrestGateway {
    /// Create a gateway for the project at `base_url`
    /// (e.g. `https://<ref>.supabase.co`).
    pub fn new(base_url: &str, anon_key: String, timeout: Duration) -> Result<Self, DbError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, anon_key))
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str, anon_key: String) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
            anon_key,
        }
    }

    fn method_for(request: &TableRequest) -> Method {
        match request.method {
            TableMethod::Select if request.head => Method::HEAD,
            TableMethod::Select => Method::GET,
            TableMethod::Insert => Method::POST,
            TableMethod::Update => Method::PATCH,
            TableMethod::Delete => Method::DELETE,
        }
    }
}

#[async_trait]
impl TableGateway for PostgrestGateway {
    fn kind(&self) -> &'static str {
        "postgrest"
    }

    async fn execute(
        &self,
        request: TableRequest,
        credential: &ScopedCredential,
    ) -> Result<TableResponse, DbError> {
        let params = query_params(&request)?;
        let prefer = prefer_header(&request);

        let mut builder = self
            .client
            .request(
                Self::method_for(&request),
                format!("{}/{}", self.rest_url, request.table),
            )
            .query(&params)
            .header("apikey", &self.anon_key)
            .bearer_auth(credential.access_token());

        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiErrorBody::into_error(status.as_u16(), &text));
        }

        let rows = if request.head || text.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&text)?
        };

        Ok(TableResponse { rows, count })
    }
}

// ---------------------------------------------------------------------------
// Request rendering
// ---------------------------------------------------------------------------

/// Render filters, ordering and range as query-string pairs.
pub(crate) fn query_params(request: &TableRequest) -> Result<Vec<(String, String)>, DbError> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for condition in &request.conditions {
        match condition {
            Condition::Filter(filter) => {
                params.push((filter.column.clone(), render_filter(filter)?));
            }
            Condition::AnyOf(filters) => {
                let parts = filters
                    .iter()
                    .map(|f| Ok(format!("{}.{}", f.column, render_filter_quoted(f)?)))
                    .collect::<Result<Vec<_>, DbError>>()?;
                params.push(("or".to_string(), format!("({})", parts.join(","))));
            }
        }
    }

    if !request.order.is_empty() {
        let order = request
            .order
            .iter()
            .map(|s| format!("{}.{}", s.column, if s.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    if let Some(range) = request.range {
        params.push(("offset".to_string(), range.offset.to_string()));
        params.push(("limit".to_string(), range.limit.to_string()));
    }

    Ok(params)
}

fn prefer_header(request: &TableRequest) -> Option<String> {
    let mut prefs = Vec::new();
    if request.method != TableMethod::Select {
        prefs.push("return=representation");
    }
    if request.count {
        prefs.push("count=exact");
    }
    (!prefs.is_empty()).then(|| prefs.join(","))
}

/// `op.value` for a top-level filter parameter.
fn render_filter(filter: &Filter) -> Result<String, DbError> {
    render_with(filter, render_scalar)
}

/// `op.value` for a filter nested in an `or=(...)` group, where reserved
/// characters in values must be quoted.
fn render_filter_quoted(filter: &Filter) -> Result<String, DbError> {
    render_with(filter, |v| quote(&render_scalar(v)))
}

fn render_with(
    filter: &Filter,
    render: impl Fn(&serde_json::Value) -> String,
) -> Result<String, DbError> {
    match (filter.operator, &filter.value) {
        (FilterOperator::In, _) => {
            let members = filter
                .members()?
                .iter()
                .map(|v| quote(&render_scalar(v)))
                .collect::<Vec<_>>()
                .join(",");
            Ok(format!("in.({members})"))
        }
        (FilterOperator::Eq, serde_json::Value::Null) => Ok("is.null".to_string()),
        (FilterOperator::Neq, serde_json::Value::Null) => Ok("not.is.null".to_string()),
        (op, value) => Ok(format!("{}.{}", op.as_str(), render(value))),
    }
}

fn render_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn quote(value: &str) -> String {
    if value.contains(RESERVED_CHARS) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Total from a `Content-Range` header such as `0-24/573` or `*/0`.
fn parse_content_range(header: &str) -> Option<i64> {
    header.rsplit_once('/')?.1.parse().ok()
}
