//! Scoped access to the hosted database.
//!
//! [`ScopedClient`] is the capability every data-access call receives. It
//! pairs a [`TableGateway`] (how requests travel) with the credential the
//! service uses to enforce row-level security, and the tenant / project pair
//! that is stamped onto every inserted row.

use std::sync::Arc;

use async_trait::async_trait;
use webmarket_core::error::CoreError;
use webmarket_core::scope::{ScopeClaims, PROJECT_COLUMN, TENANT_COLUMN};

use crate::error::DbError;
use crate::query::{TableRequest, TableResponse};

/// Transport for table requests.
///
/// Implementations must enforce nothing themselves beyond what the remote
/// service would: row visibility is decided by the credential's claims.
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Short backend label for logs and the health endpoint.
    fn kind(&self) -> &'static str;

    async fn execute(
        &self,
        request: TableRequest,
        credential: &ScopedCredential,
    ) -> Result<TableResponse, DbError>;
}

/// Bearer token plus the scope claims it carries.
#[derive(Clone)]
pub struct ScopedCredential {
    access_token: String,
    claims: ScopeClaims,
}

impl ScopedCredential {
    /// Build a credential from a scoped JWT, reading its claims.
    pub fn from_token(access_token: impl Into<String>) -> Result<Self, CoreError> {
        let access_token = access_token.into();
        let claims = ScopeClaims::from_token(&access_token)?;
        Ok(Self {
            access_token,
            claims,
        })
    }

    /// A credential with known claims and no bearer token, for gateways
    /// that never leave the process.
    pub fn local(claims: ScopeClaims) -> Self {
        Self {
            access_token: String::new(),
            claims,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn claims(&self) -> &ScopeClaims {
        &self.claims
    }
}

impl std::fmt::Debug for ScopedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedCredential")
            .field("access_token", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Gateway + credential + write scope. Cheap to clone.
#[derive(Clone)]
pub struct ScopedClient {
    gateway: Arc<dyn TableGateway>,
    credential: ScopedCredential,
    scope: ScopeClaims,
}

impl ScopedClient {
    pub fn new(
        gateway: Arc<dyn TableGateway>,
        credential: ScopedCredential,
        scope: ScopeClaims,
    ) -> Self {
        Self {
            gateway,
            credential,
            scope,
        }
    }

    /// The tenant / project pair stamped onto inserted rows.
    pub fn scope(&self) -> &ScopeClaims {
        &self.scope
    }

    pub fn backend(&self) -> &'static str {
        self.gateway.kind()
    }

    pub async fn execute(&self, request: TableRequest) -> Result<TableResponse, DbError> {
        tracing::debug!(
            table = %request.table,
            method = ?request.method,
            conditions = request.conditions.len(),
            "Executing table request",
        );
        self.gateway.execute(request, &self.credential).await
    }

    /// Write the scoping columns into an insert payload, overriding any
    /// caller-supplied values.
    pub fn stamp(&self, row: &mut serde_json::Map<String, serde_json::Value>) {
        row.insert(TENANT_COLUMN.into(), self.scope.tenant_id.clone().into());
        row.insert(PROJECT_COLUMN.into(), self.scope.project_id.clone().into());
    }
}
