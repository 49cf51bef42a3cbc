//! Tenant / project scoping carried by the hosted-database access token.
//!
//! The hosted database filters every row by comparing its `tenantid` and
//! `projectid` columns with the `tenant_id` / `project_id` claims of the
//! bearer token. The application never verifies the token itself; it only
//! reads the claims so startup can refuse a token scoped to some other
//! tenant than the one writes are stamped with.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Column stamped with the tenant identifier on every insert.
pub const TENANT_COLUMN: &str = "tenantid";

/// Column stamped with the project identifier on every insert.
pub const PROJECT_COLUMN: &str = "projectid";

/// The `(tenant, project)` pair that scopes every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeClaims {
    pub tenant_id: String,
    pub project_id: String,
}

impl ScopeClaims {
    pub fn new(tenant_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            project_id: project_id.into(),
        }
    }

    /// Read the scope claims out of a JWT without checking its signature or
    /// expiry. The hosted service performs the real verification.
    pub fn from_token(token: &str) -> Result<Self, CoreError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<ScopeClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| CoreError::Validation(format!("Access token has no usable scope claims: {e}")))
    }

    /// Whether a row carrying `tenantid` / `projectid` values is visible
    /// under these claims.
    pub fn permits(&self, tenant_id: Option<&str>, project_id: Option<&str>) -> bool {
        tenant_id == Some(self.tenant_id.as_str()) && project_id == Some(self.project_id.as_str())
    }
}
