//! Construction of the [`ScopedClient`] used by the todo handlers.

use std::sync::Arc;
use std::time::Duration;

use webmarket_core::error::CoreError;
use webmarket_core::scope::ScopeClaims;
use webmarket_db::gateways::{MemoryGateway, PostgrestGateway};
use webmarket_db::repositories::todo_repo::TODOS_TABLE;
use webmarket_db::{DbError, ScopedClient, ScopedCredential};

use crate::config::SupabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum DataClientError {
    #[error("Invalid SUPABASE_ACCESS_TOKEN: {0}")]
    Token(#[from] CoreError),

    #[error(
        "Access token is scoped to tenant '{token_tenant}' / project '{token_project}' \
         but writes are configured for tenant '{tenant}' / project '{project}'"
    )]
    ScopeMismatch {
        token_tenant: String,
        token_project: String,
        tenant: String,
        project: String,
    },

    #[error("Failed to build database client: {0}")]
    Gateway(#[from] DbError),
}

/// Build the scoped client for `config`.
///
/// With a service URL the client talks to the hosted database and the access
/// token's claims must name the configured tenant and project. Without one
/// it runs against a fresh in-memory `todos` table.
pub fn build_scoped_client(config: &SupabaseConfig) -> Result<ScopedClient, DataClientError> {
    let scope = ScopeClaims::new(&config.tenant_id, &config.project_id);

    let Some(url) = &config.url else {
        let gateway = MemoryGateway::new().with_table(TODOS_TABLE);
        return Ok(ScopedClient::new(
            Arc::new(gateway),
            ScopedCredential::local(scope.clone()),
            scope,
        ));
    };

    let credential = ScopedCredential::from_token(config.access_token.clone())?;
    if credential.claims() != &scope {
        return Err(DataClientError::ScopeMismatch {
            token_tenant: credential.claims().tenant_id.clone(),
            token_project: credential.claims().project_id.clone(),
            tenant: scope.tenant_id,
            project: scope.project_id,
        });
    }

    let gateway = PostgrestGateway::new(
        url,
        config.anon_key.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(ScopedClient::new(Arc::new(gateway), credential, scope))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use super::*;

    fn remote(token: String) -> SupabaseConfig {
        SupabaseConfig {
            url: Some("https://example.supabase.co".into()),
            anon_key: "anon".into(),
            access_token: token,
            ..SupabaseConfig::local("tenant-a", "project-a")
        }
    }

    fn token(tenant: &str, project: &str) -> String {
        encode(
            &Header::default(),
            &json!({"tenant_id": tenant, "project_id": project, "role": "anon"}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[test]
    fn local_config_uses_memory_backend() {
        let client = build_scoped_client(&SupabaseConfig::local("t", "p")).unwrap();
        assert_eq!(client.backend(), "memory");
        assert_eq!(client.scope(), &ScopeClaims::new("t", "p"));
    }

    #[test]
    fn matching_token_builds_rest_client() {
        let client = build_scoped_client(&remote(token("tenant-a", "project-a"))).unwrap();
        assert_eq!(client.backend(), "postgrest");
    }

    #[test]
    fn mismatched_token_is_refused() {
        assert_matches!(
            build_scoped_client(&remote(token("tenant-b", "project-a"))).err(),
            Some(DataClientError::ScopeMismatch { token_tenant, .. }) if token_tenant == "tenant-b"
        );
    }

    #[test]
    fn unreadable_token_is_refused() {
        assert_matches!(
            build_scoped_client(&remote("garbage".into())).err(),
            Some(DataClientError::Token(_))
        );
    }
}
