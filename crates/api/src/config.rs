use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `form-submissions.json` (default: `data`).
    pub data_dir: PathBuf,
    /// Hosted database connection and row scope.
    pub supabase: SupabaseConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATA_DIR`             | `data`                     |
    ///
    /// See [`SupabaseConfig::from_env`] for the database variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            supabase: SupabaseConfig::from_env(),
        }
    }
}

/// Hosted Postgres (Supabase) settings.
///
/// When `url` is `None` the server runs against the in-process memory
/// gateway, scoped to `tenant_id` / `project_id`.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: String,
    /// Scoped JWT whose claims the service's row-level policy checks.
    pub access_token: String,
    pub tenant_id: String,
    pub project_id: String,
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `SUPABASE_URL`          | unset (memory backend)    |
    /// | `SUPABASE_ANON_KEY`     | required with URL         |
    /// | `SUPABASE_ACCESS_TOKEN` | required with URL         |
    /// | `SUPABASE_TENANT_ID`    | `local`                   |
    /// | `SUPABASE_PROJECT_ID`   | `local`                   |
    /// | `SUPABASE_TIMEOUT_SECS` | `30`                      |
    pub fn from_env() -> Self {
        let url = std::env::var("SUPABASE_URL").ok().filter(|u| !u.is_empty());

        let (anon_key, access_token) = if url.is_some() {
            (
                std::env::var("SUPABASE_ANON_KEY")
                    .expect("SUPABASE_ANON_KEY must be set when SUPABASE_URL is set"),
                std::env::var("SUPABASE_ACCESS_TOKEN")
                    .expect("SUPABASE_ACCESS_TOKEN must be set when SUPABASE_URL is set"),
            )
        } else {
            (String::new(), String::new())
        };

        let timeout_secs: u64 = std::env::var("SUPABASE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SUPABASE_TIMEOUT_SECS must be a valid u64");

        Self {
            url,
            anon_key,
            access_token,
            tenant_id: std::env::var("SUPABASE_TENANT_ID").unwrap_or_else(|_| "local".into()),
            project_id: std::env::var("SUPABASE_PROJECT_ID").unwrap_or_else(|_| "local".into()),
            timeout_secs,
        }
    }

    /// Memory-backed configuration for the given scope.
    pub fn local(tenant_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            url: None,
            anon_key: String::new(),
            access_token: String::new(),
            tenant_id: tenant_id.into(),
            project_id: project_id.into(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("tenant_id", &self.tenant_id)
            .field("project_id", &self.project_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
