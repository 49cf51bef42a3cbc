use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webmarket_api::config::ServerConfig;
use webmarket_api::data_client::build_scoped_client;
use webmarket_api::router::build_app_router;
use webmarket_api::state::AppState;
use webmarket_db::submissions::FormSubmissionStore;
use webmarket_notify::{EmailConfig, EmailDelivery};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webmarket_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Form submission store ---
    let submissions = Arc::new(FormSubmissionStore::new(&config.data_dir));
    tracing::info!(path = %submissions.path().display(), "Form submission store ready");

    // --- Hosted database ---
    let db = build_scoped_client(&config.supabase).expect("Failed to configure database client");
    tracing::info!(
        backend = db.backend(),
        tenant_id = %db.scope().tenant_id,
        project_id = %db.scope().project_id,
        "Database client configured",
    );
    if config.supabase.url.is_none() {
        tracing::warn!("SUPABASE_URL not set; todos are kept in memory and lost on restart");
    }

    // --- Email ---
    let mailer = match EmailConfig::from_env() {
        Some(email_config) => {
            let delivery =
                EmailDelivery::new(email_config).expect("Invalid SMTP configuration");
            tracing::info!(
                smtp_host = %delivery.config().smtp_host,
                to = %delivery.config().to_address,
                "Email delivery enabled",
            );
            Some(Arc::new(delivery))
        }
        None => {
            tracing::info!("SMTP_HOST not set; email delivery disabled");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        submissions,
        db,
        mailer,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
