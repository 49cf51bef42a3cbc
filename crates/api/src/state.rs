use std::sync::Arc;

use webmarket_db::submissions::FormSubmissionStore;
use webmarket_db::ScopedClient;
use webmarket_notify::EmailDelivery;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// JSON-file store for contact and start-project forms.
    pub submissions: Arc<FormSubmissionStore>,
    /// Tenant-scoped client for the hosted database.
    pub db: ScopedClient,
    /// SMTP delivery; `None` when `SMTP_HOST` is not set.
    pub mailer: Option<Arc<EmailDelivery>>,
}
