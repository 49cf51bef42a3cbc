//! Handler for relaying a submitted form to the site owner by email.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use webmarket_core::form_submission::validate_submission_input;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::handlers::form_submissions::CreateSubmissionRequest;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSentResponse {
    pub success: bool,
    pub message: &'static str,
    pub message_id: String,
}

/// POST /api/send-email
///
/// Render the notification for `{ formType, formData }` and send it over
/// SMTP. Responds 503 when no SMTP host is configured.
pub async fn send_form_email(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSubmissionRequest>,
) -> AppResult<impl IntoResponse> {
    let (form_type, form_data) =
        validate_submission_input(input.form_type.as_deref(), input.form_data)?;

    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("Email delivery is not configured".into()))?;

    let message_id = mailer.send_form_notification(form_type, &form_data).await?;

    Ok(Json(EmailSentResponse {
        success: true,
        message: "Email sent successfully",
        message_id,
    }))
}
