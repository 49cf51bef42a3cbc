//! Handlers for contact / start-project form submissions.
//!
//! Submissions are kept in the JSON-file store; these endpoints back the
//! public forms (create) and the admin forms page (list, filter, delete).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use webmarket_core::form_submission::{
    validate_submission_input, FormSubmission, FormType, SubmissionFilter,
};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListParams {
    pub form_type: Option<String>,
    pub search: Option<String>,
}

/// Both fields are optional here so a missing one is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    pub form_type: Option<String>,
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSubmissionParams {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionListResponse {
    pub success: bool,
    pub submissions: Vec<FormSubmission>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SubmissionCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub submission: FormSubmission,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/form-submissions
///
/// All submissions, newest first, optionally filtered by `formType` and a
/// case-insensitive `search` term.
pub async fn list_submissions(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SubmissionListParams>,
) -> AppResult<impl IntoResponse> {
    let form_type = params
        .form_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<FormType>)
        .transpose()?;
    let filter = SubmissionFilter {
        form_type,
        search: params.search,
    };

    let submissions = state
        .submissions
        .list(&filter)
        .await
        .map_err(AppError::store("Failed to retrieve submissions"))?;

    Ok(Json(SubmissionListResponse {
        success: true,
        total: submissions.len(),
        submissions,
    }))
}

/// POST /api/form-submissions
///
/// Validate and persist a new submission with status `new`.
pub async fn create_submission(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSubmissionRequest>,
) -> AppResult<impl IntoResponse> {
    let (form_type, form_data) =
        validate_submission_input(input.form_type.as_deref(), input.form_data)?;

    let submission = state
        .submissions
        .create(form_type, form_data)
        .await
        .map_err(AppError::store("Failed to save submission"))?;

    Ok(Json(SubmissionCreatedResponse {
        success: true,
        message: "Form submission saved successfully",
        submission,
    }))
}

/// DELETE /api/form-submissions?id=
pub async fn delete_submission(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DeleteSubmissionParams>,
) -> AppResult<impl IntoResponse> {
    let id = params
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing submission ID".into()))?;

    state
        .submissions
        .delete(&id)
        .await
        .map_err(AppError::store("Failed to delete submission"))?;

    Ok(Json(MessageResponse::ok("Submission deleted successfully")))
}
