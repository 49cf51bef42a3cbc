//! Form submission records captured from the contact and start-project pages.
//!
//! Records are persisted by `webmarket_db::submissions::FormSubmissionStore`;
//! this module owns the record shape, id generation, input validation and the
//! admin-page filtering rules.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{RecordId, Timestamp};

/// Opaque key/value payload of a submitted form.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// Prefix of every generated submission id.
const ID_PREFIX: &str = "submission";

/// Length of the random base36 suffix appended to submission ids.
const ID_SUFFIX_LEN: usize = 9;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `formData` keys searched by [`SubmissionFilter::search`].
pub const SEARCH_FIELDS: &[&str] = &["name", "email", "businessName", "message", "description"];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which page produced the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormType {
    Contact,
    StartProject,
}

impl FormType {
    pub const ALL: [FormType; 2] = [FormType::Contact, FormType::StartProject];

    pub fn as_str(self) -> &'static str {
        match self {
            FormType::Contact => "contact",
            FormType::StartProject => "start-project",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid form type '{s}'. Must be one of: {}",
                    FormType::ALL.map(FormType::as_str).join(", ")
                ))
            })
    }
}

/// Review state of a submission. Only `New` is ever written; there is no
/// operation that moves a submission to another state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
    Responded,
    Archived,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A persisted contact or project-request form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub id: RecordId,
    pub form_type: FormType,
    pub form_data: FormData,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormSubmission {
    /// Build a fresh `new` submission stamped with `now`.
    pub fn new(form_type: FormType, form_data: FormData, now: Timestamp) -> Self {
        Self {
            id: generate_submission_id(now),
            form_type,
            form_data,
            status: SubmissionStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generate a submission id: `submission-{unix_millis}-{9 base36 chars}`.
///
/// Uniqueness relies on the timestamp plus the random suffix; no collision
/// check is performed against existing records.
pub fn generate_submission_id(now: Timestamp) -> RecordId {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char)
        .collect();
    format!("{ID_PREFIX}-{}-{suffix}", now.timestamp_millis())
}

/// Validate the raw `formType` / `formData` pair of a create request.
///
/// Both fields are required. `formType` must name a known form and
/// `formData` must be a JSON object.
pub fn validate_submission_input(
    form_type: Option<&str>,
    form_data: Option<serde_json::Value>,
) -> Result<(FormType, FormData), CoreError> {
    let (form_type, form_data) = match (form_type, form_data) {
        (Some(t), Some(d)) if !t.is_empty() && !d.is_null() => (t, d),
        _ => return Err(CoreError::Validation("Missing formType or formData".into())),
    };

    let form_type = form_type.parse::<FormType>()?;

    match form_data {
        serde_json::Value::Object(map) => Ok((form_type, map)),
        _ => Err(CoreError::Validation("formData must be a JSON object".into())),
    }
}

/// Order submissions newest first. Stable, so equal timestamps keep file order.
pub fn sort_newest_first(submissions: &mut [FormSubmission]) {
    submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Admin-page filter over the submission list.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub form_type: Option<FormType>,
    /// Case-insensitive substring matched against [`SEARCH_FIELDS`].
    pub search: Option<String>,
}

impl SubmissionFilter {
    pub fn is_empty(&self) -> bool {
        self.form_type.is_none() && self.search.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, submission: &FormSubmission) -> bool {
        if let Some(form_type) = self.form_type {
            if submission.form_type != form_type {
                return false;
            }
        }

        match self.search.as_deref() {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                SEARCH_FIELDS.iter().any(|field| {
                    submission
                        .form_data
                        .get(*field)
                        .and_then(serde_json::Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(&term))
                })
            }
            _ => true,
        }
    }

    /// Keep only matching submissions, preserving their relative order.
    pub fn apply(&self, submissions: Vec<FormSubmission>) -> Vec<FormSubmission> {
        if self.is_empty() {
            return submissions;
        }
        submissions.into_iter().filter(|s| self.matches(s)).collect()
    }
}
