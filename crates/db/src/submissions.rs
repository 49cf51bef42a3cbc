//! JSON-file store for form submissions.
//!
//! All records live in one pretty-printed JSON array. Every read-modify-write
//! runs under an async mutex and the file is replaced by writing a sibling
//! temp file and renaming it over the original, so a reader never observes a
//! half-written file. The lock is per process: two processes sharing the same
//! file can still lose each other's updates.
//!
//! A file that does not parse is reported as [`StoreError::Corrupt`] and left
//! untouched. That includes a record whose `formType` is not one of the known
//! forms: a single such record makes list, create and delete fail until the
//! file is repaired by hand.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use webmarket_core::form_submission::{
    sort_newest_first, FormData, FormSubmission, FormType, SubmissionFilter,
};

/// File name inside the data directory.
pub const SUBMISSIONS_FILE: &str = "form-submissions.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Submissions file {} is not a valid JSON array: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize submissions: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Submission not found: {id}")]
    NotFound { id: String },

    #[error("{0}")]
    Validation(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Form submissions persisted in `{data_dir}/form-submissions.json`.
pub struct FormSubmissionStore {
    dir: PathBuf,
    path: PathBuf,
    lock: Mutex<()>,
}

impl FormSubmissionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let dir = data_dir.into();
        let path = dir.join(SUBMISSIONS_FILE);
        Self {
            dir,
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All submissions matching `filter`, newest first.
    pub async fn list(&self, filter: &SubmissionFilter) -> Result<Vec<FormSubmission>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.read_all().await?;
        sort_newest_first(&mut submissions);
        Ok(filter.apply(submissions))
    }

    /// Append a new submission stamped with the current time.
    pub async fn create(
        &self,
        form_type: FormType,
        form_data: FormData,
    ) -> Result<FormSubmission, StoreError> {
        let _guard = self.lock.lock().await;
        let mut submissions = self.read_all().await?;

        let submission = FormSubmission::new(form_type, form_data, Utc::now());
        submissions.push(submission.clone());
        self.write_all(&submissions).await?;

        tracing::info!(
            submission_id = %submission.id,
            form_type = %submission.form_type,
            total = submissions.len(),
            "Form submission stored",
        );
        Ok(submission)
    }

    /// Remove the submission with `id`.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if id.is_empty() {
            return Err(StoreError::Validation("Missing submission ID".into()));
        }

        let _guard = self.lock.lock().await;
        let mut submissions = self.read_all().await?;

        let before = submissions.len();
        submissions.retain(|s| s.id != id);
        if submissions.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        self.write_all(&submissions).await?;
        tracing::info!(submission_id = %id, remaining = submissions.len(), "Form submission deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // File access (caller holds the lock)
    // -----------------------------------------------------------------------

    async fn read_all(&self) -> Result<Vec<FormSubmission>, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, submissions: &[FormSubmission]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(submissions)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))
    }
}
