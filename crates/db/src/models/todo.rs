//! Todo demo table models and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use webmarket_core::error::CoreError;
use webmarket_core::todo::TodoPriority;
use webmarket_core::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (table rows)
// ---------------------------------------------------------------------------

/// A row from the `todos` table.
///
/// The table gives `completed`, `priority`, `tags` and the timestamps
/// column defaults but no `NOT NULL`, so an explicit `null` reads as the
/// column default (or `None` for the timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: RecordId,
    pub tenantid: String,
    pub projectid: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: TodoPriority,
    pub due_date: Option<Timestamp>,
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a todo. The scoping columns are added by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: TodoPriority,
    pub due_date: Option<Timestamp>,
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            completed: false,
            priority: TodoPriority::default(),
            due_date: None,
            assigned_to: None,
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        Ok(())
    }
}

/// DTO for a partial update. Only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TodoPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
            && self.tags.is_none()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::Validation("update must change at least one field".into()));
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Columns a todo listing may be ordered by.
pub const TODO_SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "due_date",
    "priority",
    "title",
    "completed",
];

/// Typed filters for listing todos. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoFilter {
    pub priority: Option<TodoPriority>,
    pub completed: Option<bool>,
    /// Substring matched case-insensitively against title or description.
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Row counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub urgent: i64,
}

impl PriorityCounts {
    pub fn set(&mut self, priority: TodoPriority, count: i64) {
        match priority {
            TodoPriority::Low => self.low = count,
            TodoPriority::Medium => self.medium = count,
            TodoPriority::High => self.high = count,
            TodoPriority::Urgent => self.urgent = count,
        }
    }

    pub fn sum(&self) -> i64 {
        self.low + self.medium + self.high + self.urgent
    }
}

/// Summary counts over the visible todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub incomplete: i64,
    pub by_priority: PriorityCounts,
}
