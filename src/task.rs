//! Task data model.
//!
//! Tasks are owner-scoped records: every task belongs to exactly one
//! owner and is only visible through queries carrying that owner id.
//! Serialized field names are camelCase to match the dashboard wire
//! format (`ownerId`, `createdAt`, ...).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Task priority. The ordinal order (low < medium < high) is what sorting
/// and filtering use; the lexical order of the names is meaningless.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::InvalidArgument(format!(
                "invalid priority '{other}' (expected low, medium, or high)"
            ))),
        }
    }
}

/// A single task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task for `owner_id` from a validated draft.
    pub fn new(owner_id: impl Into<String>, draft: TaskDraft) -> Result<Self> {
        let title = normalize_title(&draft.title)?;
        let now = Utc::now();
        Ok(Self {
            id: Ulid::new().to_string().to_lowercase(),
            owner_id: owner_id.into(),
            title,
            description: normalize_optional(draft.description),
            priority: draft.priority.unwrap_or_default(),
            deadline: draft.deadline,
            completed: false,
            categories: normalize_set(draft.categories),
            tags: normalize_set(draft.tags),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update. `updated_at` bumps on every call;
    /// `id`, `owner_id`, and `created_at` never change.
    pub fn apply(&mut self, patch: TaskPatch) -> Result<()> {
        if let Some(title) = patch.title {
            self.title = normalize_title(&title)?;
        }
        if let Some(description) = patch.description {
            self.description = normalize_optional(Some(description));
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(categories) = patch.categories {
            self.categories = normalize_set(categories);
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_set(tags);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: DateTime<Utc>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Partial update for an existing task. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub categories: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.categories.is_none()
            && self.tags.is_none()
            && self.completed.is_none()
    }
}

fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn normalize_set(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .filter_map(|raw| {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
