//! Core data types for the task board.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The unit of work tracked by the board.
///
/// Field names serialize in camelCase so the persisted and exported JSON reads
/// `dueDate`, `createdAt` and `updatedAt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique identifier, immutable after creation
    pub id: String,

    /// Short description of the work
    pub title: String,

    /// Longer description, may be empty
    pub description: String,

    /// Workflow column the task sits in
    pub status: Status,

    /// Urgency tier
    pub priority: Priority,

    /// Date-only string (`YYYY-MM-DD`), `None` means no due date
    pub due_date: Option<String>,

    /// RFC 3339 timestamp, set once at creation
    pub created_at: String,

    /// RFC 3339 timestamp, refreshed on every mutation
    pub updated_at: String,
}

/// Workflow column a task occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// All statuses in board column order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Wire value as stored and exported.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Column heading shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

/// Task urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
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

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// Error returned when parsing an unknown status or priority name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields supplied by the caller when creating a task.
///
/// Title validation happens in the form layer before this reaches the
/// repository; the repository trusts these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<String>,
}

impl CreateTaskInput {
    /// Create an input with just a title and default everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: Status::default(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// Partial patch applied by update and batch-update.
///
/// `None` leaves a field untouched. `due_date` is doubly optional so a patch
/// can clear the date (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<String>>,
}

impl UpdateTaskInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that only moves the task to another column.
    pub fn status_only(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: Option<String>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// True when the patch would change nothing but `updatedAt`.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    /// Merge the patch into `task`, leaving unspecified fields alone.
    pub(crate) fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = due_date.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task() -> Task {
        Task {
            id: "tb-0000000000000001".to_string(),
            title: "Write docs".to_string(),
            description: String::new(),
            status: Status::Todo,
            priority: Priority::Medium,
            due_date: None,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
            updated_at: "2025-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!("done".parse::<Status>().unwrap(), Status::Done);
        assert!("in_progress".parse::<Status>().is_err());
    }

    #[test]
    fn test_priority_parse_unknown() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert_eq!(err.to_string(), "unknown priority 'urgent'");
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let json = serde_json::to_value(make_task()).unwrap();
        assert!(json.get("dueDate").unwrap().is_null());
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00.000Z");
        assert_eq!(json["status"], "todo");
    }

    #[test]
    fn test_patch_preserves_unspecified_fields() {
        let mut task = make_task();
        task.due_date = Some("2025-02-01".to_string());

        UpdateTaskInput::new().priority(Priority::High).apply_to(&mut task);

        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.due_date.as_deref(), Some("2025-02-01"));
    }

    #[test]
    fn test_patch_clears_due_date() {
        let mut task = make_task();
        task.due_date = Some("2025-02-01".to_string());

        UpdateTaskInput::new().due_date(None).apply_to(&mut task);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_status_labels_in_column_order() {
        let labels: Vec<_> = Status::ALL.iter().map(Status::label).collect();
        assert_eq!(labels, vec!["To Do", "In Progress", "Done"]);
    }
}
