//! Structural validation, normalization and migration of task records.
//!
//! Two kinds of untrusted input reach the board: imported files and whatever
//! an older build left in storage. Both go through this module so every task
//! that leaves the repository has the full [`Task`] shape.

use crate::clock;
use crate::types::{Priority, Status, Task};
use serde::Deserialize;
use serde_json::Value;

/// Structural check for a task-like record.
///
/// Requires a non-empty string `id` and `title`, a string `description`, a
/// known `status`, and string `createdAt`/`updatedAt`. `priority` and
/// `dueDate` are not required; normalization fills them in so records from
/// older schemas stay importable.
pub fn is_valid_task(candidate: &Value) -> bool {
    let Some(obj) = candidate.as_object() else {
        return false;
    };

    let non_empty_str = |key: &str| obj.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    let is_str = |key: &str| obj.get(key).is_some_and(Value::is_string);

    non_empty_str("id")
        && non_empty_str("title")
        && is_str("description")
        && obj
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s.parse::<Status>().is_ok())
        && is_str("createdAt")
        && is_str("updatedAt")
}

/// Build a complete task from a record that passed [`is_valid_task`].
///
/// Unknown or missing priority becomes `medium`, a non-string `dueDate`
/// becomes `None`, and a missing description becomes empty.
pub fn normalize_task(candidate: &Value) -> Task {
    let str_field = |key: &str| {
        candidate
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let raw = |key: &str| candidate.get(key).and_then(Value::as_str);

    Task {
        id: str_field("id"),
        title: str_field("title"),
        description: str_field("description"),
        status: raw("status").and_then(|s| s.parse().ok()).unwrap_or_default(),
        priority: raw("priority").and_then(|s| s.parse().ok()).unwrap_or_default(),
        due_date: candidate.get("dueDate").and_then(Value::as_str).map(String::from),
        created_at: str_field("createdAt"),
        updated_at: str_field("updatedAt"),
    }
}

/// A task as it may sit in storage, written by this or an older schema.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Status,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for StoredTask {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: Some(task.priority),
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Fill fields added after the first schema. Idempotent.
pub fn migrate_task(stored: StoredTask) -> Task {
    Task {
        id: stored.id,
        title: stored.title,
        description: stored.description,
        status: stored.status,
        priority: stored.priority.unwrap_or_default(),
        due_date: stored.due_date,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    }
}

/// Decode one stored record, repairing it when possible.
///
/// Current and legacy records decode directly and are migrated. Any other
/// object with a non-empty string `id` and `title` is normalized: unknown or
/// missing status becomes `todo`, a non-string description becomes empty and
/// missing timestamps become the time of the read. Records without a usable
/// id or title yield `None`.
pub fn read_record(record: Value) -> Option<Task> {
    if is_valid_task(&record) {
        if let Ok(stored) = StoredTask::deserialize(&record) {
            return Some(migrate_task(stored));
        }
    }

    let usable = |key: &str| record.get(key).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    if !usable("id") || !usable("title") {
        return None;
    }

    let mut task = normalize_task(&record);
    if task.created_at.is_empty() {
        task.created_at = clock::now();
    }
    if task.updated_at.is_empty() {
        task.updated_at = task.created_at.clone();
    }
    Some(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "id": "tb-1",
            "title": "Ship it",
            "description": "",
            "status": "in-progress",
            "priority": "high",
            "dueDate": "2025-03-01",
            "createdAt": "2025-01-01T00:00:00.000Z",
            "updatedAt": "2025-01-02T00:00:00.000Z"
        })
    }

    #[test]
    fn test_valid_full_record() {
        assert!(is_valid_task(&full_record()));
    }

    #[test]
    fn test_valid_without_priority_and_due_date() {
        let mut record = full_record();
        let obj = record.as_object_mut().unwrap();
        obj.remove("priority");
        obj.remove("dueDate");
        assert!(is_valid_task(&record));
    }

    #[test]
    fn test_invalid_records() {
        assert!(!is_valid_task(&json!({"foo": "bar"})));
        assert!(!is_valid_task(&json!("tb-1")));
        assert!(!is_valid_task(&Value::Null));

        let mut empty_id = full_record();
        empty_id["id"] = json!("");
        assert!(!is_valid_task(&empty_id));

        let mut empty_title = full_record();
        empty_title["title"] = json!("");
        assert!(!is_valid_task(&empty_title));

        let mut bad_status = full_record();
        bad_status["status"] = json!("blocked");
        assert!(!is_valid_task(&bad_status));

        let mut numeric_description = full_record();
        numeric_description["description"] = json!(3);
        assert!(!is_valid_task(&numeric_description));

        let mut missing_created = full_record();
        missing_created.as_object_mut().unwrap().remove("createdAt");
        assert!(!is_valid_task(&missing_created));
    }

    #[test]
    fn test_normalize_defaults() {
        let mut record = full_record();
        record["priority"] = json!("urgent");
        record["dueDate"] = json!(20250301);

        let task = normalize_task(&record);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.created_at, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_normalize_keeps_valid_fields() {
        let task = normalize_task(&full_record());
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date.as_deref(), Some("2025-03-01"));
    }

    #[test]
    fn test_migrate_fills_missing_fields() {
        let legacy = json!({
            "id": "tb-legacy",
            "title": "Old task",
            "description": "from v1",
            "status": "done",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T00:00:00.000Z"
        });
        let stored: StoredTask = serde_json::from_value(legacy).unwrap();
        let task = migrate_task(stored);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let once = migrate_task(serde_json::from_value(full_record()).unwrap());
        let twice = migrate_task(StoredTask::from(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_read_record_repairs_unknown_priority() {
        let mut record = full_record();
        record["priority"] = json!("urgent");
        let task = read_record(record).unwrap();
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn test_read_record_defaults_unknown_or_missing_status() {
        let mut blocked = full_record();
        blocked["status"] = json!("blocked");
        assert_eq!(read_record(blocked).unwrap().status, Status::Todo);

        let mut missing = full_record();
        missing.as_object_mut().unwrap().remove("status");
        let task = read_record(missing).unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.updated_at, "2025-01-02T00:00:00.000Z");
    }

    #[test]
    fn test_read_record_null_description_becomes_empty() {
        let mut record = full_record();
        record["description"] = Value::Null;
        let task = read_record(record).unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn test_read_record_fills_missing_timestamps() {
        let task = read_record(json!({"id": "tb-bare", "title": "Bare"})).unwrap();
        assert!(!task.created_at.is_empty());
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.status, Status::Todo);
    }

    #[test]
    fn test_read_record_drops_garbage() {
        assert!(read_record(json!({"foo": "bar"})).is_none());
        assert!(read_record(json!({"id": "tb-1", "title": ""})).is_none());
        assert!(read_record(json!({"id": 7, "title": "Numeric id"})).is_none());
        assert!(read_record(json!(42)).is_none());
    }
}
