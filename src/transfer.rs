//! Export and import of the task list as JSON.

use crate::repository::{ImportFormatError, RepoError, Repository};
use crate::schema::{is_valid_task, normalize_task};
use crate::storage::Storage;
use crate::types::Task;
use serde_json::Value;
use std::collections::HashSet;

/// Base name of exported files.
pub const EXPORT_FILE_NAME: &str = "tasks.json";

impl<S: Storage> Repository<S> {
    /// Serialize the stored list as pretty-printed JSON.
    pub fn export(&self) -> String {
        let tasks = self.read_tasks();
        serde_json::to_string_pretty(&tasks).unwrap_or_else(|e| {
            log::warn!("Failed to serialize tasks for export: {}", e);
            "[]".to_string()
        })
    }

    /// Merge the tasks in `text` into storage.
    ///
    /// Invalid records are dropped and the rest normalized. Stored tasks that
    /// share an id with an imported one are replaced: the result is the
    /// untouched stored tasks in their order followed by the imported tasks in
    /// file order. Returns the merged list.
    pub fn import(&mut self, text: &str) -> Result<Vec<Task>, RepoError> {
        let parsed: Value = serde_json::from_str(text).map_err(|e| RepoError::Parse(e.to_string()))?;
        let Value::Array(records) = parsed else {
            return Err(RepoError::ImportFormat(ImportFormatError::NotAList));
        };

        let total = records.len();
        let imported: Vec<Task> = records
            .iter()
            .filter(|record| is_valid_task(record))
            .map(normalize_task)
            .collect();
        if imported.is_empty() {
            return Err(RepoError::ImportFormat(ImportFormatError::NoValidTasks));
        }

        let imported_ids: HashSet<&str> = imported.iter().map(|t| t.id.as_str()).collect();
        let existing = self.read_tasks();
        let existing_count = existing.len();
        let mut merged: Vec<Task> = existing
            .into_iter()
            .filter(|t| !imported_ids.contains(t.id.as_str()))
            .collect();
        let replaced = existing_count - merged.len();
        merged.extend(imported.iter().cloned());

        self.write_tasks(&merged)?;
        log::info!(
            "Imported {} of {} record(s), {} replaced existing task(s)",
            imported.len(),
            total,
            replaced
        );
        Ok(merged)
    }
}
