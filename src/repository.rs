//! Repository: the only code that reads or writes persisted tasks.
//!
//! Every operation reads the whole list, changes an in-memory copy and writes
//! the whole list back. Operations take `&mut self`, so two of them can never
//! interleave their read-modify-write sequences.

use crate::clock;
use crate::id::generate_id;
use crate::schema::read_record;
use crate::storage::{Storage, StorageError};
use crate::types::{CreateTaskInput, Task, UpdateTaskInput};
use serde_json::Value;
use std::fmt;

/// Logical key the task list lives under.
pub const DEFAULT_STORAGE_KEY: &str = "taskboard_tasks";

/// Why an import payload was rejected after it parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFormatError {
    /// The payload parsed but is not a list.
    NotAList,
    /// The list held no structurally valid task.
    NoValidTasks,
}

/// Errors returned by repository operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// No task has this id.
    NotFound(String),
    /// A write was rejected because storage is full.
    StorageFull,
    /// Any other write failure.
    StorageFault(String),
    /// Import payload has the wrong shape.
    ImportFormat(ImportFormatError),
    /// Import payload is not well-formed JSON.
    Parse(String),
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::NotFound(id) => write!(f, "Task not found: {}", id),
            RepoError::StorageFull => {
                write!(f, "Storage is full. Try deleting some tasks or clearing old data.")
            }
            RepoError::StorageFault(reason) => write!(f, "Failed to save tasks: {}", reason),
            RepoError::ImportFormat(ImportFormatError::NotAList) => {
                write!(f, "Invalid format: expected an array of tasks")
            }
            RepoError::ImportFormat(ImportFormatError::NoValidTasks) => {
                write!(f, "No valid tasks found in file")
            }
            RepoError::Parse(reason) => write!(f, "Invalid JSON file: {}", reason),
        }
    }
}

impl std::error::Error for RepoError {}

impl From<StorageError> for RepoError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::QuotaExceeded => RepoError::StorageFull,
            StorageError::Backend(reason) => RepoError::StorageFault(reason),
        }
    }
}

/// Persistence-backed task repository.
pub struct Repository<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> Repository<S> {
    /// Create a repository over `storage` using the default key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a repository that keeps its list under `key`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Read and migrate the stored list.
    ///
    /// Absent, unreadable or corrupt storage reads as an empty list; records
    /// that cannot be repaired are dropped.
    pub(crate) fn read_tasks(&self) -> Vec<Task> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read tasks, treating storage as empty: {}", e);
                return Vec::new();
            }
        };

        let records = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                log::warn!("Stored tasks are not a list, treating storage as empty");
                return Vec::new();
            }
            Err(e) => {
                log::warn!("Stored tasks are corrupt, treating storage as empty: {}", e);
                return Vec::new();
            }
        };

        let total = records.len();
        let tasks: Vec<Task> = records.into_iter().filter_map(read_record).collect();
        if tasks.len() < total {
            log::warn!("Dropped {} unreadable stored task(s)", total - tasks.len());
        }
        tasks
    }

    /// Replace the stored list.
    pub(crate) fn write_tasks(&mut self, tasks: &[Task]) -> Result<(), RepoError> {
        let json = serde_json::to_string(tasks).map_err(|e| RepoError::StorageFault(e.to_string()))?;
        self.storage.set(&self.key, &json).map_err(|e| {
            log::warn!("Failed to write {} task(s): {}", tasks.len(), e);
            RepoError::from(e)
        })
    }

    /// All tasks in stored order. Never fails: corrupt storage reads as empty.
    pub fn list(&self) -> Result<Vec<Task>, RepoError> {
        Ok(self.read_tasks())
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<Task> {
        self.read_tasks().into_iter().find(|t| t.id == id)
    }

    /// Create a task from `input` and append it to the stored list.
    pub fn create(&mut self, input: CreateTaskInput) -> Result<Task, RepoError> {
        let now = clock::now();
        let task = Task {
            id: generate_id(&input.title, &now),
            title: input.title,
            description: input.description,
            status: input.status,
            priority: input.priority,
            due_date: input.due_date,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut tasks = self.read_tasks();
        tasks.push(task.clone());
        self.write_tasks(&tasks)?;

        log::debug!("Created task {}", task.id);
        Ok(task)
    }

    /// Merge `patch` into the task with `id` and refresh its `updatedAt`.
    pub fn update(&mut self, id: &str, patch: &UpdateTaskInput) -> Result<Task, RepoError> {
        let mut tasks = self.read_tasks();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        patch.apply_to(task);
        task.updated_at = clock::refreshed(&task.updated_at);
        let updated = task.clone();

        self.write_tasks(&tasks)?;
        Ok(updated)
    }

    /// Remove the task with `id`, returning the removed record.
    pub fn delete(&mut self, id: &str) -> Result<Task, RepoError> {
        let mut tasks = self.read_tasks();
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        let removed = tasks.remove(index);
        self.write_tasks(&tasks)?;
        Ok(removed)
    }

    /// Re-append a previously deleted task verbatim.
    ///
    /// The id is not checked against stored tasks; restoring a task whose id
    /// still exists leaves two records with that id.
    pub fn restore(&mut self, task: Task) -> Result<Task, RepoError> {
        let mut tasks = self.read_tasks();
        tasks.push(task.clone());
        self.write_tasks(&tasks)?;
        Ok(task)
    }

    /// Remove the stored list entirely.
    pub fn clear(&mut self) -> Result<(), RepoError> {
        self.storage.remove(&self.key)?;
        Ok(())
    }
}
