//! Batch operations over sets of task ids.

use crate::clock;
use crate::repository::{RepoError, Repository};
use crate::storage::Storage;
use crate::types::{Task, UpdateTaskInput};
use std::collections::HashSet;

/// Extension trait for batch operations on a [`Repository`].
pub trait RepositoryBatchExt {
    /// Remove every task whose id is in `ids`. Unknown ids are ignored.
    /// Returns the removed records in stored order.
    fn batch_delete(&mut self, ids: &[&str]) -> Result<Vec<Task>, RepoError>;

    /// Apply `patch` to every task whose id is in `ids`, preserving order.
    /// Returns only the updated tasks.
    fn batch_update(&mut self, ids: &[&str], patch: &UpdateTaskInput) -> Result<Vec<Task>, RepoError>;

    /// Re-append previously deleted tasks verbatim, in the given order.
    fn batch_restore(&mut self, tasks: Vec<Task>) -> Result<Vec<Task>, RepoError>;
}

impl<S: Storage> RepositoryBatchExt for Repository<S> {
    fn batch_delete(&mut self, ids: &[&str]) -> Result<Vec<Task>, RepoError> {
        let id_set: HashSet<&str> = ids.iter().copied().collect();
        let (removed, remaining): (Vec<Task>, Vec<Task>) = self
            .read_tasks()
            .into_iter()
            .partition(|t| id_set.contains(t.id.as_str()));

        self.write_tasks(&remaining)?;
        log::debug!("Batch deleted {} of {} requested task(s)", removed.len(), ids.len());
        Ok(removed)
    }

    fn batch_update(&mut self, ids: &[&str], patch: &UpdateTaskInput) -> Result<Vec<Task>, RepoError> {
        let id_set: HashSet<&str> = ids.iter().copied().collect();
        let mut tasks = self.read_tasks();
        let mut updated = Vec::new();

        for task in tasks.iter_mut().filter(|t| id_set.contains(t.id.as_str())) {
            patch.apply_to(task);
            task.updated_at = clock::refreshed(&task.updated_at);
            updated.push(task.clone());
        }

        self.write_tasks(&tasks)?;
        Ok(updated)
    }

    fn batch_restore(&mut self, to_restore: Vec<Task>) -> Result<Vec<Task>, RepoError> {
        let mut tasks = self.read_tasks();
        tasks.extend(to_restore.iter().cloned());
        self.write_tasks(&tasks)?;
        Ok(to_restore)
    }
}
