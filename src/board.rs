//! The operations the view layer calls.
//!
//! Each operation calls the repository and, only on success, dispatches the
//! matching store transition. A failed mutation leaves the store untouched and
//! hands the error back to the caller, which decides how to tell the user.

use crate::batch::RepositoryBatchExt;
use crate::repository::{RepoError, Repository};
use crate::storage::Storage;
use crate::store::{Action, Store, TaskState};
use crate::transfer::EXPORT_FILE_NAME;
use crate::types::{CreateTaskInput, Status, Task, UpdateTaskInput};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Records removed by a delete, kept so the delete can be reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
    Delete(Task),
    BatchDelete(Vec<Task>),
}

impl Undo {
    /// Number of tasks this undo would bring back.
    pub fn len(&self) -> usize {
        match self {
            Undo::Delete(_) => 1,
            Undo::BatchDelete(tasks) => tasks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Task board façade binding repository calls to store transitions.
pub struct Board<S: Storage> {
    repo: Repository<S>,
    store: Store,
}

impl<S: Storage> Board<S> {
    pub fn new(repo: Repository<S>) -> Self {
        Self {
            repo,
            store: Store::new(),
        }
    }

    pub fn state(&self) -> &TaskState {
        self.store.state()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.store.state().tasks
    }

    pub fn loading(&self) -> bool {
        self.store.state().loading
    }

    pub fn error(&self) -> Option<&str> {
        self.store.state().error.as_deref()
    }

    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.store.subscribe()
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    /// Load the stored list into the store.
    ///
    /// On failure the message lands in the store's `error` for display next
    /// to a retry affordance.
    pub async fn fetch_tasks(&mut self) -> Result<(), RepoError> {
        self.store.dispatch(Action::FetchStart);
        match self.repo.list() {
            Ok(tasks) => {
                self.store.dispatch(Action::FetchSuccess(tasks));
                Ok(())
            }
            Err(e) => {
                self.store.dispatch(Action::FetchError(e.to_string()));
                Err(e)
            }
        }
    }

    pub async fn add_task(&mut self, input: CreateTaskInput) -> Result<Task, RepoError> {
        let task = self.repo.create(input)?;
        self.store.dispatch(Action::AddTask(task.clone()));
        Ok(task)
    }

    pub async fn update_task(&mut self, id: &str, patch: &UpdateTaskInput) -> Result<Task, RepoError> {
        let task = self.repo.update(id, patch)?;
        self.store.dispatch(Action::UpdateTask(task.clone()));
        Ok(task)
    }

    /// Move a task to another column.
    pub async fn move_task(&mut self, id: &str, status: Status) -> Result<Task, RepoError> {
        self.update_task(id, &UpdateTaskInput::status_only(status)).await
    }

    /// Delete a task. The returned [`Undo`] brings it back via [`Board::undo`].
    pub async fn delete_task(&mut self, id: &str) -> Result<Undo, RepoError> {
        let removed = self.repo.delete(id)?;
        self.store.dispatch(Action::DeleteTask(id.to_string()));
        Ok(Undo::Delete(removed))
    }

    /// Delete every task in `ids`; unknown ids are ignored.
    ///
    /// The [`Undo`] lists the removed tasks in the order the board showed
    /// them. Removed tasks the board never loaded follow in stored order.
    pub async fn batch_delete(&mut self, ids: &[&str]) -> Result<Undo, RepoError> {
        let mut removed = self.repo.batch_delete(ids)?;
        let shown = &self.store.state().tasks;
        removed.sort_by_key(|task| shown.iter().position(|t| t.id == task.id).unwrap_or(usize::MAX));
        self.store
            .dispatch(Action::BatchDelete(ids.iter().map(|id| id.to_string()).collect()));
        Ok(Undo::BatchDelete(removed))
    }

    pub async fn batch_update(&mut self, ids: &[&str], patch: &UpdateTaskInput) -> Result<Vec<Task>, RepoError> {
        let updated = self.repo.batch_update(ids, patch)?;
        self.store.dispatch(Action::BatchUpdate(updated.clone()));
        Ok(updated)
    }

    /// Move every task in `ids` to `status`.
    pub async fn batch_move(&mut self, ids: &[&str], status: Status) -> Result<Vec<Task>, RepoError> {
        self.batch_update(ids, &UpdateTaskInput::status_only(status)).await
    }

    /// Put a deleted task back. It shows first on the board.
    pub async fn restore_task(&mut self, task: Task) -> Result<Task, RepoError> {
        let restored = self.repo.restore(task)?;
        self.store.dispatch(Action::AddTask(restored.clone()));
        Ok(restored)
    }

    /// Put deleted tasks back, after the tasks already on the board.
    pub async fn batch_restore(&mut self, tasks: Vec<Task>) -> Result<Vec<Task>, RepoError> {
        let restored = self.repo.batch_restore(tasks)?;
        self.store.dispatch(Action::BatchAdd(restored.clone()));
        Ok(restored)
    }

    /// Reverse a delete.
    pub async fn undo(&mut self, undo: Undo) -> Result<(), RepoError> {
        match undo {
            Undo::Delete(task) => self.restore_task(task).await.map(|_| ()),
            Undo::BatchDelete(tasks) => self.batch_restore(tasks).await.map(|_| ()),
        }
    }

    /// Find a task on the board by id.
    pub fn get_task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    /// Pretty-printed JSON of the stored list.
    pub fn export_tasks(&self) -> String {
        self.repo.export()
    }

    /// Write the export into `dir` as `tasks.json` and return its path.
    pub fn export_to_file(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(EXPORT_FILE_NAME);
        fs::write(&path, self.export_tasks()).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Exported tasks to {}", path.display());
        Ok(path)
    }

    /// Merge tasks from JSON text and show the merged list.
    ///
    /// The whole merged list replaces the store's tasks so id replacement is
    /// visible exactly as stored.
    pub async fn import_tasks(&mut self, text: &str) -> Result<Vec<Task>, RepoError> {
        let merged = self.repo.import(text)?;
        self.store.dispatch(Action::FetchSuccess(merged.clone()));
        Ok(merged)
    }

    /// Read `path` and import it.
    pub async fn import_from_file(&mut self, path: &Path) -> Result<Vec<Task>> {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let merged = self
            .import_tasks(&text)
            .await
            .with_context(|| format!("Failed to import {}", path.display()))?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::Priority;

    fn setup_board() -> Board<MemoryStorage> {
        Board::new(Repository::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_fetch_loads_stored_tasks() {
        let mut repo = Repository::new(MemoryStorage::new());
        let task = repo.create(CreateTaskInput::new("Stored")).unwrap();
        let mut board = Board::new(repo);

        assert!(board.tasks().is_empty());
        board.fetch_tasks().await.unwrap();

        assert_eq!(board.tasks(), &[task]);
        assert!(!board.loading());
        assert!(board.error().is_none());
    }

    #[tokio::test]
    async fn test_add_prepends_on_board() {
        let mut board = setup_board();
        let a = board.add_task(CreateTaskInput::new("A")).await.unwrap();
        let b = board.add_task(CreateTaskInput::new("B")).await.unwrap();

        assert_eq!(board.tasks(), &[b.clone(), a.clone()]);
        // storage keeps insertion order
        assert_eq!(board.repository().list().unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_store_untouched() {
        let mut board = setup_board();
        board.add_task(CreateTaskInput::new("A")).await.unwrap();
        let before = board.state().clone();

        let err = board
            .update_task("tb-missing", &UpdateTaskInput::new().priority(Priority::High))
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(board.state(), &before);
    }

    #[tokio::test]
    async fn test_move_task() {
        let mut board = setup_board();
        let task = board.add_task(CreateTaskInput::new("A")).await.unwrap();

        let moved = board.move_task(&task.id, Status::InProgress).await.unwrap();
        assert_eq!(moved.status, Status::InProgress);
        assert_eq!(moved.title, task.title);
        assert_eq!(board.get_task_by_id(&task.id), Some(&moved));
    }

    #[tokio::test]
    async fn test_delete_and_undo() {
        let mut board = setup_board();
        let a = board.add_task(CreateTaskInput::new("A")).await.unwrap();
        let b = board.add_task(CreateTaskInput::new("B")).await.unwrap();

        let undo = board.delete_task(&b.id).await.unwrap();
        assert_eq!(undo, Undo::Delete(b.clone()));
        assert_eq!(board.tasks(), &[a.clone()]);

        board.undo(undo).await.unwrap();
        assert_eq!(board.tasks(), &[b.clone(), a.clone()]);
        assert_eq!(board.repository().list().unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_batch_delete_and_undo_appends() {
        let mut board = setup_board();
        let a = board.add_task(CreateTaskInput::new("A")).await.unwrap();
        let b = board.add_task(CreateTaskInput::new("B")).await.unwrap();
        let c = board.add_task(CreateTaskInput::new("C")).await.unwrap();

        let undo = board.batch_delete(&[&a.id, &c.id]).await.unwrap();
        // board order, newest first
        assert_eq!(undo, Undo::BatchDelete(vec![c.clone(), a.clone()]));
        assert_eq!(board.tasks(), &[b.clone()]);

        board.undo(undo).await.unwrap();
        // appended after the survivors
        assert_eq!(board.tasks(), &[b.clone(), c.clone(), a.clone()]);
        assert_eq!(board.repository().list().unwrap(), vec![b, c, a]);
    }

    #[tokio::test]
    async fn test_batch_delete_unloaded_tasks_follow_shown_ones() {
        let mut repo = Repository::new(MemoryStorage::new());
        let hidden = repo.create(CreateTaskInput::new("Hidden")).unwrap();
        let mut board = Board::new(repo);
        let shown = board.add_task(CreateTaskInput::new("Shown")).await.unwrap();

        let undo = board.batch_delete(&[&hidden.id, &shown.id]).await.unwrap();
        assert_eq!(undo, Undo::BatchDelete(vec![shown, hidden]));
    }

    #[tokio::test]
    async fn test_fetch_corrupt_storage_reads_empty() {
        let mut board = setup_board();
        board
            .repository_mut()
            .storage_mut()
            .set(crate::repository::DEFAULT_STORAGE_KEY, "garbage")
            .unwrap();

        board.fetch_tasks().await.unwrap();
        assert!(board.tasks().is_empty());
        assert!(board.error().is_none());
    }

    #[tokio::test]
    async fn test_import_replaces_board_with_merge() {
        let mut board = setup_board();
        board.add_task(CreateTaskInput::new("A")).await.unwrap();
        board.add_task(CreateTaskInput::new("B")).await.unwrap();
        let stored = board.repository().list().unwrap();

        let exported = board.export_tasks();
        let merged = board.import_tasks(&exported).await.unwrap();

        // re-importing the same ids replaces them in file order
        assert_eq!(merged, stored);
        assert_eq!(board.tasks(), stored.as_slice());
    }

    #[tokio::test]
    async fn test_export_and_import_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut board = setup_board();
        let task = board.add_task(CreateTaskInput::new("On disk")).await.unwrap();

        let path = board.export_to_file(temp_dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "tasks.json");

        let mut other = setup_board();
        let merged = other.import_from_file(&path).await.unwrap();
        assert_eq!(merged, vec![task]);
    }

    #[tokio::test]
    async fn test_import_missing_file_fails() {
        let mut board = setup_board();
        let result = board.import_from_file(Path::new("/nonexistent/tasks.json")).await;
        assert!(result.is_err());
    }
}
