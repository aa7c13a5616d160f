//! Shared test infrastructure for taskboard integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use taskboard::{Board, CreateTaskInput, Priority, Repository, SqliteStorage, Status, Task};
use tempfile::TempDir;

/// Test environment backed by a SQLite file in a temp dir.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub board: Board<SqliteStorage>,
}

impl TestEnv {
    /// Create a new test environment with an empty board.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let board = Self::open_board(&temp_dir);
        Self { temp_dir, board }
    }

    fn open_board(temp_dir: &TempDir) -> Board<SqliteStorage> {
        let storage =
            SqliteStorage::open(&temp_dir.path().join("taskboard.db")).expect("Failed to open storage");
        Board::new(Repository::new(storage))
    }

    /// Drop the board and open a fresh one over the same database.
    pub async fn reopen(&mut self) {
        self.board = Self::open_board(&self.temp_dir);
        self.board.fetch_tasks().await.expect("Failed to fetch tasks");
    }

    /// Create a task with default fields.
    pub async fn create_task(&mut self, title: &str) -> Task {
        self.board
            .add_task(CreateTaskInput::new(title))
            .await
            .expect("Failed to create task")
    }

    /// Create a task with the given priority.
    pub async fn create_task_with_priority(&mut self, title: &str, priority: Priority) -> Task {
        self.board
            .add_task(CreateTaskInput::new(title).with_priority(priority))
            .await
            .expect("Failed to create task")
    }

    /// Create a task in the given column.
    pub async fn create_task_with_status(&mut self, title: &str, status: Status) -> Task {
        self.board
            .add_task(CreateTaskInput::new(title).with_status(status))
            .await
            .expect("Failed to create task")
    }

    /// Tasks as persisted, in stored order.
    pub fn stored(&self) -> Vec<Task> {
        self.board.repository().list().expect("Failed to list tasks")
    }

    /// Number of persisted tasks.
    pub fn total_count(&self) -> usize {
        self.stored().len()
    }

    /// Ids currently on the board, in board order.
    pub fn board_ids(&self) -> Vec<String> {
        self.board.tasks().iter().map(|t| t.id.clone()).collect()
    }

    /// Assert the board and storage hold the same set of tasks.
    pub fn assert_board_matches_storage(&self) {
        let mut on_board: Vec<Task> = self.board.tasks().to_vec();
        let mut stored = self.stored();
        on_board.sort_by(|a, b| a.id.cmp(&b.id));
        stored.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(on_board, stored, "board and storage disagree");
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully populated task record with fixed timestamps.
pub fn make_task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: "A description".to_string(),
        status: Status::Todo,
        priority: Priority::Medium,
        due_date: None,
        created_at: "2025-01-01T00:00:00.000Z".to_string(),
        updated_at: "2025-01-01T00:00:00.000Z".to_string(),
    }
}
