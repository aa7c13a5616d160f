//! Taskboard: the task store behind a three-column task board.
//!
//! Tasks live in a key-value [`Storage`] as one JSON list. The [`Repository`]
//! is the only code that reads or writes that list; the [`Store`] holds the
//! in-memory projection the view renders; the [`Board`] façade binds the two,
//! applying a store transition only after the repository confirms a change.
//!
//! # Example
//!
//! ```no_run
//! use taskboard::{Board, CreateTaskInput, MemoryStorage, Repository, Status};
//!
//! # async fn demo() -> Result<(), taskboard::RepoError> {
//! let mut board = Board::new(Repository::new(MemoryStorage::new()));
//! board.fetch_tasks().await?;
//!
//! let a = board.add_task(CreateTaskInput::new("Write docs")).await?;
//! let b = board.add_task(CreateTaskInput::new("Ship release")).await?;
//! assert_eq!(board.tasks()[0].id, b.id); // newest first
//!
//! board.batch_move(&[&a.id], Status::Done).await?;
//!
//! // Delete, then take it back
//! let undo = board.batch_delete(&[&b.id]).await?;
//! board.undo(undo).await?;
//! # Ok(())
//! # }
//! ```

mod batch;
mod clock;
mod id;
mod repository;
mod schema;
mod storage;
mod store;
mod transfer;
mod types;

pub mod board;
pub mod config;
pub mod query;

// Re-export public API
pub use batch::RepositoryBatchExt;
pub use board::{Board, Undo};
pub use config::Config;
pub use query::{Filter, SortOrder, columns, is_overdue};
pub use repository::{DEFAULT_STORAGE_KEY, ImportFormatError, RepoError, Repository};
pub use schema::{StoredTask, is_valid_task, migrate_task, normalize_task};
pub use storage::{DEFAULT_QUOTA_BYTES, MemoryStorage, SqliteStorage, Storage, StorageError};
pub use store::{Action, Store, TaskState, reduce};
pub use transfer::EXPORT_FILE_NAME;
pub use types::{CreateTaskInput, Priority, Status, Task, UnknownVariant, UpdateTaskInput};
