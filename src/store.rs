//! In-memory task state driven by a closed set of transitions.
//!
//! [`reduce`] is a pure function from the previous state and an [`Action`] to
//! the next state. [`Store`] owns the current state, applies actions one at a
//! time and publishes each complete snapshot to subscribers.

use crate::types::Task;
use std::collections::{HashMap, HashSet};
use tokio::sync::watch;

/// What the view layer observes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    /// Ordered tasks, ids unique
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The only legal state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchStart,
    FetchSuccess(Vec<Task>),
    FetchError(String),
    /// Prepends, so the newest task shows first.
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(String),
    BatchDelete(Vec<String>),
    BatchUpdate(Vec<Task>),
    /// Appends, unlike `AddTask`.
    BatchAdd(Vec<Task>),
}

impl Action {
    /// Transition name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::FetchStart => "FETCH_START",
            Action::FetchSuccess(_) => "FETCH_SUCCESS",
            Action::FetchError(_) => "FETCH_ERROR",
            Action::AddTask(_) => "ADD_TASK",
            Action::UpdateTask(_) => "UPDATE_TASK",
            Action::DeleteTask(_) => "DELETE_TASK",
            Action::BatchDelete(_) => "BATCH_DELETE",
            Action::BatchUpdate(_) => "BATCH_UPDATE",
            Action::BatchAdd(_) => "BATCH_ADD",
        }
    }
}

/// Compute the state after `action`.
pub fn reduce(state: &TaskState, action: Action) -> TaskState {
    match action {
        Action::FetchStart => TaskState {
            loading: true,
            error: None,
            ..state.clone()
        },
        Action::FetchSuccess(tasks) => TaskState {
            tasks,
            loading: false,
            ..state.clone()
        },
        Action::FetchError(message) => TaskState {
            loading: false,
            error: Some(message),
            ..state.clone()
        },
        Action::AddTask(task) => TaskState {
            tasks: std::iter::once(task).chain(state.tasks.iter().cloned()).collect(),
            ..state.clone()
        },
        Action::UpdateTask(task) => TaskState {
            tasks: state
                .tasks
                .iter()
                .map(|t| if t.id == task.id { task.clone() } else { t.clone() })
                .collect(),
            ..state.clone()
        },
        Action::DeleteTask(id) => TaskState {
            tasks: state.tasks.iter().filter(|t| t.id != id).cloned().collect(),
            ..state.clone()
        },
        Action::BatchDelete(ids) => {
            let id_set: HashSet<&str> = ids.iter().map(String::as_str).collect();
            TaskState {
                tasks: state
                    .tasks
                    .iter()
                    .filter(|t| !id_set.contains(t.id.as_str()))
                    .cloned()
                    .collect(),
                ..state.clone()
            }
        }
        Action::BatchUpdate(updates) => {
            let by_id: HashMap<&str, &Task> = updates.iter().map(|t| (t.id.as_str(), t)).collect();
            TaskState {
                tasks: state
                    .tasks
                    .iter()
                    .map(|t| by_id.get(t.id.as_str()).map_or_else(|| t.clone(), |u| (*u).clone()))
                    .collect(),
                ..state.clone()
            }
        }
        Action::BatchAdd(added) => TaskState {
            tasks: state.tasks.iter().cloned().chain(added).collect(),
            ..state.clone()
        },
    }
}

/// Owner of the current [`TaskState`].
pub struct Store {
    state: TaskState,
    tx: watch::Sender<TaskState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Store with no tasks, not loading, no error.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TaskState::default());
        Self {
            state: TaskState::default(),
            tx,
        }
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Receive every state published from now on.
    pub fn subscribe(&self) -> watch::Receiver<TaskState> {
        self.tx.subscribe()
    }

    /// Apply `action` and publish the new state.
    pub fn dispatch(&mut self, action: Action) {
        log::debug!("dispatch {}", action.name());
        self.state = reduce(&self.state, action);
        self.tx.send_replace(self.state.clone());
    }
}
