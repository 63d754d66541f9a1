//! Task application: commands and the handler that executes them.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Longest task description the store accepts.
pub const MAX_DETAILS_LEN: usize = 280;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task too hard")]
    TooHard,
    #[error("task not found")]
    NotFound,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTaskCommand {
    pub details: String,
    pub due_date: Option<DateTime<Utc>>,
    pub result: CreateTaskResult,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTaskResult {
    pub id: u64,
    pub error: Option<TaskError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteTaskCommand {
    pub id: u64,
    pub result: DeleteTaskResult,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteTaskResult {
    pub error: Option<TaskError>,
}

/// A command with its result slot, borrowed from the caller's model.
#[derive(Debug)]
pub enum Command<'a> {
    CreateTask(&'a mut CreateTaskCommand),
    DeleteTask(&'a mut DeleteTaskCommand),
}

/// Executes commands, writing outcomes into their result fields.
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, command: Command<'_>);
}

impl<F> TaskHandler for F
where
    F: Fn(Command<'_>) + Send + Sync + 'static,
{
    fn handle(&self, command: Command<'_>) {
        self(command)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u64,
    pub details: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// In-memory task handler.
#[derive(Debug)]
pub struct TaskStore {
    tasks: DashMap<u64, Task>,
    next_id: AtomicU64,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self {
            tasks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<Task> {
        self.tasks.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn create(&self, command: &mut CreateTaskCommand) {
        if command.details.chars().count() > MAX_DETAILS_LEN {
            command.result.error = Some(TaskError::TooHard);
            return;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.tasks.insert(
            id,
            Task {
                id,
                details: command.details.clone(),
                due_date: command.due_date,
            },
        );
        command.result.id = id;
    }

    fn delete(&self, command: &mut DeleteTaskCommand) {
        if self.tasks.remove(&command.id).is_none() {
            command.result.error = Some(TaskError::NotFound);
        }
    }
}

impl TaskHandler for TaskStore {
    fn handle(&self, command: Command<'_>) {
        match command {
            Command::CreateTask(command) => self.create(command),
            Command::DeleteTask(command) => self.delete(command),
        }
    }
}
