//! Flat task queue with a completion cursor.
//!
//! The simpler screens work off one ordered list and a cursor pointing at
//! the next actionable task; completed tasks accumulate in a history list.
//! State persists under three keys with no cross-key transaction.
//!
//! Mutations stage the new state into storage before committing it to
//! memory: a reported write failure leaves the in-memory state exactly as it
//! was, so callers never observe memory running ahead of storage.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Mutation, Result};
use crate::kv::{self, KeyValueStore};
use crate::task::{NewTask, Task};

pub const QUEUE_TASKS_KEY: &str = "focuspresso.queue.tasks";
pub const QUEUE_COMPLETED_KEY: &str = "focuspresso.queue.completed";
pub const QUEUE_CURSOR_KEY: &str = "focuspresso.queue.cursor";

#[derive(Debug, Clone, Default)]
struct QueueState {
    tasks: Vec<Task>,
    completed: Vec<Task>,
    cursor: usize,
}

/// Read-only view of the queue for the UI layer.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueueSnapshot {
    pub tasks: Vec<Task>,
    pub completed: Vec<Task>,
    pub cursor: usize,
}

pub struct TaskQueue<S> {
    kv: Arc<S>,
    state: Mutex<QueueState>,
}

impl<S: KeyValueStore> TaskQueue<S> {
    /// Cold start: load persisted state, defaulting each absent key.
    pub async fn load(kv: Arc<S>) -> Result<Self> {
        let tasks: Vec<Task> = kv::load_json_or_default(kv.as_ref(), QUEUE_TASKS_KEY).await?;
        let completed: Vec<Task> =
            kv::load_json_or_default(kv.as_ref(), QUEUE_COMPLETED_KEY).await?;
        let cursor: usize = kv::load_json_or_default(kv.as_ref(), QUEUE_CURSOR_KEY).await?;
        debug!(tasks = tasks.len(), completed = completed.len(), cursor, "queue loaded");
        Ok(Self {
            kv,
            state: Mutex::new(QueueState {
                tasks,
                completed,
                cursor,
            }),
        })
    }

    async fn persist(&self, state: &QueueState) -> Result<()> {
        kv::store_json(self.kv.as_ref(), QUEUE_TASKS_KEY, &state.tasks).await?;
        kv::store_json(self.kv.as_ref(), QUEUE_COMPLETED_KEY, &state.completed).await?;
        kv::store_json(self.kv.as_ref(), QUEUE_CURSOR_KEY, &state.cursor).await?;
        Ok(())
    }

    /// Validates and appends a new, incomplete task.
    pub async fn add_task(&self, new: NewTask) -> Result<Task> {
        let task = new.build()?;
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.tasks.push(task.clone());
        self.persist(&next).await?;
        *state = next;
        Ok(task)
    }

    /// Marks the task at the cursor completed, records it in history, and
    /// advances the cursor. Returns the completed task for reward
    /// processing, or `None` when the cursor is already past the end.
    pub async fn complete_current(&self) -> Result<Option<Task>> {
        let mut state = self.state.lock().await;
        if state.cursor >= state.tasks.len() {
            return Ok(None);
        }
        let mut next = state.clone();
        let cursor = next.cursor;
        next.tasks[cursor].completed = true;
        let done = next.tasks[cursor].clone();
        next.completed.push(done.clone());
        next.cursor += 1;
        self.persist(&next).await?;
        *state = next;
        Ok(Some(done))
    }

    /// The task at the cursor, or `None` when everything is done.
    pub async fn current(&self) -> Option<Task> {
        let state = self.state.lock().await;
        state.tasks.get(state.cursor).cloned()
    }

    /// Removes the task with `task_id`. Removing an entry at or before the
    /// cursor shifts the cursor back one so it keeps pointing at the same
    /// conceptual position.
    pub async fn delete_task(&self, task_id: &str) -> Result<Mutation> {
        let mut state = self.state.lock().await;
        let Some(index) = state.tasks.iter().position(|task| task.id == task_id) else {
            return Ok(Mutation::NotFound);
        };
        let mut next = state.clone();
        next.tasks.remove(index);
        if index <= next.cursor && next.cursor > 0 {
            next.cursor -= 1;
        }
        self.persist(&next).await?;
        *state = next;
        Ok(Mutation::Applied)
    }

    /// Clears list, history, and cursor back to the initial empty state.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let next = QueueState::default();
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    pub async fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock().await;
        QueueSnapshot {
            tasks: state.tasks.clone(),
            completed: state.completed.clone(),
            cursor: state.cursor,
        }
    }
}
