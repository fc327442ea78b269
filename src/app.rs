//! Application state.
//!
//! One explicitly constructed object owns the three stateful components over
//! a shared persistence backend: the date-partitioned store, the flat queue,
//! and the progression engine. Cold start loads everything from persistence,
//! defaulting absent state; there is no teardown beyond process exit.
//!
//! The convenience operations here wire task completions into experience
//! grants, which the UI layer would otherwise have to do by hand.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{Mutation, Result};
use crate::kv::KeyValueStore;
use crate::progression::{LevelReport, Progression};
use crate::queue::TaskQueue;
use crate::store::{CompletionOutcome, TaskStore};
use crate::task::Task;

pub struct App<S> {
    pub store: TaskStore<S>,
    pub queue: TaskQueue<S>,
    pub progression: Progression<S>,
}

impl<S: KeyValueStore> App<S> {
    /// Cold start from the given backend.
    pub async fn load(kv: Arc<S>) -> Result<Self> {
        Ok(Self {
            store: TaskStore::new(Arc::clone(&kv)),
            queue: TaskQueue::load(Arc::clone(&kv)).await?,
            progression: Progression::load(kv).await?,
        })
    }

    /// Completes the queue's current task and credits the reward.
    pub async fn complete_current_task(&self) -> Result<Option<(Task, LevelReport)>> {
        let Some(task) = self.queue.complete_current().await? else {
            return Ok(None);
        };
        let report = self.progression.record_completion().await?;
        Ok(Some((task, report)))
    }

    /// Updates a dated task's completion flag, crediting experience only on
    /// a fresh false-to-true completion.
    pub async fn set_task_completed(
        &self,
        date: NaiveDate,
        task_id: &str,
        completed: bool,
    ) -> Result<(CompletionOutcome, Option<LevelReport>)> {
        let outcome = self.store.set_completed(date, task_id, completed).await?;
        let report = if outcome.mutation == Mutation::Applied && completed && !outcome.was_completed
        {
            Some(self.progression.record_completion().await?)
        } else {
            None
        };
        Ok((outcome, report))
    }
}
