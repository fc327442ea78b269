//! Date-partitioned task store.
//!
//! The whole date-to-tasks mapping lives under a single storage key; each
//! mutation is a read-modify-write cycle against that blob. The backing
//! store is the source of truth: no partition is mirrored in memory between
//! calls.
//!
//! Two guards keep concurrent mutations safe:
//! - a per-date-key mutex serializes the whole load/mutate/save cycle for
//!   that date, so near-simultaneous completions on one day cannot drop
//!   each other
//! - a store-wide mutex covers the shared blob's read-modify-write, so
//!   mutations on different dates cannot overwrite each other's partitions

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::date_key::DateKey;
use crate::error::{Error, Mutation, Result};
use crate::kv::{self, KeyValueStore};
use crate::recurrence::{self, ExpansionReport};
use crate::task::Task;

/// Storage key holding the serialized date-to-tasks mapping.
pub const TASKS_KEY: &str = "focuspresso.tasks";

/// Full persisted mapping, keyed by partition date.
pub type TaskMap = BTreeMap<DateKey, Vec<Task>>;

/// Outcome of [`TaskStore::set_completed`].
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub mutation: Mutation,
    /// Completed flag before the update. Expansion and rewards key off the
    /// false-to-true transition.
    pub was_completed: bool,
    /// Present when a repeating task was freshly completed.
    pub expansion: Option<ExpansionReport>,
}

pub struct TaskStore<S> {
    kv: Arc<S>,
    /// One guard slot per date key, created on first touch.
    partitions: Mutex<HashMap<DateKey, Arc<Mutex<()>>>>,
    /// Guards read-modify-write of the shared blob.
    blob: Mutex<()>,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(kv: Arc<S>) -> Self {
        Self {
            kv,
            partitions: Mutex::new(HashMap::new()),
            blob: Mutex::new(()),
        }
    }

    async fn partition_guard(&self, key: &DateKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut partitions = self.partitions.lock().await;
            Arc::clone(
                partitions
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        slot.lock_owned().await
    }

    async fn read_map(&self) -> Result<TaskMap> {
        kv::load_json_or_default(self.kv.as_ref(), TASKS_KEY).await
    }

    async fn write_map(&self, map: &TaskMap) -> Result<()> {
        kv::store_json(self.kv.as_ref(), TASKS_KEY, map).await
    }

    /// Tasks due on `date`, in stored order.
    ///
    /// An absent partition (or an entirely absent blob) is a legitimately
    /// empty list; a failed or corrupt read is an error, never silently
    /// empty.
    pub async fn load_tasks(&self, date: NaiveDate) -> Result<Vec<Task>> {
        let key = DateKey::from_date(date);
        let map = self.read_map().await?;
        Ok(map.get(&key).cloned().unwrap_or_default())
    }

    /// The full date-to-tasks mapping.
    pub async fn load_all(&self) -> Result<TaskMap> {
        self.read_map().await
    }

    /// Replaces the whole partition for `date`. An emptied partition is
    /// retained, not pruned.
    pub async fn save_tasks(&self, date: NaiveDate, tasks: Vec<Task>) -> Result<()> {
        let key = DateKey::from_date(date);
        let _guard = self.partition_guard(&key).await;
        let _blob = self.blob.lock().await;
        let mut map = self.read_map().await?;
        debug!(partition = %key, count = tasks.len(), "saving partition");
        map.insert(key, tasks);
        self.write_map(&map).await
    }

    /// Appends `task` to the partition for `date`, creating it on first
    /// write.
    pub async fn add_task(&self, date: NaiveDate, task: Task) -> Result<()> {
        let key = DateKey::from_date(date);
        let _guard = self.partition_guard(&key).await;
        let _blob = self.blob.lock().await;
        let mut map = self.read_map().await?;
        debug!(partition = %key, task = %task.id, "adding task");
        map.entry(key).or_default().push(task);
        self.write_map(&map).await
    }

    /// Sets the completion flag of the task with `task_id` on `date`.
    ///
    /// When a repeating task transitions to completed, its next occurrences
    /// are materialized into their own partitions before returning. A
    /// missing id is a clean [`Mutation::NotFound`] no-op.
    pub async fn set_completed(
        &self,
        date: NaiveDate,
        task_id: &str,
        completed: bool,
    ) -> Result<CompletionOutcome> {
        let key = DateKey::from_date(date);
        let (was_completed, snapshot) = {
            let _guard = self.partition_guard(&key).await;
            let _blob = self.blob.lock().await;
            let mut map = self.read_map().await?;
            let Some(task) = map
                .get_mut(&key)
                .and_then(|tasks| tasks.iter_mut().find(|task| task.id == task_id))
            else {
                return Ok(CompletionOutcome {
                    mutation: Mutation::NotFound,
                    was_completed: false,
                    expansion: None,
                });
            };
            let was_completed = task.completed;
            task.completed = completed;
            let snapshot = task.clone();
            self.write_map(&map).await?;
            (was_completed, snapshot)
        };

        // Expansion runs outside the guards: each insert takes its own
        // target-date guard, and any partition may insert into any other.
        let expansion = if completed
            && !was_completed
            && snapshot.is_repeating
            && !snapshot.repeat_days.is_empty()
        {
            let report = recurrence::expand(&snapshot, date);
            for (target, occurrence) in &report.created {
                self.add_task(*target, occurrence.clone()).await?;
            }
            Some(report)
        } else {
            None
        };

        Ok(CompletionOutcome {
            mutation: Mutation::Applied,
            was_completed,
            expansion,
        })
    }

    /// Replaces the task with a matching id on `date`.
    pub async fn update_task(&self, date: NaiveDate, updated: Task) -> Result<Mutation> {
        let key = DateKey::from_date(date);
        let _guard = self.partition_guard(&key).await;
        let _blob = self.blob.lock().await;
        let mut map = self.read_map().await?;
        let Some(slot) = map
            .get_mut(&key)
            .and_then(|tasks| tasks.iter_mut().find(|task| task.id == updated.id))
        else {
            return Ok(Mutation::NotFound);
        };
        *slot = updated;
        self.write_map(&map).await?;
        Ok(Mutation::Applied)
    }

    /// Removes the task with `task_id` from the partition for `date`.
    pub async fn delete_task(&self, date: NaiveDate, task_id: &str) -> Result<Mutation> {
        let key = DateKey::from_date(date);
        let _guard = self.partition_guard(&key).await;
        let _blob = self.blob.lock().await;
        let mut map = self.read_map().await?;
        let Some(tasks) = map.get_mut(&key) else {
            return Ok(Mutation::NotFound);
        };
        let before = tasks.len();
        tasks.retain(|task| task.id != task_id);
        if tasks.len() == before {
            return Ok(Mutation::NotFound);
        }
        self.write_map(&map).await?;
        Ok(Mutation::Applied)
    }

    /// Erases the entire multi-date store.
    pub async fn clear_all(&self) -> Result<()> {
        let _blob = self.blob.lock().await;
        self.kv
            .remove(TASKS_KEY)
            .await
            .map_err(|source| Error::StorageWrite {
                key: TASKS_KEY.to_string(),
                source,
            })?;
        info!("cleared all task partitions");
        Ok(())
    }
}
