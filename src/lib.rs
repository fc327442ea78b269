//! focuspresso - sequential task engine
//!
//! Core state engine for a focus-first task app: tasks unlock strictly in
//! order, completing a repeating task schedules its next weekly occurrences,
//! and every completion feeds a character progression system.
//!
//! # Core Concepts
//!
//! - **Partitions**: tasks are stored per calendar date under `YYYY-MM-DD`
//!   keys; a partition is created on first write and never pruned.
//! - **Sequential lock**: within a list, only the first incomplete task is
//!   actionable; everything after it is locked.
//! - **Recurrence expansion**: completing a repeating task materializes its
//!   next occurrence for each configured weekday.
//! - **Progression**: completions grant experience, levels unlock rewards,
//!   and a daily challenge regenerates once per calendar day.
//!
//! # Module Organization
//!
//! - `app`: explicitly constructed application state over one backend
//! - `date_key`: calendar-date partition key codec
//! - `error`: error types and mutation outcomes
//! - `kv`: abstract async key-value boundary plus memory/file backends
//! - `lock`: sequential lock policy over an ordered task list
//! - `progression`: experience, levels, reward unlocks, daily challenge
//! - `queue`: flat task list with a completion cursor
//! - `recurrence`: next-occurrence computation for repeating tasks
//! - `store`: date-partitioned task store with serialized mutations
//! - `task`: task model and validated creation boundary

pub mod app;
pub mod date_key;
pub mod error;
pub mod kv;
pub mod lock;
pub mod progression;
pub mod queue;
pub mod recurrence;
pub mod store;
pub mod task;

pub use app::App;
pub use date_key::DateKey;
pub use error::{Error, Mutation, Result};
pub use kv::{JsonFileKv, KeyValueStore, KvError, MemoryKv};
pub use lock::{first_actionable, is_locked, lock_states};
pub use progression::{
    Character, DailyChallenge, LevelReport, Progression, Reward, RewardKind,
};
pub use queue::{QueueSnapshot, TaskQueue};
pub use recurrence::ExpansionReport;
pub use store::{CompletionOutcome, TaskMap, TaskStore};
pub use task::{NewTask, NotificationPlan, Priority, Task, TimeSpan};
