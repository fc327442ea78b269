//! Task model and creation boundary.
//!
//! Persisted task blobs keep the original app's JSON shape: camelCase field
//! names, priority as an ordinal 1-3, and weekday names spelled out.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Weekday names as the persisted blobs spell them, Sunday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Task priority, serialized as its ordinal (1 = low, 3 = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(ordinal: u8) -> std::result::Result<Self, Self::Error> {
        match ordinal {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("priority ordinal out of range: {other}")),
        }
    }
}

/// Hours-and-minutes span used by notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub hours: u32,
    pub minutes: u32,
}

/// Notification preferences. Stored with the task; actual delivery is an
/// external concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPlan {
    pub interval: TimeSpan,
    pub duration: TimeSpan,
}

/// A single task.
///
/// `completed` only ever transitions false to true through the normal flow,
/// and the sequential lock state is never stored here: it is derived from
/// list position on every query (see [`crate::lock`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: NaiveDateTime,
    pub completed: bool,
    #[serde(default)]
    pub is_repeating: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeat_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationPlan>,
    pub created_at: DateTime<Utc>,
}

/// Creation-boundary input, validated and stamped into a [`Task`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: NaiveDateTime,
    pub is_repeating: bool,
    pub repeat_days: Vec<String>,
    pub notifications: Option<NotificationPlan>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            due_date,
            is_repeating: false,
            repeat_days: Vec::new(),
            notifications: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn repeating(mut self, repeat_days: Vec<String>) -> Self {
        self.is_repeating = true;
        self.repeat_days = repeat_days;
        self
    }

    pub fn notifications(mut self, plan: NotificationPlan) -> Self {
        self.notifications = Some(plan);
        self
    }

    /// Validates the input, mints a fresh id and creation timestamp.
    pub fn build(self) -> Result<Task> {
        if self.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        Ok(Task {
            id: Ulid::new().to_string(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            completed: false,
            is_repeating: self.is_repeating,
            repeat_days: self.repeat_days,
            notifications: self.notifications,
            created_at: Utc::now(),
        })
    }
}
