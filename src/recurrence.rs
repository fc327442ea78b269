//! Recurring-task expansion.
//!
//! Completing a repeating task materializes one new occurrence per configured
//! weekday, always strictly in the future: a weekday that has already passed
//! this week, or equals today, lands in the next week. Occurrences keep the
//! original due time-of-day on the new date.
//!
//! The next occurrence is computed from the *completion* date, so completing
//! late drifts the schedule forward ("next Wednesday from today"). That
//! policy is deliberate here; see DESIGN.md.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;
use ulid::Ulid;

use crate::task::{Task, WEEKDAY_NAMES};

/// Outcome of one expansion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpansionReport {
    /// New occurrences, paired with the partition date each belongs to.
    pub created: Vec<(NaiveDate, Task)>,
    /// Weekday names that were not recognized and produced nothing.
    pub skipped_days: Vec<String>,
}

/// Position of a weekday name in the Sunday-first week, if recognized.
fn weekday_index(name: &str) -> Option<i64> {
    WEEKDAY_NAMES
        .iter()
        .position(|known| *known == name)
        .map(|index| index as i64)
}

/// Next calendar date falling on `target` strictly after `from`.
fn next_occurrence(from: NaiveDate, target: i64) -> NaiveDate {
    let current = from.weekday().num_days_from_sunday() as i64;
    let mut days_ahead = target - current;
    if days_ahead <= 0 {
        days_ahead += 7;
    }
    from + Duration::days(days_ahead)
}

/// Expand a completed repeating task into its next occurrences.
///
/// The completed original is untouched: history stays in place. Unrecognized
/// weekday names are skipped and reported, not fatal.
pub fn expand(task: &Task, completed_on: NaiveDate) -> ExpansionReport {
    let mut report = ExpansionReport::default();
    let time_of_day = task.due_date.time();

    for day_name in &task.repeat_days {
        let Some(target) = weekday_index(day_name) else {
            warn!(task = %task.id, day = %day_name, "skipping unrecognized repeat day");
            report.skipped_days.push(day_name.clone());
            continue;
        };
        let date = next_occurrence(completed_on, target);
        let occurrence = Task {
            // The weekday suffix keeps ids distinct across occurrences
            // minted in the same instant.
            id: format!("{}-{}", Ulid::new(), day_name),
            completed: false,
            due_date: date.and_time(time_of_day),
            created_at: Utc::now(),
            ..task.clone()
        };
        report.created.push((date, occurrence));
    }

    report
}
