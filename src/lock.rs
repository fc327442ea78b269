//! Sequential lock policy.
//!
//! Within an ordered task list, a task is actionable only when every task
//! before it is complete: the first incomplete task is the single unlocked,
//! actionable entry and everything after it is locked regardless of its own
//! state. Lock state is derived per query and never stored on the task.

use crate::task::Task;

/// Locked flag for each index: `i` is locked iff some index `< i` is
/// incomplete. Empty input yields empty output.
pub fn lock_states(tasks: &[Task]) -> Vec<bool> {
    let mut blocked = false;
    tasks
        .iter()
        .map(|task| {
            let locked = blocked;
            if !task.completed {
                blocked = true;
            }
            locked
        })
        .collect()
}

/// Whether the task at `index` is locked.
pub fn is_locked(tasks: &[Task], index: usize) -> bool {
    tasks.iter().take(index).any(|task| !task.completed)
}

/// Index of the single unlocked, incomplete task, if any remain.
pub fn first_actionable(tasks: &[Task]) -> Option<usize> {
    tasks.iter().position(|task| !task.completed)
}
