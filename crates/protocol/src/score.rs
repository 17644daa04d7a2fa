//! Urgency scoring for tasks.
//!
//! The score is a small weighted heuristic over priority, due-date
//! proximity, age, status, and sub-task progress. It is recomputed on read;
//! the `ai_priority_score` field on [`Task`] is only a cache of a previous
//! computation and is never treated as authoritative.

use chrono::{DateTime, Utc};

use crate::task::{Priority, Task, TaskStatus};

/// Score contribution per priority level.
const PRIORITY_WEIGHT_HIGH: u32 = 30;
const PRIORITY_WEIGHT_MEDIUM: u32 = 20;
const PRIORITY_WEIGHT_LOW: u32 = 10;

/// Score contribution for tasks already in progress.
const IN_PROGRESS_BONUS: u32 = 5;

/// Cap on the age contribution (one point per day of age).
const MAX_AGE_BONUS: u32 = 10;

/// Maximum total score.
pub const MAX_SCORE: u32 = 100;

/// Computes the urgency score of a task at the given instant.
///
/// Completed tasks always score zero. For open tasks the score combines:
///
/// - priority: 10 / 20 / 30 points for low / medium / high
/// - due date: 25 points if overdue, then 20 / 15 / 10 points for due
///   within one / three / seven days
/// - age: one point per day since creation, capped at 10
/// - status: 5 extra points when already in progress
/// - sub-task progress: up to 10 points proportional to completed steps
///
/// The total is clamped to [`MAX_SCORE`].
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use tack_protocol::{Category, NewTask, Priority, Task, score::priority_score};
///
/// let draft = NewTask::new("Urgent fix", Category::Development, Priority::High);
/// let task = Task::from_new(draft, "alice".to_string()).unwrap();
/// assert!(priority_score(&task, Utc::now()) >= 30);
/// ```
#[must_use]
pub fn priority_score(task: &Task, now: DateTime<Utc>) -> u32 {
    if task.completed {
        return 0;
    }

    let mut score = match task.priority {
        Priority::High => PRIORITY_WEIGHT_HIGH,
        Priority::Medium => PRIORITY_WEIGHT_MEDIUM,
        Priority::Low => PRIORITY_WEIGHT_LOW,
    };

    if let Some(due) = task.due_date {
        let remaining = due.signed_duration_since(now);
        score += if remaining.num_seconds() < 0 {
            25
        } else if remaining.num_days() < 1 {
            20
        } else if remaining.num_days() < 3 {
            15
        } else if remaining.num_days() < 7 {
            10
        } else {
            0
        };
    }

    let age_days = now.signed_duration_since(task.created_at).num_days();
    score += u32::try_from(age_days.max(0)).unwrap_or(0).min(MAX_AGE_BONUS);

    if task.status == TaskStatus::InProgress {
        score += IN_PROGRESS_BONUS;
    }

    if !task.sub_tasks.is_empty() {
        let done = task.sub_tasks.iter().filter(|s| s.completed).count() as u32;
        let total = task.sub_tasks.len() as u32;
        score += done * 10 / total;
    }

    score.min(MAX_SCORE)
}
