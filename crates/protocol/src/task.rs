//! Task-related types for the reconciling store.
//!
//! This module defines the core task types used throughout the tack
//! application, including task identifiers, the status state machine,
//! sub-tasks, and the partial-update patch type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProtocolError, Result};
use crate::project::ProjectId;

/// Unique identifier for a task.
///
/// Uses UUID v4, generated client-side before the remote store has
/// acknowledged the creating write.
pub type TaskId = Uuid;

/// Identifier for a user, as supplied by the identity provider.
pub type UserId = String;

/// The Kanban status of a task.
///
/// The order reflects the typical progression of work. `Finalized` and
/// `Cancelled` are the completed states; everything else counts as open.
///
/// # Examples
///
/// ```
/// use tack_protocol::TaskStatus;
///
/// assert!(TaskStatus::Finalized.is_completed());
/// assert!(!TaskStatus::Done.is_completed());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting to be started.
    #[default]
    Pending,
    /// Task is actively being worked on.
    InProgress,
    /// Work is finished but not yet signed off.
    Done,
    /// Task is finished and signed off.
    Finalized,
    /// Task was abandoned.
    Cancelled,
}

impl TaskStatus {
    /// Returns all statuses in workflow order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::TaskStatus;
    ///
    /// let statuses = TaskStatus::all();
    /// assert_eq!(statuses.len(), 5);
    /// assert_eq!(statuses[0], TaskStatus::Pending);
    /// ```
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Pending,
            Self::InProgress,
            Self::Done,
            Self::Finalized,
            Self::Cancelled,
        ]
    }

    /// Returns `true` if this status counts as completed.
    ///
    /// Only `Finalized` and `Cancelled` are completed states; a task in
    /// `Done` is finished work that has not been signed off and is still
    /// considered open.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::TaskStatus;
    ///
    /// assert!(!TaskStatus::Pending.is_completed());
    /// assert!(!TaskStatus::Done.is_completed());
    /// assert!(TaskStatus::Finalized.is_completed());
    /// assert!(TaskStatus::Cancelled.is_completed());
    /// ```
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }

    /// Returns a human-readable display name for the status.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::InProgress.display_name(), "In Progress");
    /// ```
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Finalized => "Finalized",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// The priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal queue position.
    #[default]
    Medium,
    /// Should be picked up first.
    High,
}

/// The work category of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Development,
    Design,
    Marketing,
    Sales,
    Support,
    #[default]
    Other,
}

/// An embedded sub-task.
///
/// Sub-tasks have no independent persistence path; they live inside their
/// parent task's `sub_tasks` list and the whole list is rewritten on every
/// edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    /// Identifier, unique within the parent task.
    pub id: Uuid,
    /// Short description of the step.
    pub title: String,
    /// Whether this step is done.
    pub completed: bool,
}

impl SubTask {
    /// Creates a new incomplete sub-task.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::SubTask;
    ///
    /// let sub = SubTask::new("Draft outline");
    /// assert!(!sub.completed);
    /// ```
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A work item tracked by the store.
///
/// Tasks are created locally (optimistic creation), mirrored to a remote
/// document store, and reconciled against snapshots pushed back by it.
///
/// # Invariants
///
/// - `completed == status.is_completed()` after every status transition
///   applied through [`Task::transition_status`].
/// - `completed_at` is `Some` if and only if `completed` is `true`.
/// - `started_at`, once set, is never cleared or overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: TaskId,
    /// Short summary of the work. Never empty.
    pub title: String,
    /// Work category.
    pub category: Category,
    /// Scheduling priority.
    pub priority: Priority,
    /// Whether the task is in a completed status. Derived from `status`.
    pub completed: bool,
    /// Current Kanban status.
    pub status: TaskStatus,
    /// When the task was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// When the task first entered `InProgress`, if it ever has.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the task entered its current completed status, if completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// User-editable due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    /// Project this task belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Embedded sub-tasks, in display order.
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
    /// User the task is assigned to. Defaults to the creating user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    /// User that created the task. Immutable.
    pub created_by: UserId,
    /// Cached urgency score. Not authoritative; recomputed on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_priority_score: Option<u32>,
    /// Accumulated work time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
}

impl Task {
    /// Creates a task from a draft, validating required fields.
    ///
    /// The task starts in `Pending` with no sub-tasks; `assigned_to`
    /// defaults to the creating user when the draft leaves it unset.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidTaskTitle`] if the title is empty
    /// or whitespace-only.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::{Category, NewTask, Priority, Task, TaskStatus};
    ///
    /// let draft = NewTask::new("Write report", Category::Development, Priority::High);
    /// let task = Task::from_new(draft, "alice".to_string()).unwrap();
    /// assert_eq!(task.status, TaskStatus::Pending);
    /// assert_eq!(task.assigned_to.as_deref(), Some("alice"));
    /// ```
    pub fn from_new(new: NewTask, created_by: UserId) -> Result<Self> {
        if new.title.trim().is_empty() {
            return Err(ProtocolError::InvalidTaskTitle);
        }

        Ok(Self {
            id: TaskId::new_v4(),
            title: new.title,
            category: new.category,
            priority: new.priority,
            completed: false,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            due_date: new.due_date,
            project_id: new.project_id,
            sub_tasks: Vec::new(),
            assigned_to: new.assigned_to.or_else(|| Some(created_by.clone())),
            created_by,
            ai_priority_score: None,
            time_spent: None,
        })
    }

    /// Applies a status transition, maintaining the completion invariants.
    ///
    /// - `completed` follows [`TaskStatus::is_completed`].
    /// - `completed_at` is stamped with `now` on entry into a completed
    ///   status (if not already set) and cleared on any transition out of
    ///   one, even if the task had been completed before.
    /// - `started_at` is stamped the first time the task enters
    ///   `InProgress` and never touched again.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use tack_protocol::{Category, NewTask, Priority, Task, TaskStatus};
    ///
    /// let draft = NewTask::new("Ship it", Category::Development, Priority::Medium);
    /// let mut task = Task::from_new(draft, "alice".to_string()).unwrap();
    ///
    /// task.transition_status(TaskStatus::Finalized, Utc::now());
    /// assert!(task.completed);
    /// assert!(task.completed_at.is_some());
    ///
    /// task.transition_status(TaskStatus::Pending, Utc::now());
    /// assert!(!task.completed);
    /// assert!(task.completed_at.is_none());
    /// ```
    pub fn transition_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.completed = status.is_completed();

        if self.completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        } else {
            self.completed_at = None;
        }

        if status == TaskStatus::InProgress && self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Returns `true` if the task has sub-tasks and all of them are done.
    #[must_use]
    pub fn all_sub_tasks_completed(&self) -> bool {
        !self.sub_tasks.is_empty() && self.sub_tasks.iter().all(|s| s.completed)
    }
}

/// A draft for creating a task.
///
/// Title, category, and priority are required by construction; the rest is
/// optional and defaulted by [`Task::from_new`].
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Short summary of the work.
    pub title: String,
    /// Work category.
    pub category: Category,
    /// Scheduling priority.
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional owning project.
    pub project_id: Option<ProjectId>,
    /// Optional assignee; defaults to the creating user.
    pub assigned_to: Option<UserId>,
}

impl NewTask {
    /// Creates a draft with the required fields and no optionals.
    ///
    /// # Examples
    ///
    /// ```
    /// use tack_protocol::{Category, NewTask, Priority};
    ///
    /// let draft = NewTask::new("Fix login", Category::Development, Priority::High);
    /// assert!(draft.due_date.is_none());
    /// ```
    #[must_use]
    pub fn new(title: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            title: title.into(),
            category,
            priority,
            due_date: None,
            project_id: None,
            assigned_to: None,
        }
    }
}

/// A partial update to a task.
///
/// Unset fields are left untouched; fields set to `Some` overwrite the
/// current value (last-writer-wins at field granularity). Nullable task
/// fields use a nested `Option` so a patch can distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New category, if changing.
    pub category: Option<Category>,
    /// New priority, if changing.
    pub priority: Option<Priority>,
    /// New completed flag, if changing.
    pub completed: Option<bool>,
    /// New status, if changing.
    pub status: Option<TaskStatus>,
    /// Set or clear the start timestamp.
    pub started_at: Option<Option<DateTime<Utc>>>,
    /// Set or clear the completion timestamp.
    pub completed_at: Option<Option<DateTime<Utc>>>,
    /// Set or clear the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// Set or clear the owning project.
    pub project_id: Option<Option<ProjectId>>,
    /// Replace the whole sub-task list.
    pub sub_tasks: Option<Vec<SubTask>>,
    /// Set or clear the assignee.
    pub assigned_to: Option<Option<UserId>>,
    /// Set or clear the cached urgency score.
    pub ai_priority_score: Option<Option<u32>>,
    /// New accumulated work time in seconds.
    pub time_spent: Option<u64>,
}

impl TaskPatch {
    /// Returns `true` if no fields are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
            && self.status.is_none()
            && self.started_at.is_none()
            && self.completed_at.is_none()
            && self.due_date.is_none()
            && self.project_id.is_none()
            && self.sub_tasks.is_none()
            && self.assigned_to.is_none()
            && self.ai_priority_score.is_none()
            && self.time_spent.is_none()
    }

    /// Applies the set fields onto a task, leaving the rest untouched.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(started_at) = self.started_at {
            task.started_at = started_at;
        }
        if let Some(completed_at) = self.completed_at {
            task.completed_at = completed_at;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(sub_tasks) = &self.sub_tasks {
            task.sub_tasks = sub_tasks.clone();
        }
        if let Some(assigned_to) = &self.assigned_to {
            task.assigned_to = assigned_to.clone();
        }
        if let Some(score) = self.ai_priority_score {
            task.ai_priority_score = score;
        }
        if let Some(time_spent) = self.time_spent {
            task.time_spent = Some(time_spent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(title: &str) -> Task {
        let draft = NewTask::new(title, Category::Development, Priority::Medium);
        Task::from_new(draft, "tester".to_string()).unwrap()
    }

    #[test]
    fn status_default_is_pending() {
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }

    #[test]
    fn status_completed_detection() {
        assert!(!TaskStatus::Pending.is_completed());
        assert!(!TaskStatus::InProgress.is_completed());
        assert!(!TaskStatus::Done.is_completed());
        assert!(TaskStatus::Finalized.is_completed());
        assert!(TaskStatus::Cancelled.is_completed());
    }

    #[test]
    fn from_new_defaults() {
        let task = make_task("Write report");

        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert!(task.started_at.is_none());
        assert!(task.sub_tasks.is_empty());
        assert_eq!(task.assigned_to.as_deref(), Some("tester"));
        assert_eq!(task.created_by, "tester");
    }

    #[test]
    fn from_new_rejects_empty_title() {
        let draft = NewTask::new("", Category::Other, Priority::Low);
        assert!(matches!(
            Task::from_new(draft, "tester".to_string()),
            Err(ProtocolError::InvalidTaskTitle)
        ));

        let draft = NewTask::new("   ", Category::Other, Priority::Low);
        assert!(Task::from_new(draft, "tester".to_string()).is_err());
    }

    #[test]
    fn from_new_keeps_explicit_assignee() {
        let mut draft = NewTask::new("Review PR", Category::Development, Priority::High);
        draft.assigned_to = Some("bob".to_string());

        let task = Task::from_new(draft, "alice".to_string()).unwrap();
        assert_eq!(task.assigned_to.as_deref(), Some("bob"));
        assert_eq!(task.created_by, "alice");
    }

    #[test]
    fn transition_into_completed_stamps_completed_at() {
        let mut task = make_task("Finish");
        let now = Utc::now();

        task.transition_status(TaskStatus::Finalized, now);

        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn transition_out_of_completed_clears_completed_at() {
        let mut task = make_task("Reopen");

        task.transition_status(TaskStatus::Finalized, Utc::now());
        assert!(task.completed_at.is_some());

        task.transition_status(TaskStatus::Pending, Utc::now());
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn transition_preserves_existing_completed_at() {
        let mut task = make_task("Cancel after finish");
        let first = Utc::now();

        task.transition_status(TaskStatus::Finalized, first);
        let later = first + chrono::Duration::seconds(30);
        task.transition_status(TaskStatus::Cancelled, later);

        // Still completed, original stamp kept.
        assert_eq!(task.completed_at, Some(first));
    }

    #[test]
    fn started_at_set_on_first_in_progress_only() {
        let mut task = make_task("Start twice");
        let first = Utc::now();

        task.transition_status(TaskStatus::InProgress, first);
        assert_eq!(task.started_at, Some(first));

        let later = first + chrono::Duration::seconds(60);
        task.transition_status(TaskStatus::Pending, later);
        task.transition_status(TaskStatus::InProgress, later);

        assert_eq!(task.started_at, Some(first));
    }

    #[test]
    fn all_sub_tasks_completed_requires_nonempty_list() {
        let mut task = make_task("Parent");
        assert!(!task.all_sub_tasks_completed());

        task.sub_tasks.push(SubTask::new("one"));
        assert!(!task.all_sub_tasks_completed());

        task.sub_tasks[0].completed = true;
        assert!(task.all_sub_tasks_completed());
    }

    #[test]
    fn patch_is_empty() {
        assert!(TaskPatch::default().is_empty());

        let patch = TaskPatch {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut task = make_task("Original");
        let original_status = task.status;

        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            priority: Some(Priority::High),
            ..Default::default()
        };
        patch.apply(&mut task);

        assert_eq!(task.title, "Renamed");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, original_status);
    }

    #[test]
    fn patch_clears_nullable_fields() {
        let mut task = make_task("Clearable");
        task.due_date = Some(Utc::now());
        task.project_id = Some(Uuid::new_v4());

        let patch = TaskPatch {
            due_date: Some(None),
            project_id: Some(None),
            ..Default::default()
        };
        patch.apply(&mut task);

        assert!(task.due_date.is_none());
        assert!(task.project_id.is_none());
    }

    #[test]
    fn status_json_format() {
        let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialize");
        assert_eq!(json, r#""in_progress""#);

        let json = serde_json::to_string(&TaskStatus::Finalized).expect("serialize");
        assert_eq!(json, r#""finalized""#);
    }

    #[test]
    fn task_serialization_roundtrip() {
        let mut task = make_task("Roundtrip");
        task.sub_tasks.push(SubTask::new("step"));
        task.due_date = Some(Utc::now());

        let json = serde_json::to_string(&task).expect("serialize");
        let parsed: Task = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(task, parsed);
    }
}
