//! The reconciling task/project store.
//!
//! [`TaskStore`] presents a single, locally readable collection of tasks
//! and projects. Mutations apply to local state synchronously and enqueue
//! remote writes into an outbox; a sync driver (see [`crate::sync`])
//! flushes the outbox and feeds remote snapshots back in. Callers never
//! wait on the network and never see remote failures: a failed write is
//! logged and the local state stays optimistic until a later snapshot
//! reconciles it.
//!
//! The store is a plain value, constructed per session and dropped at
//! logout. Several independent stores can coexist in one process.

use std::collections::VecDeque;

use chrono::{Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use tack_config::{Config, Role, Session};
use tack_protocol::{
    NewProject, NewTask, Project, ProjectId, ProjectPatch, SubTask, Task, TaskId, TaskPatch,
    TaskStatus,
};
use tack_remote::codec;
use tack_remote::{Query, Snapshot, WriteOp};

use crate::error::{Result, StoreError};
use crate::local::{merge_snapshot, LocalEntry};

/// A queued remote write: either a single operation or an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCommand {
    /// One create/update/delete.
    Write(WriteOp),
    /// A group applied all-or-nothing.
    Batch(Vec<WriteOp>),
}

impl RemoteCommand {
    /// The operations this command carries.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        match self {
            Self::Write(op) => std::slice::from_ref(op),
            Self::Batch(ops) => ops,
        }
    }
}

/// The reconciling task/project store.
///
/// # Examples
///
/// ```
/// use tack_config::{Config, Role, Session};
/// use tack_protocol::{Category, NewTask, Priority, TaskStatus};
/// use tack_store::TaskStore;
///
/// let mut store = TaskStore::new(
///     &Config::default(),
///     Session::authenticated("alice", Role::Admin),
/// );
///
/// let draft = NewTask::new("Write report", Category::Development, Priority::High);
/// let id = store.add_task(draft).unwrap();
///
/// // The optimistic entry is readable immediately.
/// assert_eq!(store.task(id).unwrap().status, TaskStatus::Pending);
/// assert!(store.is_pending(id));
/// ```
#[derive(Debug)]
pub struct TaskStore {
    session: Session,
    tasks_collection: String,
    projects_collection: String,
    retention_days: u32,
    tasks: Vec<LocalEntry<Task>>,
    projects: Vec<LocalEntry<Project>>,
    outbox: VecDeque<RemoteCommand>,
}

impl TaskStore {
    /// Creates an empty store for a session.
    #[must_use]
    pub fn new(config: &Config, session: Session) -> Self {
        Self {
            session,
            tasks_collection: config.collections.tasks.clone(),
            projects_collection: config.collections.projects.clone(),
            retention_days: config.cleanup.retention_days,
            tasks: Vec::new(),
            projects: Vec::new(),
            outbox: VecDeque::new(),
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// The tasks as the application currently sees them, head first.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|entry| &entry.value)
    }

    /// The projects as the application currently sees them.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().map(|entry| &entry.value)
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|entry| entry.value.id == id)
            .map(|entry| &entry.value)
    }

    /// Looks up a project by id.
    #[must_use]
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects
            .iter()
            .find(|entry| entry.value.id == id)
            .map(|entry| &entry.value)
    }

    /// Returns `true` if the entity has an unacknowledged local mutation.
    #[must_use]
    pub fn is_pending(&self, id: Uuid) -> bool {
        self.tasks
            .iter()
            .find(|entry| entry.value.id == id)
            .map(|entry| !entry.confirmed)
            .or_else(|| {
                self.projects
                    .iter()
                    .find(|entry| entry.value.id == id)
                    .map(|entry| !entry.confirmed)
            })
            .unwrap_or(false)
    }

    /// The session this store was built for.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replaces the session (login, logout, role change).
    ///
    /// The sync driver picks the change up on its next turn, tears down
    /// the old subscriptions, and re-establishes them with the new
    /// role-gated queries.
    pub fn set_session(&mut self, session: Session) {
        if session != self.session {
            debug!(ready = session.is_ready(), "session changed");
            self.session = session;
        }
    }

    // ------------------------------------------------------------------
    // Query gating
    // ------------------------------------------------------------------

    /// The task query the current session should be subscribed with.
    ///
    /// `None` while the session is unresolved or signed out. Operators
    /// get a query filtered to their own tasks; admins see everything.
    #[must_use]
    pub fn task_query(&self) -> Option<Query> {
        match self.session.role()? {
            Role::Admin => Some(Query::all(self.tasks_collection.clone())),
            Role::Operator => {
                let user = self.session.user_id()?;
                Some(Query::assigned(self.tasks_collection.clone(), user))
            }
        }
    }

    /// The project query for the current session; unfiltered for any
    /// signed-in role.
    #[must_use]
    pub fn project_query(&self) -> Option<Query> {
        self.session.role()?;
        Some(Query::all(self.projects_collection.clone()))
    }

    // ------------------------------------------------------------------
    // Task mutations
    // ------------------------------------------------------------------

    /// Creates a task optimistically and enqueues the remote create.
    ///
    /// The new task is inserted at the head of the local collection and
    /// is readable before the remote store has seen it.
    ///
    /// # Errors
    ///
    /// Returns an error if no user is signed in or the draft fails
    /// validation. Nothing is mutated in that case.
    pub fn add_task(&mut self, new: NewTask) -> Result<TaskId> {
        let user = self
            .session
            .user_id()
            .ok_or(StoreError::NoSession)?
            .to_string();
        let task = Task::from_new(new, user)?;
        let id = task.id;

        let fields = codec::task_to_fields(&task);
        self.tasks.insert(0, LocalEntry::pending(task));
        self.push_write(WriteOp::Create {
            collection: self.tasks_collection.clone(),
            id: id.to_string(),
            fields,
        });
        debug!(%id, "task created locally");
        Ok(id)
    }

    /// Merges a patch into a task optimistically and enqueues a remote
    /// update of the changed fields.
    ///
    /// Unknown ids and empty patches are logged no-ops.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) {
        if patch.is_empty() {
            return;
        }
        let Some(entry) = self.tasks.iter_mut().find(|entry| entry.value.id == id) else {
            warn!(%id, "update for unknown task");
            return;
        };
        patch.apply(&mut entry.value);
        entry.confirmed = false;

        let fields = codec::task_patch_to_fields(&patch);
        self.push_write(WriteOp::Update {
            collection: self.tasks_collection.clone(),
            id: id.to_string(),
            fields,
        });
    }

    /// Removes a task locally and enqueues the remote delete.
    ///
    /// There is no rollback on remote failure; if the delete never lands,
    /// the next snapshot resurrects the task.
    pub fn delete_task(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|entry| entry.value.id != id);
        if self.tasks.len() == before {
            warn!(%id, "delete for unknown task");
            return;
        }
        self.push_write(WriteOp::Delete {
            collection: self.tasks_collection.clone(),
            id: id.to_string(),
        });
    }

    /// The central status state machine.
    ///
    /// Derives `completed` from the new status, stamps or clears
    /// `completed_at`, stamps `started_at` on first entry into
    /// `InProgress`, and delegates the write to [`TaskStore::update_task`].
    pub fn update_task_status(&mut self, id: TaskId, status: TaskStatus) {
        let Some(task) = self.task(id) else {
            warn!(%id, "status change for unknown task");
            return;
        };

        let now = Utc::now();
        let completed = status.is_completed();

        let mut patch = TaskPatch {
            status: Some(status),
            completed: Some(completed),
            ..Default::default()
        };
        patch.completed_at = Some(if completed {
            // Keep the original stamp when moving between completed states.
            Some(task.completed_at.unwrap_or(now))
        } else {
            None
        });
        if status == TaskStatus::InProgress && task.started_at.is_none() {
            patch.started_at = Some(Some(now));
        }

        self.update_task(id, patch);
    }

    /// Toggles completion of a task or one of its sub-tasks.
    ///
    /// With a sub-task id, flips that sub-task; the parent transitions to
    /// `Finalized` when every sub-task is now done, otherwise to
    /// `InProgress`. Without one, inverts the task's completion:
    /// `Finalized` when completing, `Pending` when reopening.
    pub fn toggle_task_completion(&mut self, id: TaskId, sub_task: Option<Uuid>) {
        let Some(task) = self.task(id) else {
            warn!(%id, "toggle for unknown task");
            return;
        };

        match sub_task {
            Some(sub_id) => {
                let mut sub_tasks = task.sub_tasks.clone();
                let Some(sub) = sub_tasks.iter_mut().find(|s| s.id == sub_id) else {
                    warn!(%id, %sub_id, "toggle for unknown sub-task");
                    return;
                };
                sub.completed = !sub.completed;
                let all_done = sub_tasks.iter().all(|s| s.completed);

                self.update_task(
                    id,
                    TaskPatch {
                        sub_tasks: Some(sub_tasks),
                        ..Default::default()
                    },
                );
                let next = if all_done {
                    TaskStatus::Finalized
                } else {
                    TaskStatus::InProgress
                };
                self.update_task_status(id, next);
            }
            None => {
                let next = if task.completed {
                    TaskStatus::Pending
                } else {
                    TaskStatus::Finalized
                };
                self.update_task_status(id, next);
            }
        }
    }

    /// Sends a task back to `Pending`, clearing its completion.
    ///
    /// `started_at` is left as it was.
    pub fn restore_task(&mut self, id: TaskId) {
        self.update_task_status(id, TaskStatus::Pending);
    }

    /// Appends a sub-task; the whole sub-task list is rewritten.
    pub fn add_sub_task(&mut self, id: TaskId, title: impl Into<String>) {
        let Some(task) = self.task(id) else {
            warn!(%id, "sub-task add for unknown task");
            return;
        };
        let mut sub_tasks = task.sub_tasks.clone();
        sub_tasks.push(SubTask::new(title));
        self.update_task(
            id,
            TaskPatch {
                sub_tasks: Some(sub_tasks),
                ..Default::default()
            },
        );
    }

    /// Renames a sub-task; the whole sub-task list is rewritten.
    pub fn update_sub_task(&mut self, id: TaskId, sub_id: Uuid, title: impl Into<String>) {
        let Some(task) = self.task(id) else {
            warn!(%id, "sub-task update for unknown task");
            return;
        };
        let mut sub_tasks = task.sub_tasks.clone();
        let Some(sub) = sub_tasks.iter_mut().find(|s| s.id == sub_id) else {
            warn!(%id, %sub_id, "update for unknown sub-task");
            return;
        };
        sub.title = title.into();
        self.update_task(
            id,
            TaskPatch {
                sub_tasks: Some(sub_tasks),
                ..Default::default()
            },
        );
    }

    /// Removes a sub-task; the whole sub-task list is rewritten.
    pub fn delete_sub_task(&mut self, id: TaskId, sub_id: Uuid) {
        let Some(task) = self.task(id) else {
            warn!(%id, "sub-task delete for unknown task");
            return;
        };
        let mut sub_tasks = task.sub_tasks.clone();
        let before = sub_tasks.len();
        sub_tasks.retain(|s| s.id != sub_id);
        if sub_tasks.len() == before {
            warn!(%id, %sub_id, "delete for unknown sub-task");
            return;
        }
        self.update_task(
            id,
            TaskPatch {
                sub_tasks: Some(sub_tasks),
                ..Default::default()
            },
        );
    }

    /// Adds `seconds` to the task's accumulated work time.
    pub fn log_time(&mut self, id: TaskId, seconds: u64) {
        let Some(task) = self.task(id) else {
            warn!(%id, "time logged for unknown task");
            return;
        };
        let total = task.time_spent.unwrap_or(0).saturating_add(seconds);
        self.update_task(
            id,
            TaskPatch {
                time_spent: Some(total),
                ..Default::default()
            },
        );
    }

    /// Applies a set of patches optimistically and enqueues one atomic
    /// batch covering all of them.
    ///
    /// This is the data path for assistant-driven bulk reorganization.
    /// Unknown ids and empty patches are skipped with a warning.
    pub fn reorganize_tasks(&mut self, patches: Vec<(TaskId, TaskPatch)>) {
        let mut ops = Vec::new();
        for (id, patch) in patches {
            if patch.is_empty() {
                continue;
            }
            let Some(entry) = self.tasks.iter_mut().find(|entry| entry.value.id == id) else {
                warn!(%id, "reorganization patch for unknown task");
                continue;
            };
            patch.apply(&mut entry.value);
            entry.confirmed = false;
            ops.push(WriteOp::Update {
                collection: self.tasks_collection.clone(),
                id: id.to_string(),
                fields: codec::task_patch_to_fields(&patch),
            });
        }
        if !ops.is_empty() {
            debug!(count = ops.len(), "bulk reorganization");
            self.push_batch(ops);
        }
    }

    /// Deletes tasks completed longer ago than the retention window, in
    /// one atomic batch.
    pub fn delete_completed_tasks(&mut self) {
        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));

        let doomed: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|entry| {
                entry.value.completed
                    && entry
                        .value
                        .completed_at
                        .is_some_and(|completed_at| completed_at < cutoff)
            })
            .map(|entry| entry.value.id)
            .collect();
        if doomed.is_empty() {
            return;
        }

        debug!(count = doomed.len(), "cleaning up completed tasks");
        self.tasks
            .retain(|entry| !doomed.contains(&entry.value.id));
        let ops = doomed
            .iter()
            .map(|id| WriteOp::Delete {
                collection: self.tasks_collection.clone(),
                id: id.to_string(),
            })
            .collect();
        self.push_batch(ops);
    }

    // ------------------------------------------------------------------
    // Project mutations
    // ------------------------------------------------------------------

    /// Creates a project optimistically and enqueues the remote create.
    ///
    /// # Errors
    ///
    /// Returns an error if no user is signed in or the draft fails
    /// validation. Nothing is mutated in that case.
    pub fn add_project(&mut self, new: NewProject) -> Result<ProjectId> {
        let user = self
            .session
            .user_id()
            .ok_or(StoreError::NoSession)?
            .to_string();
        let project = Project::from_new(new, user)?;
        let id = project.id;

        let fields = codec::project_to_fields(&project);
        self.projects.insert(0, LocalEntry::pending(project));
        self.push_write(WriteOp::Create {
            collection: self.projects_collection.clone(),
            id: id.to_string(),
            fields,
        });
        debug!(%id, "project created locally");
        Ok(id)
    }

    /// Merges a patch into a project optimistically and enqueues a remote
    /// update of the changed fields.
    pub fn update_project(&mut self, id: ProjectId, patch: ProjectPatch) {
        if patch.is_empty() {
            return;
        }
        let Some(entry) = self.projects.iter_mut().find(|entry| entry.value.id == id) else {
            warn!(%id, "update for unknown project");
            return;
        };
        patch.apply(&mut entry.value);
        entry.confirmed = false;

        let fields = codec::project_patch_to_fields(&patch);
        self.push_write(WriteOp::Update {
            collection: self.projects_collection.clone(),
            id: id.to_string(),
            fields,
        });
    }

    /// Deletes a project and every task referencing it.
    ///
    /// Local removal is immediate; the remote side is one atomic batch
    /// covering the project and all of its tasks, so a failure leaves the
    /// remote store untouched and the next snapshot restores the local
    /// view.
    pub fn delete_project(&mut self, id: ProjectId) {
        let before = self.projects.len();
        self.projects.retain(|entry| entry.value.id != id);
        if self.projects.len() == before {
            warn!(%id, "delete for unknown project");
            return;
        }

        let task_ids: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|entry| entry.value.project_id == Some(id))
            .map(|entry| entry.value.id)
            .collect();
        self.tasks
            .retain(|entry| entry.value.project_id != Some(id));

        debug!(%id, cascaded = task_ids.len(), "project deleted");
        let mut ops = vec![WriteOp::Delete {
            collection: self.projects_collection.clone(),
            id: id.to_string(),
        }];
        ops.extend(task_ids.iter().map(|task_id| WriteOp::Delete {
            collection: self.tasks_collection.clone(),
            id: task_id.to_string(),
        }));
        self.push_batch(ops);
    }

    // ------------------------------------------------------------------
    // Bulk operations
    // ------------------------------------------------------------------

    /// Empties the store and enqueues one batch deleting every loaded
    /// document. Admin only: for any other session this is a logged
    /// no-op.
    ///
    /// Only documents currently loaded client-side are deleted; this is
    /// not a server-side wipe.
    pub fn clear_all_data(&mut self) {
        if !self.session.is_admin() {
            warn!("clear_all_data requires the admin role; ignoring");
            return;
        }

        let mut ops: Vec<WriteOp> = self
            .tasks
            .iter()
            .map(|entry| WriteOp::Delete {
                collection: self.tasks_collection.clone(),
                id: entry.value.id.to_string(),
            })
            .collect();
        ops.extend(self.projects.iter().map(|entry| WriteOp::Delete {
            collection: self.projects_collection.clone(),
            id: entry.value.id.to_string(),
        }));

        self.tasks.clear();
        self.projects.clear();

        if !ops.is_empty() {
            debug!(count = ops.len(), "clearing all loaded data");
            self.push_batch(ops);
        }
    }

    /// Explicit refresh hook, kept for interface compatibility.
    ///
    /// Snapshot subscriptions make polling unnecessary, so this does
    /// nothing.
    pub fn sync_data(&self) {
        debug!("sync_data is a no-op; snapshot subscriptions keep the store current");
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Merges an incoming task snapshot into the local collection.
    ///
    /// Documents that fail to decode are skipped with a warning rather
    /// than poisoning the whole snapshot.
    pub fn apply_task_snapshot(&mut self, snapshot: &Snapshot) {
        let mut server_tasks = Vec::with_capacity(snapshot.docs.len());
        for doc in &snapshot.docs {
            match codec::task_from_document(doc) {
                Ok(task) => server_tasks.push(task),
                Err(e) => warn!(id = %doc.id, error = %e, "skipping undecodable task document"),
            }
        }
        debug!(
            server = server_tasks.len(),
            local = self.tasks.len(),
            "merging task snapshot"
        );
        merge_snapshot(&mut self.tasks, server_tasks, |task| task.id);
    }

    /// Merges an incoming project snapshot into the local collection.
    pub fn apply_project_snapshot(&mut self, snapshot: &Snapshot) {
        let mut server_projects = Vec::with_capacity(snapshot.docs.len());
        for doc in &snapshot.docs {
            match codec::project_from_document(doc) {
                Ok(project) => server_projects.push(project),
                Err(e) => {
                    warn!(id = %doc.id, error = %e, "skipping undecodable project document");
                }
            }
        }
        merge_snapshot(&mut self.projects, server_projects, |project| project.id);
    }

    // ------------------------------------------------------------------
    // Outbox
    // ------------------------------------------------------------------

    /// Takes the next queued remote command, if any.
    #[must_use]
    pub fn next_command(&mut self) -> Option<RemoteCommand> {
        self.outbox.pop_front()
    }

    /// Number of remote commands waiting to be flushed.
    #[must_use]
    pub fn queued_commands(&self) -> usize {
        self.outbox.len()
    }

    /// Records the outcome of an executed command.
    ///
    /// Success confirms the targeted entries; failure is logged and the
    /// local state stays optimistic, to be corrected by the next
    /// snapshot.
    pub fn settle_command(&mut self, command: &RemoteCommand, result: tack_remote::Result<()>) {
        match result {
            Ok(()) => {
                for op in command.ops() {
                    self.confirm_op(op);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "remote write failed; keeping optimistic local state");
            }
        }
    }

    fn confirm_op(&mut self, op: &WriteOp) {
        let (collection, id) = match op {
            WriteOp::Create { collection, id, .. } | WriteOp::Update { collection, id, .. } => {
                (collection, id)
            }
            // A confirmed delete has no local entry left to flag.
            WriteOp::Delete { .. } => return,
        };
        let Ok(id) = Uuid::parse_str(id) else {
            return;
        };

        if *collection == self.tasks_collection {
            if let Some(entry) = self.tasks.iter_mut().find(|entry| entry.value.id == id) {
                entry.confirmed = true;
            }
        } else if *collection == self.projects_collection {
            if let Some(entry) = self.projects.iter_mut().find(|entry| entry.value.id == id) {
                entry.confirmed = true;
            }
        }
    }

    fn push_write(&mut self, op: WriteOp) {
        self.outbox.push_back(RemoteCommand::Write(op));
    }

    fn push_batch(&mut self, ops: Vec<WriteOp>) {
        self.outbox.push_back(RemoteCommand::Batch(ops));
    }
}
