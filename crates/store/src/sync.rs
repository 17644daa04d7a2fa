//! Subscription lifecycle and the sync driver.
//!
//! The driver owns the two remote subscriptions (tasks and projects) and
//! moves data in both directions: it flushes the store's outbox to the
//! remote store and pumps incoming snapshots back into the store. The
//! subscription lifecycle is an explicit state machine; when the session
//! (and with it the role-gated query) changes, the previous subscription
//! is detached before a new one is established, so two snapshot streams
//! never race for the same local collection.

use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, warn};

use tack_remote::{Query, RemoteStore, Snapshot, SnapshotStream, WriteOp};

use crate::store::{RemoteCommand, TaskStore};

/// The lifecycle of one remote subscription.
#[derive(Debug)]
pub enum SubscriptionState {
    /// No subscription is active.
    Unsubscribed,
    /// A subscription is being established.
    Subscribing,
    /// Snapshots are flowing for `query`.
    Subscribed {
        /// The query the subscription was established with.
        query: Query,
        /// The live snapshot stream.
        stream: SnapshotStream,
    },
}

impl SubscriptionState {
    /// Returns `true` if snapshots are currently flowing.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        matches!(self, Self::Subscribed { .. })
    }

    /// The active query, if subscribed.
    #[must_use]
    pub const fn query(&self) -> Option<&Query> {
        match self {
            Self::Subscribed { query, .. } => Some(query),
            _ => None,
        }
    }
}

/// Drives a [`TaskStore`] against a remote store.
///
/// The driver is deliberately passive: nothing happens until
/// [`SyncDriver::tick`] (or one of its parts) is called from the
/// application's event loop. Store operations themselves never touch the
/// network.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tack_config::{Config, Role, Session};
/// use tack_protocol::{Category, NewTask, Priority};
/// use tack_remote::MemoryRemote;
/// use tack_store::{SyncDriver, TaskStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let remote = Arc::new(MemoryRemote::new());
/// let mut store = TaskStore::new(
///     &Config::default(),
///     Session::authenticated("alice", Role::Admin),
/// );
/// let mut driver = SyncDriver::new(Arc::clone(&remote));
///
/// let draft = NewTask::new("Sync me", Category::Development, Priority::Medium);
/// let id = store.add_task(draft).unwrap();
///
/// driver.tick(&mut store).await;
/// assert!(!store.is_pending(id));
/// # }
/// ```
#[derive(Debug)]
pub struct SyncDriver<S> {
    remote: Arc<S>,
    tasks: SubscriptionState,
    projects: SubscriptionState,
}

impl<S: RemoteStore> SyncDriver<S> {
    /// Creates a driver with no active subscriptions.
    #[must_use]
    pub fn new(remote: Arc<S>) -> Self {
        Self {
            remote,
            tasks: SubscriptionState::Unsubscribed,
            projects: SubscriptionState::Unsubscribed,
        }
    }

    /// The task subscription state.
    #[must_use]
    pub fn task_subscription(&self) -> &SubscriptionState {
        &self.tasks
    }

    /// The project subscription state.
    #[must_use]
    pub fn project_subscription(&self) -> &SubscriptionState {
        &self.projects
    }

    /// One full turn: reconcile subscriptions with the session, flush the
    /// outbox, then pump incoming snapshots.
    pub async fn tick(&mut self, store: &mut TaskStore) {
        self.ensure_subscriptions(store);
        self.flush(store).await;
        self.pump(store);
    }

    /// Brings the subscriptions in line with the store's current queries.
    ///
    /// A changed query (role or user switch) detaches the old stream
    /// before subscribing anew. A failed subscribe is logged and treated
    /// as settled, leaving the state `Unsubscribed`; the next call tries
    /// again.
    pub fn ensure_subscriptions(&mut self, store: &TaskStore) {
        let remote = Arc::clone(&self.remote);
        ensure(remote.as_ref(), &mut self.tasks, store.task_query());
        ensure(remote.as_ref(), &mut self.projects, store.project_query());
    }

    /// Executes every queued remote command and settles the results.
    ///
    /// Failures are absorbed by [`TaskStore::settle_command`]; there is no
    /// retry here.
    pub async fn flush(&mut self, store: &mut TaskStore) {
        while let Some(command) = store.next_command() {
            let result = self.execute(&command).await;
            store.settle_command(&command, result);
        }
    }

    /// Applies every snapshot that has arrived since the last pump.
    pub fn pump(&mut self, store: &mut TaskStore) {
        drain(&mut self.tasks, |snapshot| {
            store.apply_task_snapshot(snapshot);
        });
        drain(&mut self.projects, |snapshot| {
            store.apply_project_snapshot(snapshot);
        });
    }

    async fn execute(&self, command: &RemoteCommand) -> tack_remote::Result<()> {
        match command {
            RemoteCommand::Write(op) => match op {
                WriteOp::Create {
                    collection,
                    id,
                    fields,
                } => self.remote.create(collection, id, fields.clone()).await,
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => self.remote.update(collection, id, fields.clone()).await,
                WriteOp::Delete { collection, id } => self.remote.delete(collection, id).await,
            },
            RemoteCommand::Batch(ops) => self.remote.batch_write(ops.clone()).await,
        }
    }
}

fn ensure<S: RemoteStore>(remote: &S, state: &mut SubscriptionState, desired: Option<Query>) {
    match desired {
        None => {
            if !matches!(state, SubscriptionState::Unsubscribed) {
                debug!("session not ready; tearing down subscription");
                *state = SubscriptionState::Unsubscribed;
            }
        }
        Some(query) => {
            if let SubscriptionState::Subscribed { query: current, .. } = state {
                if *current == query {
                    return;
                }
                debug!(collection = %query.collection, "query changed; detaching previous subscription");
            }

            // The previous stream (if any) is dropped here, before the new
            // subscription exists; the two can never overlap.
            *state = SubscriptionState::Subscribing;
            match remote.subscribe(query.clone()) {
                Ok(stream) => {
                    debug!(collection = %query.collection, "subscribed");
                    *state = SubscriptionState::Subscribed { query, stream };
                }
                Err(e) => {
                    warn!(collection = %query.collection, error = %e, "subscription failed; treating as settled");
                    *state = SubscriptionState::Unsubscribed;
                }
            }
        }
    }
}

fn drain(state: &mut SubscriptionState, mut apply: impl FnMut(&Snapshot)) {
    let disconnected = match state {
        SubscriptionState::Subscribed { stream, .. } => loop {
            match stream.try_recv() {
                Ok(snapshot) => apply(&snapshot),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        },
        _ => false,
    };

    if disconnected {
        warn!("snapshot stream closed by the backend");
        *state = SubscriptionState::Unsubscribed;
    }
}
