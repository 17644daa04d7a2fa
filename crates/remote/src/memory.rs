//! In-process implementation of the remote store contract.
//!
//! [`MemoryRemote`] holds documents in plain maps and fans snapshots out
//! to subscribers over unbounded channels. It exists for tests and the
//! demo binary; it is not a durable backend. Because delivery is
//! synchronous with the write, tests get deterministic snapshot ordering.
//!
//! The backend can be taken "offline" with [`MemoryRemote::set_offline`],
//! which makes every write and new subscription fail with
//! [`RemoteError::Unavailable`] while leaving stored data intact. This is
//! how outage behavior is exercised in tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use crate::document::{Document, DocumentFields, Query, Snapshot, WriteOp};
use crate::error::{RemoteError, Result};
use crate::store::{RemoteStore, SnapshotStream};

/// An in-memory remote document store.
///
/// # Examples
///
/// ```
/// use tack_remote::{MemoryRemote, Query, RemoteStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> tack_remote::Result<()> {
/// let remote = MemoryRemote::new();
/// let mut snapshots = remote.subscribe(Query::all("tasks"))?;
///
/// // The initial snapshot of an empty collection is empty.
/// let snapshot = snapshots.recv().await.unwrap();
/// assert!(snapshot.docs.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, DocumentFields>>,
    subscribers: Vec<Subscriber>,
    offline: bool,
}

#[derive(Debug)]
struct Subscriber {
    query: Query,
    sender: mpsc::UnboundedSender<Snapshot>,
}

impl MemoryRemote {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the simulated connection state.
    ///
    /// While offline, every write and every new subscription fails with
    /// [`RemoteError::Unavailable`]. Existing subscriptions stay attached
    /// and resume receiving snapshots once the store is back online and
    /// data changes again.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of documents currently stored in a collection.
    #[must_use]
    pub fn document_count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Returns `true` if the collection holds a document with this id.
    #[must_use]
    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.lock()
            .collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, op: WriteOp) -> Result<()> {
        let mut inner = self.lock();
        if inner.offline {
            return Err(RemoteError::Unavailable {
                reason: "store is offline".to_string(),
            });
        }

        let collection = op.collection().to_string();
        apply_op(&mut inner.collections, op)?;
        inner.notify(&collection);
        Ok(())
    }
}

/// Applies one write to a set of collections.
fn apply_op(
    collections: &mut HashMap<String, BTreeMap<String, DocumentFields>>,
    op: WriteOp,
) -> Result<()> {
    match op {
        WriteOp::Create {
            collection,
            id,
            fields,
        } => {
            debug!(%collection, %id, "create document");
            collections.entry(collection).or_default().insert(id, fields);
            Ok(())
        }
        WriteOp::Update {
            collection,
            id,
            fields,
        } => {
            let existing = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(&id))
                .ok_or_else(|| RemoteError::NotFound {
                    collection: collection.clone(),
                    id: id.clone(),
                })?;
            debug!(%collection, %id, changed = fields.len(), "update document");
            for (key, value) in fields {
                existing.insert(key, value);
            }
            Ok(())
        }
        WriteOp::Delete { collection, id } => {
            debug!(%collection, %id, "delete document");
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&id);
            }
            Ok(())
        }
    }
}

impl Inner {
    /// Pushes a fresh snapshot to every subscriber watching `collection`,
    /// pruning subscribers whose receiver has been dropped.
    fn notify(&mut self, collection: &str) {
        let docs = self.collections.get(collection).cloned().unwrap_or_default();

        self.subscribers.retain(|subscriber| {
            if subscriber.query.collection != collection {
                return true;
            }
            let snapshot = snapshot_for(&subscriber.query, &docs);
            subscriber.sender.send(snapshot).is_ok()
        });
    }
}

fn snapshot_for(query: &Query, docs: &BTreeMap<String, DocumentFields>) -> Snapshot {
    Snapshot {
        collection: query.collection.clone(),
        docs: docs
            .iter()
            .filter(|(_, fields)| query.matches(fields))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect(),
    }
}

impl RemoteStore for MemoryRemote {
    async fn create(&self, collection: &str, id: &str, fields: DocumentFields) -> Result<()> {
        self.write(WriteOp::Create {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        })
    }

    async fn update(&self, collection: &str, id: &str, fields: DocumentFields) -> Result<()> {
        self.write(WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.write(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        let mut inner = self.lock();
        if inner.offline {
            return Err(RemoteError::Unavailable {
                reason: "store is offline".to_string(),
            });
        }

        // Stage against a copy so a failing op leaves the store untouched.
        let mut staged = inner.collections.clone();
        let mut touched: Vec<String> = Vec::new();
        for op in ops {
            let collection = op.collection().to_string();
            apply_op(&mut staged, op)?;
            if !touched.contains(&collection) {
                touched.push(collection);
            }
        }

        inner.collections = staged;
        for collection in touched {
            inner.notify(&collection);
        }
        Ok(())
    }

    fn subscribe(&self, query: Query) -> Result<SnapshotStream> {
        let mut inner = self.lock();
        if inner.offline {
            return Err(RemoteError::Unavailable {
                reason: "store is offline".to_string(),
            });
        }

        debug!(collection = %query.collection, filtered = query.assigned_to.is_some(), "subscribe");
        let (sender, receiver) = mpsc::unbounded_channel();

        // Deliver the current state immediately; the receiver cannot have
        // been dropped yet.
        let docs = inner
            .collections
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        let _ = sender.send(snapshot_for(&query, &docs));

        inner.subscribers.push(Subscriber { query, sender });
        Ok(receiver)
    }
}
