//! The remote document store contract.
//!
//! This trait is the seam between the reconciling store and whatever
//! actually persists documents. Implementations are expected to be cheap
//! to share (`&self` methods) and to push a fresh [`Snapshot`] to every
//! live subscriber whenever data matching its query changes, including
//! changes caused by this client's own writes.

use std::future::Future;

use tokio::sync::mpsc;

use crate::document::{DocumentFields, Query, Snapshot, WriteOp};
use crate::error::Result;

/// The receiving end of a snapshot subscription.
///
/// Dropping the receiver detaches the subscription; the backend prunes
/// disconnected subscribers on its next delivery attempt.
pub type SnapshotStream = mpsc::UnboundedReceiver<Snapshot>;

/// A remote document store.
///
/// Write methods are fallible but callers in this codebase treat them as
/// best-effort: failures are logged and reconciliation is left to the
/// next snapshot (see `tack-store`).
pub trait RemoteStore {
    /// Creates (or overwrites) a document.
    fn create(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Merges fields into an existing document.
    ///
    /// A `null` field value clears that field.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: DocumentFields,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Deletes a document. Deleting an absent document succeeds.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Applies a group of writes atomically: either every operation takes
    /// effect or none does.
    fn batch_write(&self, ops: Vec<WriteOp>) -> impl Future<Output = Result<()>> + Send;

    /// Subscribes to a query.
    ///
    /// On success the stream yields an initial snapshot of the current
    /// matching documents, then a fresh snapshot after every change to
    /// matching data.
    ///
    /// # Errors
    ///
    /// Fails if the subscription cannot be established (for example, the
    /// backend is unreachable).
    fn subscribe(&self, query: Query) -> Result<SnapshotStream>;
}
