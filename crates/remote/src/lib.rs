//! Remote document store contract for the tack application.
//!
//! The reconciling store (`tack-store`) does not talk to any concrete
//! database; it talks to the [`RemoteStore`] trait defined here. The
//! contract is small: create/update/delete single documents, apply an
//! atomic batch, and subscribe to a query for a stream of full-collection
//! [`Snapshot`]s.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`store`]: The `RemoteStore` trait and snapshot stream type
//! - [`document`]: Documents, write operations, queries, and snapshots
//! - [`codec`]: Conversions between domain entities and documents
//! - [`timestamp`]: The store's native `{seconds, nanos}` timestamp
//! - [`memory`]: An in-process implementation for tests and demos
//! - [`error`]: Error types for remote operations
//!
//! # Examples
//!
//! ```
//! use tack_remote::{MemoryRemote, Query, RemoteStore, codec};
//! use tack_protocol::{Category, NewTask, Priority, Task};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tack_remote::Result<()> {
//! let remote = MemoryRemote::new();
//!
//! let draft = NewTask::new("Wire up the store", Category::Development, Priority::High);
//! let task = Task::from_new(draft, "alice".to_string()).unwrap();
//! remote
//!     .create("tasks", &task.id.to_string(), codec::task_to_fields(&task))
//!     .await?;
//!
//! let mut snapshots = remote.subscribe(Query::all("tasks"))?;
//! let snapshot = snapshots.recv().await.unwrap();
//! assert_eq!(snapshot.docs.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod memory;
pub mod store;
pub mod timestamp;

// Re-export primary types at crate root for convenience
pub use document::{Document, DocumentFields, Query, Snapshot, WriteOp};
pub use error::{RemoteError, Result};
pub use memory::MemoryRemote;
pub use store::{RemoteStore, SnapshotStream};
pub use timestamp::RemoteTimestamp;
