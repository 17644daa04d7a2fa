//! The reconciling task/project store for the tack application.
//!
//! This crate is the heart of tack: a locally readable, eventually
//! consistent collection of tasks and projects kept in sync with a remote
//! document store. Mutations apply optimistically and synchronously;
//! remote writes are queued and flushed by a driver; snapshots pushed by
//! the remote store are merged back without clobbering in-flight local
//! writes.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`store`]: The `TaskStore` with every mutation operation
//! - [`local`]: Local entries and the snapshot-merge algorithm
//! - [`sync`]: The subscription state machine and the `SyncDriver`
//! - [`error`]: Error types for store operations
//!
//! # Consistency model
//!
//! Local reads immediately after a local write always observe that write.
//! A snapshot that includes an entity supersedes any local copy of it; a
//! snapshot that omits an entity only removes it if the local copy has
//! been confirmed by the remote store. Remote write failures are logged
//! and absorbed: the local view stays optimistic until a later snapshot
//! corrects it.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tack_config::{Config, Role, Session};
//! use tack_protocol::{Category, NewTask, Priority, TaskStatus};
//! use tack_remote::MemoryRemote;
//! use tack_store::{SyncDriver, TaskStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let remote = Arc::new(MemoryRemote::new());
//! let mut store = TaskStore::new(
//!     &Config::default(),
//!     Session::authenticated("alice", Role::Admin),
//! );
//! let mut driver = SyncDriver::new(Arc::clone(&remote));
//!
//! let draft = NewTask::new("Adopt the store", Category::Development, Priority::High);
//! let id = store.add_task(draft).unwrap();
//! store.update_task_status(id, TaskStatus::InProgress);
//!
//! driver.tick(&mut store).await;
//! assert!(!store.is_pending(id));
//! # }
//! ```

pub mod error;
pub mod local;
pub mod store;
pub mod sync;

// Re-export primary types at crate root for convenience
pub use error::{Result, StoreError};
pub use local::LocalEntry;
pub use store::{RemoteCommand, TaskStore};
pub use sync::{SubscriptionState, SyncDriver};
