//! Error types for remote store operations.

use thiserror::Error;

/// Errors that can occur when talking to the remote document store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote store could not be reached.
    #[error("remote store unavailable: {reason}")]
    Unavailable {
        /// A description of the outage.
        reason: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {reason}")]
    PermissionDenied {
        /// Why the operation was rejected.
        reason: String,
    },

    /// The targeted document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// The collection that was targeted.
        collection: String,
        /// The document id that was targeted.
        id: String,
    },

    /// A document could not be decoded into a domain type.
    #[error("malformed document {id}: {reason}")]
    Malformed {
        /// The offending document id.
        id: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// A specialized Result type for remote store operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
