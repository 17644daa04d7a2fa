//! Documents, write operations, queries, and snapshots.
//!
//! These are the wire-level building blocks of the remote store contract:
//! the store holds schemaless JSON documents in named collections, accepts
//! [`WriteOp`]s against them, and pushes [`Snapshot`]s of everything
//! matching a [`Query`] whenever matching data changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The field map of a document.
pub type DocumentFields = serde_json::Map<String, Value>;

/// A document as held by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within its collection.
    pub id: String,
    /// The document's fields.
    pub fields: DocumentFields,
}

impl Document {
    /// Creates a document from an id and fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: DocumentFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// A single write against the remote store.
///
/// Writes are applied individually by the single-operation methods of the
/// `RemoteStore` trait or atomically as a group via `batch_write`.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create a document with the given fields.
    Create {
        /// Target collection.
        collection: String,
        /// Document id (client-generated).
        id: String,
        /// Full field set of the new document.
        fields: DocumentFields,
    },
    /// Merge fields into an existing document.
    ///
    /// Only the named fields change; a `null` value clears a field.
    Update {
        /// Target collection.
        collection: String,
        /// Document id.
        id: String,
        /// The changed fields only.
        fields: DocumentFields,
    },
    /// Delete a document. Deleting an absent document is not an error.
    Delete {
        /// Target collection.
        collection: String,
        /// Document id.
        id: String,
    },
}

impl WriteOp {
    /// The collection this write targets.
    #[must_use]
    pub fn collection(&self) -> &str {
        match self {
            Self::Create { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }

    /// The document id this write targets.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Create { id, .. } | Self::Update { id, .. } | Self::Delete { id, .. } => id,
        }
    }
}

/// A subscription query: one collection, optionally filtered by assignee.
///
/// The assignee filter is how role gating reaches the wire: operator
/// sessions subscribe with `assigned_to = Some(user)`, admin sessions
/// subscribe unfiltered.
///
/// # Examples
///
/// ```
/// use tack_remote::Query;
///
/// let all = Query::all("tasks");
/// assert!(all.assigned_to.is_none());
///
/// let mine = Query::assigned("tasks", "alice");
/// assert_eq!(mine.assigned_to.as_deref(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The collection to watch.
    pub collection: String,
    /// If set, only documents whose `assigned_to` field equals this value
    /// are matched.
    pub assigned_to: Option<String>,
}

impl Query {
    /// A query matching every document in a collection.
    #[must_use]
    pub fn all(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            assigned_to: None,
        }
    }

    /// A query matching only documents assigned to the given user.
    #[must_use]
    pub fn assigned(collection: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            assigned_to: Some(user.into()),
        }
    }

    /// Returns `true` if a document with these fields matches the query.
    #[must_use]
    pub fn matches(&self, fields: &DocumentFields) -> bool {
        match &self.assigned_to {
            None => true,
            Some(user) => fields
                .get("assigned_to")
                .and_then(Value::as_str)
                .is_some_and(|assignee| assignee == user),
        }
    }
}

/// A complete, point-in-time listing of every document matching a query.
///
/// The remote store pushes one of these to each subscriber whenever
/// matching data changes; there is no delta encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The collection the snapshot is for.
    pub collection: String,
    /// Every matching document, in the store's iteration order.
    pub docs: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields_with_assignee(user: &str) -> DocumentFields {
        let mut fields = DocumentFields::new();
        fields.insert("assigned_to".to_string(), json!(user));
        fields
    }

    #[test]
    fn unfiltered_query_matches_everything() {
        let query = Query::all("tasks");
        assert!(query.matches(&DocumentFields::new()));
        assert!(query.matches(&fields_with_assignee("alice")));
    }

    #[test]
    fn assignee_query_filters() {
        let query = Query::assigned("tasks", "alice");
        assert!(query.matches(&fields_with_assignee("alice")));
        assert!(!query.matches(&fields_with_assignee("bob")));
        assert!(!query.matches(&DocumentFields::new()));
    }

    #[test]
    fn assignee_query_ignores_non_string_values() {
        let query = Query::assigned("tasks", "alice");
        let mut fields = DocumentFields::new();
        fields.insert("assigned_to".to_string(), json!(42));
        assert!(!query.matches(&fields));
    }

    #[test]
    fn write_op_accessors() {
        let op = WriteOp::Delete {
            collection: "tasks".to_string(),
            id: "t1".to_string(),
        };
        assert_eq!(op.collection(), "tasks");
        assert_eq!(op.id(), "t1");
    }
}
