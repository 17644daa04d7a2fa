//! Local entries and the snapshot-merge algorithm.
//!
//! Every locally held entity carries a `confirmed` flag instead of the
//! store keeping a side table of pending ids: an entry is unconfirmed
//! from the moment a local mutation touches it until the remote store
//! acknowledges the corresponding write. The merge algorithm below is the
//! only place the flag is consulted, which makes the reconciliation rule
//! enforceable in one pure function.

use std::collections::HashSet;
use std::hash::Hash;

/// A locally held copy of an entity together with its confirmation state.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntry<T> {
    /// The entity value as the application currently sees it.
    pub value: T,
    /// `false` while a local mutation of this entity has not been
    /// acknowledged by the remote store.
    pub confirmed: bool,
}

impl<T> LocalEntry<T> {
    /// An entry whose value matches the remote store.
    #[must_use]
    pub const fn confirmed(value: T) -> Self {
        Self {
            value,
            confirmed: true,
        }
    }

    /// An entry with an unacknowledged local mutation.
    #[must_use]
    pub const fn pending(value: T) -> Self {
        Self {
            value,
            confirmed: false,
        }
    }
}

/// Merges an incoming snapshot into the local collection.
///
/// The rule, in order:
///
/// 1. Every entity in the snapshot wins unconditionally: the local copy
///    (pending or not) is replaced by the server's version.
/// 2. Unconfirmed local entries *absent* from the snapshot survive; they
///    are in-flight optimistic writes the server has not reflected yet.
/// 3. Confirmed local entries absent from the snapshot are dropped; the
///    server deleted them (or they fell out of the subscribed query).
///
/// The resulting order is snapshot order followed by the surviving
/// pending entries in their previous relative order.
pub fn merge_snapshot<T, K, F>(local: &mut Vec<LocalEntry<T>>, server: Vec<T>, id_of: F)
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let server_ids: HashSet<K> = server.iter().map(&id_of).collect();

    let retained: Vec<LocalEntry<T>> = local
        .drain(..)
        .filter(|entry| !entry.confirmed && !server_ids.contains(&id_of(&entry.value)))
        .collect();

    local.extend(server.into_iter().map(LocalEntry::confirmed));
    local.extend(retained);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        payload: &'static str,
    }

    fn item(id: u32, payload: &'static str) -> Item {
        Item { id, payload }
    }

    #[test]
    fn pending_entry_absent_from_snapshot_survives() {
        let mut local = vec![LocalEntry::pending(item(1, "local"))];

        merge_snapshot(&mut local, vec![item(2, "server")], |i| i.id);

        let ids: Vec<u32> = local.iter().map(|e| e.value.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(!local[1].confirmed);
    }

    #[test]
    fn snapshot_version_supersedes_pending_copy() {
        let mut local = vec![LocalEntry::pending(item(1, "stale local"))];

        merge_snapshot(&mut local, vec![item(1, "authoritative")], |i| i.id);

        assert_eq!(local.len(), 1);
        assert_eq!(local[0].value.payload, "authoritative");
        assert!(local[0].confirmed);
    }

    #[test]
    fn confirmed_entry_absent_from_snapshot_is_dropped() {
        let mut local = vec![LocalEntry::confirmed(item(1, "deleted remotely"))];

        merge_snapshot(&mut local, vec![], |i| i.id);

        assert!(local.is_empty());
    }

    #[test]
    fn snapshot_order_comes_first() {
        let mut local = vec![
            LocalEntry::pending(item(10, "pending a")),
            LocalEntry::confirmed(item(11, "old confirmed")),
            LocalEntry::pending(item(12, "pending b")),
        ];

        merge_snapshot(&mut local, vec![item(1, "s1"), item(2, "s2")], |i| i.id);

        let ids: Vec<u32> = local.iter().map(|e| e.value.id).collect();
        assert_eq!(ids, vec![1, 2, 10, 12]);
    }

    #[test]
    fn empty_snapshot_keeps_only_pending() {
        let mut local = vec![
            LocalEntry::confirmed(item(1, "confirmed")),
            LocalEntry::pending(item(2, "pending")),
        ];

        merge_snapshot(&mut local, vec![], |i| i.id);

        assert_eq!(local.len(), 1);
        assert_eq!(local[0].value.id, 2);
    }
}
