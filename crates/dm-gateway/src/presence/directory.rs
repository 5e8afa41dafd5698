//! Presence directory
//!
//! Keyed by username. Each entry is written under its `DashMap` shard lock,
//! so readers never observe a half-written record and writers to different
//! usernames do not contend.

use super::PresenceRecord;
use crate::connection::ConnectionId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Outcome of registering a connection for a username
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// The username was not online before
    NewPresence,
    /// The username was already online; its handle now points at the new connection
    Reconnection { previous: ConnectionId },
}

/// Live registry of online identities
#[derive(Debug, Default)]
pub struct PresenceDirectory {
    entries: DashMap<String, PresenceRecord>,
}

impl PresenceDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert the record, or point an existing entry at the new connection
    ///
    /// An existing entry keeps every field but `connection_id`.
    pub fn upsert(&self, record: PresenceRecord) -> PresenceTransition {
        match self.entries.entry(record.username.clone()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get_mut();
                let previous = current.connection_id;
                current.connection_id = record.connection_id;
                PresenceTransition::Reconnection { previous }
            }
            Entry::Vacant(entry) => {
                entry.insert(record);
                PresenceTransition::NewPresence
            }
        }
    }

    /// Remove the entry for `username`; absent keys are a no-op
    pub fn remove(&self, username: &str) -> Option<PresenceRecord> {
        self.entries.remove(username).map(|(_, record)| record)
    }

    /// Usernames online at call time
    pub fn snapshot_keys(&self) -> HashSet<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    /// Connection handle of an online user
    pub fn find_by_username(&self, username: &str) -> Option<ConnectionId> {
        self.entries.get(username).map(|r| r.connection_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
