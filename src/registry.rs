//! Process-wide session registry.
//!
//! Maps each client connection to its debug session for the lifetime of
//! the connection: inserted on accept, removed on disconnect. This is
//! the only structure shared between connection tasks, and each task
//! only ever touches its own entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Identifier assigned to one client connection.
pub type ConnectionId = u64;

/// Registry of live sessions, keyed by connection identity.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    next_id: AtomicU64,
    sessions: Mutex<HashMap<ConnectionId, String>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection; returns its identifier.
    pub fn insert(&self, peer: String) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(id, peer);
        id
    }

    /// Remove a connection. Returns `true` if it was registered.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .remove(&id)
            .is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .len()
    }
}
