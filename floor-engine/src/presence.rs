//! Session presence
//!
//! Tells whether another device currently has a reservation open for editing.
//! The answer is advisory: callers may warn the user, but the engine never
//! blocks on it or turns it into a lock.

use std::collections::HashSet;

use parking_lot::RwLock;
use uuid::Uuid;

pub trait SessionPresence: Send + Sync {
    fn is_edited_elsewhere(&self, reservation_id: Uuid) -> bool;
}

/// Single-device deployments: nobody else is ever editing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPresence;

impl SessionPresence for NoPresence {
    fn is_edited_elsewhere(&self, _reservation_id: Uuid) -> bool {
        false
    }
}

/// Presence flags fed by an external sync channel
#[derive(Debug, Default)]
pub struct SharedPresence {
    editing: RwLock<HashSet<Uuid>>,
}

impl SharedPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_editing(&self, reservation_id: Uuid) {
        self.editing.write().insert(reservation_id);
    }

    pub fn end_editing(&self, reservation_id: Uuid) {
        self.editing.write().remove(&reservation_id);
    }
}

impl SessionPresence for SharedPresence {
    fn is_edited_elsewhere(&self, reservation_id: Uuid) -> bool {
        self.editing.read().contains(&reservation_id)
    }
}
