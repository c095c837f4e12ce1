//! AllocationManager - reservation book, table locks and per-timeslot caches
//!
//! This module handles:
//! - Table assignment for new and edited reservations
//! - Interval locks for assigned tables
//! - Layout and cluster bookkeeping after every change
//! - Snapshot persistence through a [`FloorStore`]
//!
//! # Assignment Flow
//!
//! ```text
//! assign(reservation, mode)
//!     ├─ 1. Load layout for the reservation's timeslot
//!     ├─ 2. Unlock tables held by the stored version
//!     │     (terminal / waiting list: store without tables, stop)
//!     ├─ 3. Run the assignment engine against the other reservations
//!     ├─ 4. Success: lock tables, attach them, store the reservation
//!     │     Failure: keep the stored version as it was
//!     ├─ 5. Save the layout (propagates forward)
//!     ├─ 6. Rebuild and save clusters when inputs changed
//!     └─ 7. Persist snapshots
//! ```
//!
//! Internal lock order: reservations → locks → layouts → clusters.
//! Persistence failures are logged and never roll back in-memory state.

mod error;
pub use error::*;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use shared::models::{
    CachedCluster, DiningTable, LayoutKey, Reservation, ReservationStatus, ReservationType,
};
use uuid::Uuid;

use crate::assignment::{AssignmentEngine, AssignmentError, AssignmentMode, TableAvailability};
use crate::clusters::{ClusterBuilder, ClusterCache, ClusterStats};
use crate::core::EngineConfig;
use crate::geometry::refresh_adjacency_counters;
use crate::layout::{LayoutCache, LayoutStats, MoveResult};
use crate::locks::{IntervalLockTable, LockStats};
use crate::presence::{NoPresence, SessionPresence};
use crate::storage::{FloorStore, MemoryStore, RedbStore};

struct ClusterState {
    cache: ClusterCache,
    builder: ClusterBuilder,
}

/// Reservation-facing façade over the allocation engine
pub struct AllocationManager {
    engine: AssignmentEngine,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
    locks: RwLock<IntervalLockTable>,
    layouts: Mutex<LayoutCache>,
    clusters: Mutex<ClusterState>,
    store: Arc<dyn FloorStore>,
    presence: Arc<dyn SessionPresence>,
}

impl std::fmt::Debug for AllocationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationManager")
            .field("engine", &self.engine)
            .field("reservations", &self.reservations.read().len())
            .field("store", &"<FloorStore>")
            .field("presence", &"<SessionPresence>")
            .finish()
    }
}

/// Drop the interval locks a reservation holds
fn release_locks(locks: &mut IntervalLockTable, reservation: &Reservation) {
    if !reservation.occupies_tables() {
        return;
    }
    if let Some(window) = reservation.window() {
        for table in &reservation.tables {
            locks.unlock_window(table.id, window);
        }
    }
}

fn acquire_locks(locks: &mut IntervalLockTable, reservation: &Reservation) {
    if !reservation.occupies_tables() {
        return;
    }
    if let Some(window) = reservation.window() {
        for table in &reservation.tables {
            locks.lock_window(table.id, window);
        }
    }
}

/// Timeslots touched by a change, old slot included when an edit moved it
fn affected_keys(key: LayoutKey, previous: Option<&Reservation>) -> Vec<LayoutKey> {
    let mut keys = vec![key];
    if let Some(prev) = previous {
        let old = prev.layout_key();
        if old != key {
            keys.push(old);
        }
    }
    keys
}

impl AllocationManager {
    pub fn new(config: &EngineConfig, store: Arc<dyn FloorStore>) -> Self {
        tracing::info!(
            tables = config.base_tables.len(),
            rows = config.grid_rows,
            columns = config.grid_columns,
            grace_minutes = config.grace_period_minutes,
            "AllocationManager created"
        );
        Self {
            engine: AssignmentEngine::from_config(config),
            reservations: RwLock::new(HashMap::new()),
            locks: RwLock::new(IntervalLockTable::new()),
            layouts: Mutex::new(LayoutCache::new(
                config.base_tables.clone(),
                config.grid_rows,
                config.grid_columns,
            )),
            clusters: Mutex::new(ClusterState {
                cache: ClusterCache::new(config.cluster_cache_capacity),
                builder: ClusterBuilder::new(),
            }),
            store,
            presence: Arc::new(NoPresence),
        }
    }

    /// Engine backed by a [`MemoryStore`]
    pub fn in_memory(config: &EngineConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Open the redb store under the work dir and restore its snapshots
    pub fn open(config: &EngineConfig) -> AllocationResult<Self> {
        let store = RedbStore::open(config.store_path())?;
        let manager = Self::new(config, Arc::new(store));
        manager.restore()?;
        Ok(manager)
    }

    pub fn with_presence(mut self, presence: Arc<dyn SessionPresence>) -> Self {
        self.presence = presence;
        self
    }

    // ========== Reservations ==========

    /// Assign tables to `reservation` and store it
    ///
    /// Re-assigning a stored reservation first releases its old tables, so it
    /// never competes with itself. A reservation that must release tables
    /// (terminal status or waiting list) skips the engine, is stored without
    /// any and yields `AssignmentError::Unknown`. When the engine fails, any
    /// other reservation keeps its previously stored version.
    pub fn assign(
        &self,
        reservation: Reservation,
        mode: AssignmentMode,
    ) -> Result<Vec<DiningTable>, AssignmentError> {
        let mut reservation = reservation;
        let key = reservation.layout_key();
        if self.presence.is_edited_elsewhere(reservation.id) {
            tracing::warn!(
                reservation_id = %reservation.id,
                "Reservation is being edited on another device"
            );
        }
        reservation.manual_override = match mode {
            AssignmentMode::Manual(table_id) => Some(table_id),
            AssignmentMode::Automatic => None,
        };

        let mut book = self.reservations.write();
        let previous = book.get(&reservation.id).cloned();

        let mut locks = self.locks.write();
        if let Some(prev) = &previous {
            release_locks(&mut locks, prev);
        }

        // Canceled / deleted / to-handle / waiting list: stored without tables
        if reservation.must_release_tables() {
            drop(locks);
            tracing::warn!(
                reservation_id = %reservation.id,
                key = %key,
                status = ?reservation.status,
                reservation_type = ?reservation.reservation_type,
                "Reservation cannot hold tables, stored unassigned"
            );
            reservation.tables.clear();
            reservation.touch();
            self.persist_reservation(&reservation);
            book.insert(reservation.id, reservation);

            let mut layouts = self.layouts.lock();
            self.rebuild_clusters(&affected_keys(key, previous.as_ref()), &book, &mut layouts);
            return Err(AssignmentError::Unknown);
        }

        let tables = self.layouts.lock().load(key);
        let others: Vec<Reservation> = book
            .values()
            .filter(|r| r.id != reservation.id)
            .cloned()
            .collect();
        let result = self
            .engine
            .assign(&reservation, &tables, &others, &locks, mode);

        match &result {
            Ok(assigned) => {
                reservation.tables = assigned.clone();
                reservation.touch();
                acquire_locks(&mut locks, &reservation);
                tracing::info!(
                    reservation_id = %reservation.id,
                    key = %key,
                    tables = ?reservation.table_ids(),
                    persons = reservation.number_of_persons,
                    "Tables assigned"
                );
                self.persist_reservation(&reservation);
                book.insert(reservation.id, reservation);
            }
            Err(e) => {
                tracing::warn!(
                    reservation_id = %reservation.id,
                    key = %key,
                    error = %e,
                    "Table assignment failed"
                );
                if let Some(prev) = &previous {
                    acquire_locks(&mut locks, prev);
                }
            }
        }
        drop(locks);

        let mut layouts = self.layouts.lock();
        layouts.save(key, tables);
        self.rebuild_clusters(&affected_keys(key, previous.as_ref()), &book, &mut layouts);
        self.persist_layouts(&layouts);

        result
    }

    /// Store a reservation that legitimately holds no tables
    pub fn store_unassigned(&self, reservation: Reservation) -> AllocationResult<Reservation> {
        if !reservation.must_release_tables() {
            return Err(AllocationError::TablesRequired(reservation.id));
        }

        let mut reservation = reservation;
        let mut book = self.reservations.write();
        let previous = book.get(&reservation.id).cloned();
        if let Some(prev) = &previous {
            release_locks(&mut self.locks.write(), prev);
        }

        reservation.tables.clear();
        reservation.manual_override = None;
        reservation.touch();
        self.persist_reservation(&reservation);
        book.insert(reservation.id, reservation.clone());
        tracing::info!(
            reservation_id = %reservation.id,
            status = ?reservation.status,
            reservation_type = ?reservation.reservation_type,
            "Reservation stored without tables"
        );

        let keys = affected_keys(reservation.layout_key(), previous.as_ref());
        let mut layouts = self.layouts.lock();
        self.rebuild_clusters(&keys, &book, &mut layouts);
        Ok(reservation)
    }

    /// Move a reservation through its status state machine
    ///
    /// Leaving the table-holding states unlocks the tables; terminal states
    /// also detach them.
    pub fn update_status(&self, id: Uuid, status: ReservationStatus) -> AllocationResult<Reservation> {
        let mut book = self.reservations.write();
        let reservation = book
            .get_mut(&id)
            .ok_or(AllocationError::ReservationNotFound(id))?;

        let from = reservation.status;
        if !from.can_transition_to(status) {
            tracing::warn!(reservation_id = %id, ?from, to = ?status, "Rejected status transition");
            return Err(AllocationError::InvalidTransition { from, to: status });
        }

        let before = reservation.clone();
        reservation.status = status;
        if before.occupies_tables() && !reservation.occupies_tables() {
            release_locks(&mut self.locks.write(), &before);
        }
        if reservation.must_release_tables() {
            reservation.tables.clear();
            reservation.manual_override = None;
        }
        reservation.touch();
        let updated = reservation.clone();

        self.persist_reservation(&updated);
        tracing::info!(reservation_id = %id, ?from, to = ?status, "Reservation status updated");

        let mut layouts = self.layouts.lock();
        self.rebuild_clusters(&[updated.layout_key()], &book, &mut layouts);
        Ok(updated)
    }

    /// Seat a waiting-list reservation: automatic assignment as a pending
    /// in-advance booking. On failure it stays on the waiting list.
    pub fn confirm(&self, id: Uuid) -> AllocationResult<Vec<DiningTable>> {
        let current = self
            .reservation(id)
            .ok_or(AllocationError::ReservationNotFound(id))?;
        if !current.is_waiting_list() {
            return Err(AllocationError::NotWaitingList(id));
        }

        let candidate = current
            .with_type(ReservationType::InAdvance)
            .with_status(ReservationStatus::Pending);
        let tables = self.assign(candidate, AssignmentMode::Automatic)?;
        tracing::info!(reservation_id = %id, "Waiting-list reservation confirmed");
        Ok(tables)
    }

    /// Unlock and detach every table of a reservation, keeping its status
    pub fn release(&self, id: Uuid) -> AllocationResult<Reservation> {
        let mut book = self.reservations.write();
        let reservation = book
            .get_mut(&id)
            .ok_or(AllocationError::ReservationNotFound(id))?;

        release_locks(&mut self.locks.write(), reservation);
        let released = reservation.table_ids();
        reservation.tables.clear();
        reservation.manual_override = None;
        reservation.touch();
        let updated = reservation.clone();

        self.persist_reservation(&updated);
        tracing::info!(reservation_id = %id, tables = ?released, "Tables released");

        let mut layouts = self.layouts.lock();
        self.rebuild_clusters(&[updated.layout_key()], &book, &mut layouts);
        Ok(updated)
    }

    pub fn reservation(&self, id: Uuid) -> Option<Reservation> {
        self.reservations.read().get(&id).cloned()
    }

    /// Reservations of one timeslot, by start time
    pub fn reservations_for(&self, key: LayoutKey) -> Vec<Reservation> {
        let mut list: Vec<Reservation> = self
            .reservations
            .read()
            .values()
            .filter(|r| r.layout_key() == key)
            .cloned()
            .collect();
        list.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.name.cmp(&b.name))
        });
        list
    }

    /// Tables the reservation could use, its own tables included
    pub fn available_tables(&self, id: Uuid) -> AllocationResult<Vec<TableAvailability>> {
        let book = self.reservations.read();
        let reservation = book
            .get(&id)
            .ok_or(AllocationError::ReservationNotFound(id))?;
        let tables = self.layouts.lock().load(reservation.layout_key());
        let all: Vec<Reservation> = book.values().cloned().collect();
        Ok(self.engine.available_tables(reservation, &tables, &all))
    }

    /// Advisory only; never blocks an operation
    pub fn is_edited_elsewhere(&self, id: Uuid) -> bool {
        self.presence.is_edited_elsewhere(id)
    }

    // ========== Layouts ==========

    pub fn load_layout(&self, key: LayoutKey) -> Vec<DiningTable> {
        self.layouts.lock().load(key)
    }

    pub fn save_layout(&self, key: LayoutKey, tables: Vec<DiningTable>) {
        let book = self.reservations.read();
        let mut layouts = self.layouts.lock();
        layouts.save(key, tables);
        self.rebuild_clusters(&[key], &book, &mut layouts);
        self.persist_layouts(&layouts);
    }

    pub fn reset_layout(&self, key: LayoutKey) -> Vec<DiningTable> {
        let book = self.reservations.read();
        let mut layouts = self.layouts.lock();
        let tables = layouts.reset(key);
        self.rebuild_clusters(&[key], &book, &mut layouts);
        self.persist_layouts(&layouts);
        tables
    }

    pub fn move_table(&self, key: LayoutKey, table_id: i64, row: i32, column: i32) -> MoveResult {
        let book = self.reservations.read();
        let mut layouts = self.layouts.lock();
        let result = layouts.move_table(key, table_id, row, column);
        if let MoveResult::Move { .. } = result {
            self.rebuild_clusters(&[key], &book, &mut layouts);
            self.persist_layouts(&layouts);
        }
        result
    }

    /// Layout of `key` with both adjacency counters recomputed
    ///
    /// The counters are derived data, so the stored layout is left untouched.
    pub fn refresh_adjacency(&self, key: LayoutKey) -> Vec<DiningTable> {
        let book = self.reservations.read();
        let mut tables = self.layouts.lock().load(key);
        let active: Vec<Reservation> = book
            .values()
            .filter(|r| r.layout_key() == key && r.occupies_tables())
            .cloned()
            .collect();
        refresh_adjacency_counters(&mut tables, &active);
        tables
    }

    // ========== Locks ==========

    pub fn is_table_locked(&self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.locks.read().is_locked(table_id, start, end)
    }

    pub fn lock_table(&self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) {
        self.locks.write().lock(table_id, start, end);
    }

    pub fn unlock_table(&self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) {
        self.locks.write().unlock(table_id, start, end);
    }

    pub fn unlock_all_tables(&self) {
        self.locks.write().unlock_all();
    }

    // ========== Clusters ==========

    pub fn load_clusters(&self, key: LayoutKey) -> Vec<CachedCluster> {
        self.clusters.lock().cache.load(key)
    }

    pub fn save_clusters(&self, key: LayoutKey, clusters: Vec<CachedCluster>) {
        let mut state = self.clusters.lock();
        state.cache.save(key, clusters);
        self.persist_clusters(&state.cache);
    }

    /// Clear the clusters at `key`; the next change there rebuilds them
    pub fn reset_clusters(&self, key: LayoutKey) {
        let mut state = self.clusters.lock();
        state.cache.reset(key);
        state.builder.invalidate(&key);
        self.persist_clusters(&state.cache);
    }

    /// Rebuild clusters for `keys` whose layout or assignments changed
    fn rebuild_clusters(
        &self,
        keys: &[LayoutKey],
        book: &HashMap<Uuid, Reservation>,
        layouts: &mut LayoutCache,
    ) {
        let mut state = self.clusters.lock();
        let mut changed = false;
        for &key in keys {
            let layout = layouts.load(key);
            let slot: Vec<Reservation> = book
                .values()
                .filter(|r| r.layout_key() == key)
                .cloned()
                .collect();

            // Evicted or inherited entries must be rebuilt regardless of signature
            if !state.cache.provenance(&key).is_some_and(|p| p.is_explicit()) {
                state.builder.invalidate(&key);
            }
            if let Some(clusters) = state.builder.rebuild_if_needed(key, &layout, &slot) {
                tracing::debug!(key = %key, clusters = clusters.len(), "Clusters rebuilt");
                state.cache.save(key, clusters);
                changed = true;
            }
        }
        if changed {
            self.persist_clusters(&state.cache);
        }
    }

    // ========== Persistence ==========

    /// Reload reservations and caches from the store, re-locking the tables
    /// of every table-holding reservation
    pub fn restore(&self) -> AllocationResult<()> {
        let reservations = self.store.load_reservations()?;
        let layout_entries = self.store.load_layouts()?;
        let cluster_entries = self.store.load_clusters()?;

        let mut book = self.reservations.write();
        let mut locks = self.locks.write();
        book.clear();
        locks.unlock_all();
        for reservation in reservations {
            acquire_locks(&mut locks, &reservation);
            book.insert(reservation.id, reservation);
        }

        self.layouts.lock().restore(layout_entries);
        let mut state = self.clusters.lock();
        state.cache.restore(cluster_entries);
        state.builder = ClusterBuilder::new();

        tracing::info!(
            reservations = book.len(),
            locked_tables = locks.locked_table_count(),
            "Allocation state restored"
        );
        Ok(())
    }

    fn persist_reservation(&self, reservation: &Reservation) {
        if let Err(e) = self.store.store_reservation(reservation) {
            tracing::error!(reservation_id = %reservation.id, error = %e, "Failed to persist reservation");
        }
    }

    fn persist_layouts(&self, layouts: &LayoutCache) {
        if let Err(e) = self.store.store_layouts(&layouts.entries()) {
            tracing::error!(error = %e, "Failed to persist layouts");
        }
    }

    fn persist_clusters(&self, clusters: &ClusterCache) {
        if let Err(e) = self.store.store_clusters(&clusters.entries()) {
            tracing::error!(error = %e, "Failed to persist clusters");
        }
    }

    // ========== Stats ==========

    pub fn lock_stats(&self) -> LockStats {
        self.locks.read().stats()
    }

    pub fn layout_stats(&self) -> LayoutStats {
        self.layouts.lock().stats()
    }

    pub fn cluster_stats(&self) -> ClusterStats {
        self.clusters.lock().cache.stats()
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.read().len()
    }
}

#[cfg(test)]
mod tests;
