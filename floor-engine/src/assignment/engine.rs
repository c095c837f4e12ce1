//! Table assignment engine
//!
//! # Strategies
//!
//! ```text
//! Manual(table)
//!     ├─ table must exist                       → TableNotFound
//!     ├─ table must be free (lock / occupancy)  → TableLocked
//!     ├─ walk preference order from the table   → contiguous block
//!     └─ forced table + any usable table        → fallback
//!
//! Automatic
//!     ├─ drop locked tables                     → NoTablesLeft if none remain
//!     ├─ fill free tables in preference order   → contiguous block
//!     └─ fill over the whole layout             → fallback
//! ```
//!
//! "Contiguous" means adjacent in the preference order, never on the grid.
//! The engine is pure: it reads the lock table and reservation set but never
//! writes them.

use chrono::Duration;
use shared::models::{DiningTable, Reservation, TimeWindow};

use super::error::AssignmentError;
use crate::core::{EngineConfig, MAX_GRACE_MINUTES};
use crate::locks::IntervalLockTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMode {
    /// The user forced this table id
    Manual(i64),
    Automatic,
}

/// A table that can be offered to a reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAvailability {
    pub table: DiningTable,
    pub is_currently_assigned: bool,
}

#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    order: Vec<String>,
    grace: Duration,
}

impl AssignmentEngine {
    pub fn new(order: Vec<String>, grace_minutes: i64) -> Self {
        Self {
            order,
            grace: Duration::minutes(grace_minutes.clamp(0, MAX_GRACE_MINUTES)),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.table_assignment_order.clone(),
            config.grace_period_minutes,
        )
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Listed tables first in list order, the rest by id
    pub fn sort_by_preference(&self, tables: &[DiningTable]) -> Vec<DiningTable> {
        let mut sorted = tables.to_vec();
        sorted.sort_by_key(|t| {
            let rank = self
                .order
                .iter()
                .position(|name| *name == t.name)
                .unwrap_or(usize::MAX);
            (rank, t.id)
        });
        sorted
    }

    /// Another table-holding reservation on the same date uses the table
    /// within `window`, counting the grace period after its end
    pub fn is_occupied(
        &self,
        table_id: i64,
        reservation: &Reservation,
        window: &TimeWindow,
        reservations: &[Reservation],
    ) -> bool {
        reservations.iter().any(|other| {
            if other.id == reservation.id
                || !other.occupies_tables()
                || other.date != reservation.date
                || !other.holds_table(table_id)
            {
                return false;
            }
            match other.window() {
                Some(w) => w.start < window.end && window.start < w.end + self.grace,
                None => {
                    tracing::warn!(
                        reservation_id = %other.id,
                        table_id,
                        "Ignoring table-holding reservation with an empty window"
                    );
                    false
                }
            }
        })
    }

    /// Propose tables for `reservation`
    pub fn assign(
        &self,
        reservation: &Reservation,
        tables: &[DiningTable],
        reservations: &[Reservation],
        locks: &IntervalLockTable,
        mode: AssignmentMode,
    ) -> Result<Vec<DiningTable>, AssignmentError> {
        let window = reservation.window().ok_or_else(|| {
            tracing::warn!(reservation_id = %reservation.id, "Reservation window is empty");
            AssignmentError::Unknown
        })?;
        if reservation.number_of_persons == 0 {
            tracing::warn!(reservation_id = %reservation.id, "Reservation has no guests");
            return Err(AssignmentError::Unknown);
        }
        if tables.is_empty() {
            return Err(AssignmentError::NoTablesLeft);
        }

        let ordered = self.sort_by_preference(tables);
        let result = match mode {
            AssignmentMode::Manual(table_id) => {
                self.assign_manual(reservation, &window, &ordered, reservations, locks, table_id)
            }
            AssignmentMode::Automatic => {
                self.assign_automatic(reservation, &window, &ordered, reservations, locks)
            }
        };

        match &result {
            Ok(assigned) => tracing::debug!(
                reservation_id = %reservation.id,
                mode = ?mode,
                tables = ?assigned.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                "Tables assigned"
            ),
            Err(e) => tracing::debug!(
                reservation_id = %reservation.id,
                mode = ?mode,
                error = %e,
                "Table assignment failed"
            ),
        }
        result
    }

    /// A forced table held by another reservation is `TableLocked`, whether
    /// an interval lock or only overlapping occupancy blocks it.
    fn assign_manual(
        &self,
        reservation: &Reservation,
        window: &TimeWindow,
        ordered: &[DiningTable],
        reservations: &[Reservation],
        locks: &IntervalLockTable,
        table_id: i64,
    ) -> Result<Vec<DiningTable>, AssignmentError> {
        let start = ordered
            .iter()
            .position(|t| t.id == table_id)
            .ok_or(AssignmentError::TableNotFound)?;
        let forced = &ordered[start];

        let usable = |t: &DiningTable| {
            !self.is_occupied(t.id, reservation, window, reservations)
                && (reservation.holds_table(t.id) || !locks.is_locked_window(t.id, window))
        };
        if !usable(forced) {
            return Err(AssignmentError::TableLocked);
        }

        let need = reservation.number_of_persons;

        if let Some(block) = fill(ordered[start..].iter().filter(|t| usable(*t)), need) {
            return Ok(block);
        }

        tracing::debug!(
            reservation_id = %reservation.id,
            table_id,
            "No contiguous block from forced table, falling back"
        );
        let others = ordered.iter().filter(|t| t.id != table_id && usable(*t));
        fill(std::iter::once(forced).chain(others), need).ok_or(AssignmentError::InsufficientTables)
    }

    fn assign_automatic(
        &self,
        reservation: &Reservation,
        window: &TimeWindow,
        ordered: &[DiningTable],
        reservations: &[Reservation],
        locks: &IntervalLockTable,
    ) -> Result<Vec<DiningTable>, AssignmentError> {
        let unlocked: Vec<&DiningTable> = ordered
            .iter()
            .filter(|t| !locks.is_locked_window(t.id, window))
            .collect();
        if unlocked.is_empty() {
            return Err(AssignmentError::NoTablesLeft);
        }

        let free = |t: &&DiningTable| !self.is_occupied(t.id, reservation, window, reservations);
        let need = reservation.number_of_persons;

        if let Some(block) = fill(unlocked.into_iter().filter(free), need) {
            return Ok(block);
        }

        tracing::debug!(
            reservation_id = %reservation.id,
            "No contiguous block among unlocked tables, filling over the whole layout"
        );
        fill(ordered.iter().filter(free), need).ok_or(AssignmentError::InsufficientTables)
    }

    /// Tables free for the reservation's window or already assigned to it
    pub fn available_tables(
        &self,
        reservation: &Reservation,
        tables: &[DiningTable],
        reservations: &[Reservation],
    ) -> Vec<TableAvailability> {
        let Some(window) = reservation.window() else {
            return Vec::new();
        };
        self.sort_by_preference(tables)
            .into_iter()
            .filter_map(|table| {
                let is_currently_assigned = reservation.holds_table(table.id);
                let occupied = self.is_occupied(table.id, reservation, &window, reservations);
                (!occupied || is_currently_assigned).then_some(TableAvailability {
                    table,
                    is_currently_assigned,
                })
            })
            .collect()
    }
}

/// Take tables in iteration order until their capacity covers `need`
fn fill<'a>(
    candidates: impl Iterator<Item = &'a DiningTable>,
    need: u32,
) -> Option<Vec<DiningTable>> {
    let mut picked = Vec::new();
    let mut capacity = 0;
    for table in candidates {
        picked.push(table.clone());
        capacity += table.capacity;
        if capacity >= need {
            return Some(picked);
        }
    }
    None
}
