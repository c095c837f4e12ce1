//! Interval lock table
//!
//! Records, per table, the time windows for which it has been handed out.
//! Lookups use half-open overlap, removal is exact-match. Nothing here fails:
//! unlocking an interval that was never locked is a no-op, but it is logged
//! and counted in [`LockStats::silent_unlocks`] because it usually means the
//! caller lost track of what it locked.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use shared::models::TimeWindow;

/// Lock table counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockStats {
    pub locks: u64,
    pub unlocks: u64,
    /// Unlock calls that matched no recorded interval
    pub silent_unlocks: u64,
    /// Lock calls rejected because `end <= start`
    pub ignored_locks: u64,
}

#[derive(Debug, Default)]
pub struct IntervalLockTable {
    intervals: HashMap<i64, Vec<TimeWindow>>,
    stats: LockStats,
}

impl IntervalLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&mut self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) {
        match TimeWindow::new(start, end) {
            Some(window) => self.lock_window(table_id, window),
            None => {
                self.stats.ignored_locks += 1;
                tracing::warn!(
                    table_id,
                    start = %start,
                    end = %end,
                    "Ignoring lock with empty window"
                );
            }
        }
    }

    pub fn lock_window(&mut self, table_id: i64, window: TimeWindow) {
        self.intervals.entry(table_id).or_default().push(window);
        self.stats.locks += 1;
        tracing::trace!(table_id, start = %window.start, end = %window.end, "Table locked");
    }

    /// Remove every interval exactly equal to `[start, end)`
    pub fn unlock(&mut self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) {
        self.unlock_window(table_id, TimeWindow { start, end });
    }

    pub fn unlock_window(&mut self, table_id: i64, window: TimeWindow) {
        let removed = match self.intervals.get_mut(&table_id) {
            Some(windows) => {
                let before = windows.len();
                windows.retain(|w| *w != window);
                let removed = before - windows.len();
                if windows.is_empty() {
                    self.intervals.remove(&table_id);
                }
                removed
            }
            None => 0,
        };

        if removed == 0 {
            self.stats.silent_unlocks += 1;
            tracing::warn!(
                table_id,
                start = %window.start,
                end = %window.end,
                "Unlock matched no locked interval"
            );
        } else {
            self.stats.unlocks += removed as u64;
            tracing::trace!(table_id, removed, "Table unlocked");
        }
    }

    /// Any recorded interval of the table overlaps `[start, end)`
    pub fn is_locked(&self, table_id: i64, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let probe = TimeWindow { start, end };
        self.intervals
            .get(&table_id)
            .is_some_and(|windows| windows.iter().any(|w| w.overlaps(&probe)))
    }

    pub fn is_locked_window(&self, table_id: i64, window: &TimeWindow) -> bool {
        self.is_locked(table_id, window.start, window.end)
    }

    pub fn unlock_all(&mut self) {
        let count: usize = self.intervals.values().map(Vec::len).sum();
        self.intervals.clear();
        self.stats.unlocks += count as u64;
        tracing::info!(released = count, "All table locks released");
    }

    pub fn intervals(&self, table_id: i64) -> &[TimeWindow] {
        self.intervals.get(&table_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn locked_table_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn stats(&self) -> LockStats {
        self.stats
    }
}
