//! Layout cache
//!
//! One table configuration per timeslot.
//!
//! ```text
//! load(key)
//!     ├─ exact entry            → return it
//!     ├─ closest prior entry    → copy as inherited, return it
//!     └─ nothing before         → seed with base, return it
//!
//! save(key, tables)
//!     ├─ write explicit entry
//!     └─ propagate forward through inherited entries, stop at explicit
//! ```

use shared::models::{DiningTable, LayoutKey};

use crate::geometry::{FloorGrid, tables_intersect};
use crate::timeline::{Entry, Provenance, Timeline};

/// Layout cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub hits: u64,
    /// Misses served by copying the closest prior entry
    pub prior_fallbacks: u64,
    /// Misses served by seeding the base configuration
    pub base_seeds: u64,
    pub saves: u64,
    /// Later entries overwritten by forward propagation
    pub propagated: u64,
}

/// Outcome of a table move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// Committed at the (clamped) position
    Move { row: i32, column: i32 },
    Invalid,
}

#[derive(Debug)]
pub struct LayoutCache {
    base: Vec<DiningTable>,
    rows: i32,
    columns: i32,
    timeline: Timeline<Vec<DiningTable>>,
    stats: LayoutStats,
}

fn same_tables(tables: &Vec<DiningTable>, _key: LayoutKey) -> Vec<DiningTable> {
    tables.clone()
}

impl LayoutCache {
    pub fn new(base: Vec<DiningTable>, rows: i32, columns: i32) -> Self {
        Self {
            base,
            rows,
            columns,
            timeline: Timeline::new(),
            stats: LayoutStats::default(),
        }
    }

    pub fn base(&self) -> &[DiningTable] {
        &self.base
    }

    pub fn grid_size(&self) -> (i32, i32) {
        (self.rows, self.columns)
    }

    pub fn stats(&self) -> LayoutStats {
        self.stats
    }

    pub fn exists(&self, key: &LayoutKey) -> bool {
        self.timeline.contains(key)
    }

    pub fn provenance(&self, key: &LayoutKey) -> Option<Provenance> {
        self.timeline.get(key).map(|e| e.provenance)
    }

    /// Cached tables without any fallback
    pub fn peek(&self, key: &LayoutKey) -> Option<&[DiningTable]> {
        self.timeline.get(key).map(|e| e.value.as_slice())
    }

    /// Tables for `key`, resolving misses through closest prior then base
    pub fn load(&mut self, key: LayoutKey) -> Vec<DiningTable> {
        if let Some(entry) = self.timeline.get(&key) {
            self.stats.hits += 1;
            return entry.value.clone();
        }

        if let Some(prior) = self.timeline.inherit_from_prior(key, same_tables) {
            self.stats.prior_fallbacks += 1;
            tracing::debug!(key = %key, from = %prior, "Layout miss, copied closest prior");
        } else {
            self.stats.base_seeds += 1;
            self.timeline.insert_inherited(key, self.base.clone(), None);
            tracing::info!(key = %key, "Layout miss, seeded base configuration");
        }

        self.peek(&key).map(<[DiningTable]>::to_vec).unwrap_or_default()
    }

    /// Explicitly store `tables` at `key` and propagate forward
    pub fn save(&mut self, key: LayoutKey, tables: Vec<DiningTable>) {
        let propagated = self.timeline.write_explicit(key, tables, same_tables);
        self.stats.saves += 1;
        self.stats.propagated += propagated.len() as u64;
        tracing::debug!(
            key = %key,
            propagated = propagated.len(),
            "Layout saved"
        );
    }

    /// Explicitly store the base configuration at `key`
    pub fn reset(&mut self, key: LayoutKey) -> Vec<DiningTable> {
        let base = self.base.clone();
        self.save(key, base.clone());
        tracing::info!(key = %key, "Layout reset to base configuration");
        base
    }

    /// In bounds and clear of every other table
    pub fn can_place(&self, tables: &[DiningTable], candidate: &DiningTable) -> bool {
        let grid = FloorGrid::new(self.rows, self.columns);
        grid.fits(&candidate.footprint())
            && !tables
                .iter()
                .any(|t| t.id != candidate.id && tables_intersect(t, candidate))
    }

    /// Move a table within the layout at `key`
    ///
    /// The position is clamped to the grid. On success the layout is saved
    /// explicitly (with propagation); otherwise nothing changes.
    pub fn move_table(&mut self, key: LayoutKey, table_id: i64, row: i32, column: i32) -> MoveResult {
        let mut tables = self.load(key);
        let Some(index) = tables.iter().position(|t| t.id == table_id) else {
            tracing::warn!(key = %key, table_id, "Move of unknown table");
            return MoveResult::Invalid;
        };

        let mut grid = FloorGrid::from_tables(self.rows, self.columns, &tables);
        let current = tables[index].clone();
        let (row, column) = grid.clamp(&current, row, column);
        let candidate = current.at(row, column);

        // Vacate, validate, then commit or revert
        grid.unmark(&current);
        let placeable = grid.is_free(&candidate.footprint(), None)
            && self.can_place(&tables, &candidate);
        if !placeable {
            grid.mark(&current);
            tracing::debug!(key = %key, table_id, row, column, "Table move rejected");
            return MoveResult::Invalid;
        }

        tables[index] = candidate;
        self.save(key, tables);
        tracing::info!(key = %key, table_id, row, column, "Table moved");
        MoveResult::Move { row, column }
    }

    /// Snapshot of every entry, ordered by key
    pub fn entries(&self) -> Vec<(LayoutKey, Entry<Vec<DiningTable>>)> {
        self.timeline.iter().map(|(k, e)| (*k, e.clone())).collect()
    }

    /// Replace the cache content, e.g. from persisted entries
    pub fn restore(&mut self, entries: Vec<(LayoutKey, Entry<Vec<DiningTable>>)>) {
        let count = entries.len();
        self.timeline.replace_all(entries);
        tracing::info!(entries = count, "Layout cache restored");
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}
