//! Table adjacency
//!
//! Two tables are neighbours when one sits exactly one footprint away from the
//! other on a single axis and the neighbour has the mergeable footprint. The
//! counters derived here feed the UI only; allocation never reads them.

use std::collections::HashSet;

use shared::models::{DiningTable, Reservation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl TableSide {
    pub const ALL: [TableSide; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// `(row, column)` offset of a neighbour on this side of `table`
    pub fn offset(&self, table: &DiningTable) -> (i32, i32) {
        match self {
            Self::Top => (-table.height, 0),
            Self::Bottom => (table.height, 0),
            Self::Left => (0, -table.width),
            Self::Right => (0, table.width),
        }
    }
}

/// Neighbours of a table, one per occupied side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    pub neighbours: Vec<(TableSide, i64)>,
}

impl Adjacency {
    pub fn count(&self) -> usize {
        self.neighbours.len()
    }

    pub fn sides(&self) -> Vec<TableSide> {
        self.neighbours.iter().map(|(side, _)| *side).collect()
    }

    pub fn table_ids(&self) -> Vec<i64> {
        self.neighbours.iter().map(|(_, id)| *id).collect()
    }
}

fn neighbour_at<'a>(
    table: &DiningTable,
    side: TableSide,
    active: &'a [DiningTable],
) -> Option<&'a DiningTable> {
    let (dr, dc) = side.offset(table);
    let (row, column) = (table.row + dr, table.column + dc);
    active
        .iter()
        .find(|t| t.id != table.id && t.row == row && t.column == column && t.is_mergeable())
}

pub fn adjacent_tables(table: &DiningTable, active: &[DiningTable]) -> Adjacency {
    let neighbours = TableSide::ALL
        .into_iter()
        .filter_map(|side| neighbour_at(table, side, active).map(|n| (side, n.id)))
        .collect();
    Adjacency { neighbours }
}

/// Neighbours that share at least one table-holding reservation with `table`
pub fn adjacent_with_same_reservation(
    table: &DiningTable,
    active: &[DiningTable],
    reservations: &[Reservation],
) -> Adjacency {
    let partners: HashSet<i64> = reservations
        .iter()
        .filter(|r| r.occupies_tables() && r.holds_table(table.id))
        .flat_map(|r| r.tables.iter().map(|t| t.id))
        .filter(|id| *id != table.id)
        .collect();

    if partners.is_empty() {
        return Adjacency::default();
    }

    let mut adjacency = adjacent_tables(table, active);
    adjacency.neighbours.retain(|(_, id)| partners.contains(id));
    adjacency
}

/// Recompute both adjacency counters on every table in place
pub fn refresh_adjacency_counters(tables: &mut [DiningTable], reservations: &[Reservation]) {
    let snapshot = tables.to_vec();
    for table in tables.iter_mut() {
        table.adjacent_count = adjacent_tables(table, &snapshot).count() as u32;
        table.active_reservation_adjacent_count =
            adjacent_with_same_reservation(table, &snapshot, reservations).count() as u32;
    }
}
