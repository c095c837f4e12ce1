//! Dining Table Model

use serde::{Deserialize, Serialize};

use super::grid::GridRect;

/// Edge length (cells) of the footprint that can merge with neighbours
pub const MERGEABLE_SIZE: i32 = 3;

fn default_size() -> i32 {
    MERGEABLE_SIZE
}

fn default_true() -> bool {
    true
}

/// Dining table entity (桌台) placed on the floor grid
///
/// `adjacent_count` and `active_reservation_adjacent_count` are derived UI
/// counters; they are recomputed from the layout and never read back as a
/// source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    pub name: String,
    /// Maximum seating capacity
    pub capacity: u32,
    pub row: i32,
    pub column: i32,
    #[serde(default = "default_size")]
    pub width: i32,
    #[serde(default = "default_size")]
    pub height: i32,
    #[serde(default)]
    pub adjacent_count: u32,
    #[serde(default)]
    pub active_reservation_adjacent_count: u32,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl DiningTable {
    /// Create a table with the standard mergeable footprint
    pub fn new(id: i64, name: impl Into<String>, capacity: u32, row: i32, column: i32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            row,
            column,
            width: MERGEABLE_SIZE,
            height: MERGEABLE_SIZE,
            adjacent_count: 0,
            active_reservation_adjacent_count: 0,
            is_visible: true,
        }
    }

    /// Override the footprint size
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn footprint(&self) -> GridRect {
        GridRect::new(self.row, self.column, self.width, self.height)
    }

    /// Copy of this table moved to another cell
    pub fn at(&self, row: i32, column: i32) -> Self {
        Self {
            row,
            column,
            ..self.clone()
        }
    }

    pub fn is_mergeable(&self) -> bool {
        self.width == MERGEABLE_SIZE && self.height == MERGEABLE_SIZE
    }

    pub fn same_footprint_size(&self, other: &DiningTable) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Tables touching edge to edge at an exact footprint offset
    pub fn is_physically_adjacent_to(&self, other: &DiningTable) -> bool {
        let row_diff = (self.row - other.row).abs();
        let column_diff = (self.column - other.column).abs();
        (row_diff == self.height && column_diff == 0)
            || (row_diff == 0 && column_diff == self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint() {
        let table = DiningTable::new(1, "T1", 2, 1, 14);
        assert_eq!(table.footprint(), GridRect::new(1, 14, 3, 3));
        assert!(table.is_mergeable());
        assert!(!table.clone().with_size(2, 3).is_mergeable());
    }

    #[test]
    fn test_physical_adjacency() {
        let a = DiningTable::new(1, "T1", 2, 1, 1);
        let right = DiningTable::new(2, "T2", 2, 1, 4);
        let below = DiningTable::new(3, "T3", 2, 4, 1);
        let diagonal = DiningTable::new(4, "T4", 2, 4, 4);
        let gap = DiningTable::new(5, "T5", 2, 1, 5);

        assert!(a.is_physically_adjacent_to(&right));
        assert!(a.is_physically_adjacent_to(&below));
        assert!(!a.is_physically_adjacent_to(&diagonal));
        assert!(!a.is_physically_adjacent_to(&gap));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"id":7,"name":"T7","capacity":2,"row":11,"column":1}"#;
        let table: DiningTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.width, 3);
        assert_eq!(table.height, 3);
        assert_eq!(table.adjacent_count, 0);
        assert!(table.is_visible);
    }
}
