//! Floor geometry - occupancy grid, adjacency and layout helpers

mod adjacency;
mod grid;

pub use adjacency::*;
pub use grid::FloorGrid;

use shared::models::DiningTable;

/// Footprints overlap (touching edges do not count)
pub fn tables_intersect(a: &DiningTable, b: &DiningTable) -> bool {
    a.footprint().intersects(&b.footprint())
}

/// Stable `id_row_col` signature of a layout, independent of table order
pub fn layout_signature(tables: &[DiningTable]) -> String {
    let mut parts: Vec<(i64, i32, i32)> = tables.iter().map(|t| (t.id, t.row, t.column)).collect();
    parts.sort_unstable();
    parts
        .iter()
        .map(|(id, row, column)| format!("{}_{}_{}", id, row, column))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_intersect() {
        let a = DiningTable::new(1, "A", 2, 0, 0);
        assert!(tables_intersect(&a, &DiningTable::new(2, "B", 2, 2, 2)));
        assert!(!tables_intersect(&a, &DiningTable::new(3, "C", 2, 0, 3)));
    }

    #[test]
    fn test_layout_signature_ignores_order() {
        let a = DiningTable::new(1, "A", 2, 0, 0);
        let b = DiningTable::new(2, "B", 2, 0, 3);
        assert_eq!(
            layout_signature(&[a.clone(), b.clone()]),
            layout_signature(&[b.clone(), a.clone()])
        );
        assert_eq!(layout_signature(&[a.clone(), b.clone()]), "1_0_0|2_0_3");
        assert_ne!(layout_signature(&[a.at(1, 0), b]), "1_0_0|2_0_3");
    }
}
