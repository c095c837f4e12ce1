//! Floor occupancy grid

use shared::models::{DiningTable, GridRect};

use crate::core::MAX_GRID_SIDE;

/// Occupancy grid of `rows x columns` cells, each owned by at most one table
#[derive(Debug, Clone)]
pub struct FloorGrid {
    rows: i32,
    columns: i32,
    cells: Vec<Option<i64>>,
}

impl FloorGrid {
    pub fn new(rows: i32, columns: i32) -> Self {
        let rows = rows.clamp(0, MAX_GRID_SIDE);
        let columns = columns.clamp(0, MAX_GRID_SIDE);
        Self {
            rows,
            columns,
            cells: vec![None; (rows * columns) as usize],
        }
    }

    /// Grid with every table already marked
    pub fn from_tables(rows: i32, columns: i32, tables: &[DiningTable]) -> Self {
        let mut grid = Self::new(rows, columns);
        for table in tables {
            grid.mark(table);
        }
        grid
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    fn index(&self, row: i32, column: i32) -> Option<usize> {
        (row >= 0 && row < self.rows && column >= 0 && column < self.columns)
            .then(|| (row * self.columns + column) as usize)
    }

    /// Whole rectangle lies inside the grid
    pub fn fits(&self, rect: &GridRect) -> bool {
        rect.row >= 0
            && rect.column >= 0
            && rect.width > 0
            && rect.height > 0
            && rect.max_row() <= self.rows
            && rect.max_column() <= self.columns
    }

    pub fn owner(&self, row: i32, column: i32) -> Option<i64> {
        self.index(row, column).and_then(|i| self.cells[i])
    }

    /// Every cell of `rect` is inside the grid and empty (or owned by `ignoring`)
    pub fn is_free(&self, rect: &GridRect, ignoring: Option<i64>) -> bool {
        self.fits(rect)
            && rect.cells().all(|(r, c)| match self.owner(r, c) {
                None => true,
                Some(id) => Some(id) == ignoring,
            })
    }

    /// Claim the table's footprint; cells outside the grid are skipped
    pub fn mark(&mut self, table: &DiningTable) {
        let mut skipped = 0;
        for (r, c) in table.footprint().cells() {
            match self.index(r, c) {
                Some(i) => self.cells[i] = Some(table.id),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(
                table_id = table.id,
                skipped_cells = skipped,
                "Table footprint extends beyond the grid"
            );
        }
    }

    /// Release the cells the table currently owns
    pub fn unmark(&mut self, table: &DiningTable) {
        for (r, c) in table.footprint().cells() {
            if let Some(i) = self.index(r, c)
                && self.cells[i] == Some(table.id)
            {
                self.cells[i] = None;
            }
        }
    }

    /// Clamp a top-left position so the table's footprint stays inside the grid
    pub fn clamp(&self, table: &DiningTable, row: i32, column: i32) -> (i32, i32) {
        let max_row = (self.rows - table.height).max(0);
        let max_column = (self.columns - table.width).max(0);
        (row.clamp(0, max_row), column.clamp(0, max_column))
    }
}
