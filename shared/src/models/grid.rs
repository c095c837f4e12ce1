//! Grid Geometry Model

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle on the floor grid, in cells
///
/// `row`/`column` address the top-left cell; the rectangle covers
/// `[row, row + height) x [column, column + width)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    pub row: i32,
    pub column: i32,
    pub width: i32,
    pub height: i32,
}

impl GridRect {
    pub fn new(row: i32, column: i32, width: i32, height: i32) -> Self {
        Self {
            row,
            column,
            width,
            height,
        }
    }

    pub fn max_row(&self) -> i32 {
        self.row + self.height
    }

    pub fn max_column(&self) -> i32 {
        self.column + self.width
    }

    /// Half-open rectangle intersection; touching edges do not intersect
    pub fn intersects(&self, other: &GridRect) -> bool {
        !(self.max_column() <= other.column
            || self.column >= other.max_column()
            || self.max_row() <= other.row
            || self.row >= other.max_row())
    }

    pub fn contains_cell(&self, row: i32, column: i32) -> bool {
        row >= self.row && row < self.max_row() && column >= self.column && column < self.max_column()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &GridRect) -> GridRect {
        let row = self.row.min(other.row);
        let column = self.column.min(other.column);
        GridRect {
            row,
            column,
            width: self.max_column().max(other.max_column()) - column,
            height: self.max_row().max(other.max_row()) - row,
        }
    }

    /// Every `(row, column)` cell covered by the rectangle
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.row..self.max_row())
            .flat_map(move |r| (self.column..self.max_column()).map(move |c| (r, c)))
    }
}
