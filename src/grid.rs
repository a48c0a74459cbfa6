//! The fixed logical grid every display is divided into.
//!
//! A display's usable area is split into [`COLS`] × [`ROWS`] equal cells.
//! A [`GridCell`] names a rectangular block of those cells by its top-left
//! cell and its span along each axis.  Zones, cycling and drag-snapping all
//! speak in grid cells; only [`geometry`](crate::geometry) turns them into
//! pixels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of grid columns.
pub const COLS: u32 = 12;
/// Number of grid rows.
pub const ROWS: u32 = 6;

/// One of the two grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal: `col` / `col_span`.
    Column,
    /// Vertical: `row` / `row_span`.
    Row,
}

impl Axis {
    /// The other axis.
    pub fn other(self) -> Self {
        match self {
            Axis::Column => Axis::Row,
            Axis::Row => Axis::Column,
        }
    }

    /// Number of grid cells along this axis.
    pub fn cell_count(self) -> u32 {
        match self {
            Axis::Column => COLS,
            Axis::Row => ROWS,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => write!(f, "column"),
            Axis::Row => write!(f, "row"),
        }
    }
}

/// Which way to step through an axis's ordered zone list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// A block of grid cells.
///
/// All values are 0-indexed; row 0 is the topmost row and column 0 the
/// leftmost.  A valid cell satisfies `span >= 1` and `offset + span <= N`
/// on both axes (see [`GridCell::is_valid`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
    pub col_span: u32,
    pub row_span: u32,
}

impl GridCell {
    /// The whole grid.
    pub const FULL: GridCell = GridCell {
        col: 0,
        row: 0,
        col_span: COLS,
        row_span: ROWS,
    };

    pub const fn new(col: u32, row: u32, col_span: u32, row_span: u32) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
        }
    }

    /// Whether the cell lies inside the grid with non-zero spans.
    pub fn is_valid(&self) -> bool {
        self.col_span >= 1
            && self.row_span >= 1
            && self.col + self.col_span <= COLS
            && self.row + self.row_span <= ROWS
    }

    /// `(offset, span)` along `axis`.
    pub fn extent(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::Column => (self.col, self.col_span),
            Axis::Row => (self.row, self.row_span),
        }
    }

    /// Span along `axis`.
    pub fn span(&self, axis: Axis) -> u32 {
        self.extent(axis).1
    }

    /// The cell covering the full extent of every axis except `axis`, where
    /// it takes `self`'s offset and span.
    pub fn isolate(&self, axis: Axis) -> Self {
        Self::FULL.with_extent_of(axis, self)
    }

    /// Copy of `self` with the `axis` offset/span taken from `source`.
    pub fn with_extent_of(&self, axis: Axis, source: &GridCell) -> Self {
        match axis {
            Axis::Column => Self {
                col: source.col,
                col_span: source.col_span,
                ..*self
            },
            Axis::Row => Self {
                row: source.row,
                row_span: source.row_span,
                ..*self
            },
        }
    }

    /// Combine a column-axis cell and a row-axis cell: `col`/`col_span`
    /// from `columns`, `row`/`row_span` from `rows`.
    pub fn compose(columns: &GridCell, rows: &GridCell) -> Self {
        Self::new(columns.col, rows.row, columns.col_span, rows.row_span)
    }

    /// Inverse of [`compose`](Self::compose): split into a column-axis cell
    /// and a row-axis cell, each spanning the full other axis.
    pub fn decompose(&self) -> (Self, Self) {
        (self.isolate(Axis::Column), self.isolate(Axis::Row))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "col {}+{} row {}+{}",
            self.col, self.col_span, self.row, self.row_span
        )
    }
}

//  Tests
