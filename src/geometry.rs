//! Coordinate spaces and grid-cell rectangles.
//!
//! Two conventions coexist on the desktop:
//!
//! | Space       | Origin                         | Y axis         | Used by                     |
//! |-------------|--------------------------------|----------------|-----------------------------|
//! | *placement* | bottom-left of primary display | increases up   | display frames, usable areas |
//! | *input*     | top-left of primary display    | increases down | pointer events, window frames |
//!
//! Each space has its own point and rect type so a conversion can never be
//! skipped by accident.  Converting between them only needs the height of the
//! primary display.
//!
//! Grid row 0 is always the **topmost** row.  In placement space that is the
//! row with the *largest* y; in input space it has the *smallest* y.

use crate::grid::{GridCell, COLS, ROWS};
use serde::{Deserialize, Serialize};

/// A point in input space (top-left origin, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputPoint {
    pub x: f64,
    pub y: f64,
}

/// A point in placement space (bottom-left origin, y up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementPoint {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle in placement space.  `(x, y)` is the
/// bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// An axis-aligned rectangle in input space.  `(x, y)` is the top-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl InputPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: InputPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl PlacementPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl PlacementRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> PlacementPoint {
        PlacementPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Half-open containment: the left/bottom edges are inside, the
    /// right/top edges belong to the neighbour.
    pub fn contains(&self, p: PlacementPoint) -> bool {
        p.x >= self.x && p.x < self.max_x() && p.y >= self.y && p.y < self.max_y()
    }
}

impl InputRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> InputPoint {
        InputPoint::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

//  Point / rect conversion

/// Convert an input-space point to placement space.
pub fn to_placement_space(p: InputPoint, primary_height: f64) -> PlacementPoint {
    PlacementPoint::new(p.x, primary_height - p.y)
}

/// Convert a placement-space point to input space.
pub fn to_input_space(p: PlacementPoint, primary_height: f64) -> InputPoint {
    InputPoint::new(p.x, primary_height - p.y)
}

/// Convert a placement-space rect to input space.
///
/// The bottom-left corner in placement space becomes the top-left corner in
/// input space, so the rect's height must be folded in.
pub fn rect_to_input_space(r: PlacementRect, primary_height: f64) -> InputRect {
    InputRect::new(r.x, primary_height - r.y - r.height, r.width, r.height)
}

/// Convert an input-space rect to placement space.
pub fn rect_to_placement_space(r: InputRect, primary_height: f64) -> PlacementRect {
    PlacementRect::new(r.x, primary_height - r.y - r.height, r.width, r.height)
}

//  Grid cells

/// Map `cell` to a concrete rectangle inside `usable`, in placement space.
///
/// Every edge is computed directly as `origin + extent * index / N` so that
/// adjacent cells share exact edges and nothing accumulates across cells.
pub fn rect_for_cell(cell: GridCell, usable: PlacementRect) -> PlacementRect {
    let col_edge = |i: u32| usable.x + usable.width * f64::from(i) / f64::from(COLS);
    // Row 0 is at the top; placement y grows upward, so row edges are
    // measured down from the top of the usable area.
    let row_edge = |i: u32| usable.max_y() - usable.height * f64::from(i) / f64::from(ROWS);

    let left = col_edge(cell.col);
    let right = col_edge(cell.col + cell.col_span);
    let top = row_edge(cell.row);
    let bottom = row_edge(cell.row + cell.row_span);

    PlacementRect::new(left, bottom, right - left, top - bottom)
}

/// [`rect_for_cell`] followed by [`rect_to_input_space`], i.e. the frame to
/// hand to a window-placement backend.
pub fn input_rect_for_cell(
    cell: GridCell,
    usable: PlacementRect,
    primary_height: f64,
) -> InputRect {
    rect_to_input_space(rect_for_cell(cell, usable), primary_height)
}

/// Position of `p` within `usable`, normalised to `[0, 1]` on each axis.
///
/// `x` runs from the left edge (0) to the right edge (1); `y` from the
/// bottom edge (0) to the top edge (1).  Returns `None` when the point lies
/// outside the usable area.
pub fn normalized_position(
    p: InputPoint,
    usable: PlacementRect,
    primary_height: f64,
) -> Option<(f64, f64)> {
    let pp = to_placement_space(p, primary_height);
    if !usable.contains(pp) {
        return None;
    }
    Some((
        (pp.x - usable.x) / usable.width,
        (pp.y - usable.y) / usable.height,
    ))
}
