//! Stepping a window through an axis's zones with the keyboard.
//!
//! Each window remembers, per axis, the index of the zone it was last put
//! into ([`CycleState`]).  A step moves that index one place forward or
//! backward:
//!
//! * **Column axis**: running off either end wraps to the neighbouring
//!   display (cyclic, left-to-right order): index 0 on the next display,
//!   or the last index on the previous one.
//! * **Row axis**: never leaves the current display; the ends clamp.
//!
//! The window's frame is the composition of the zone just selected on the
//! stepped axis with whatever the window currently expresses on the other
//! axis (full extent when nothing is recorded).
//!
//! With no recorded index a window sits at the axis *default*: before the
//! first column zone (so forward lands on index 0 and backward on the last
//! index), or at the configured default row index.

use crate::geometry::{input_rect_for_cell, InputRect};
use crate::grid::{Axis, Direction, GridCell};
use crate::keys::CycleAction;
use crate::traits::{
    present_on, primary_height, sort_left_to_right, DisplayEnumerator, DisplayId, DisplayInfo,
    FocusedWindowProvider, OverlayPresenter, WindowId, ZoneHighlight,
};
use crate::zones::{Zone, ZoneCatalog};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Default row index for windows without row state: "Full Height".
pub const DEFAULT_ROW_INDEX: usize = 3;

/// Last applied zone index, keyed by `(window, axis)`.
///
/// Entries are created on a window's first cycle and never removed; entries
/// for closed windows simply stop being looked up.
#[derive(Debug, Clone, Default)]
pub struct CycleState {
    indices: HashMap<(WindowId, Axis), usize>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, window: WindowId, axis: Axis) -> Option<usize> {
        self.indices.get(&(window, axis)).copied()
    }

    pub fn set(&mut self, window: WindowId, axis: Axis, index: usize) {
        self.indices.insert((window, axis), index);
    }

    /// Number of recorded `(window, axis)` entries.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Result of one step within a single display's zone list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Within(usize),
    /// Stepped forward past the last zone.
    Overflow,
    /// Stepped backward past the first zone.
    Underflow,
}

/// Step from `base` (the stored or default index) through a list of `len`
/// zones.  `len` must be non-zero.
fn step(base: Option<usize>, len: usize, direction: Direction) -> Step {
    match direction {
        Direction::Forward => {
            let next = base.map_or(0, |i| i + 1);
            if next >= len {
                Step::Overflow
            } else {
                Step::Within(next)
            }
        }
        Direction::Backward => match base {
            None => Step::Within(len - 1),
            Some(0) => Step::Underflow,
            // A stale index from a display with more zones lands on the last one.
            Some(i) => Step::Within(i.min(len) - 1),
        },
    }
}

/// Where a step landed: the display (as an index into the sorted display
/// list), the zone index on that display, and the composed cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub display_index: usize,
    pub zone_index: usize,
    pub zone: Zone,
    pub cell: GridCell,
}

/// Everything a completed cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub window: WindowId,
    pub display: DisplayId,
    pub zone: Zone,
    pub zone_index: usize,
    pub cell: GridCell,
    /// Frame requested from the placement backend (input space).
    pub frame: InputRect,
    pub highlight: ZoneHighlight,
}

/// Per-window zone cycling.
pub struct CycleEngine {
    catalog: Arc<ZoneCatalog>,
    state: CycleState,
    default_row_index: usize,
}

impl CycleEngine {
    pub fn new(catalog: Arc<ZoneCatalog>, default_row_index: usize) -> Self {
        Self {
            catalog,
            state: CycleState::new(),
            default_row_index,
        }
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    /// Index used when a window has nothing recorded on `axis`, for a zone
    /// list of `len` entries.
    fn default_index(&self, axis: Axis, len: usize) -> Option<usize> {
        match axis {
            Axis::Column => None,
            Axis::Row if len == 0 => None,
            Axis::Row => Some(self.default_row_index.min(len - 1)),
        }
    }

    /// The zone index `window` currently expresses on `axis` on `display`,
    /// or `None` when it is at the implicit column default.
    pub fn current_index(&self, window: WindowId, axis: Axis, display: &DisplayInfo) -> Option<usize> {
        let len = self.catalog.registry(axis).zones(display.resolution()).len();
        match self.state.get(window, axis) {
            Some(i) if i < len => Some(i),
            _ => self.default_index(axis, len),
        }
    }

    /// The cell `window` currently expresses on `axis` on `display`.
    ///
    /// Only the `axis` half of the result is meaningful; the other axis
    /// spans the full grid.  This is the zone [`current_index`](Self::current_index)
    /// reports, so it agrees with the overlay highlight; at the column
    /// default it is the full extent.
    pub fn current_cell(&self, window: WindowId, axis: Axis, display: &DisplayInfo) -> GridCell {
        let zones = self.catalog.registry(axis).zones(display.resolution());
        self.current_index(window, axis, display)
            .and_then(|i| zones.get(i))
            .map(|z| z.cell.isolate(axis))
            .unwrap_or(GridCell::FULL)
    }

    /// Overlay highlight for `window` on `display`.
    pub fn highlight(&self, window: WindowId, display: &DisplayInfo) -> ZoneHighlight {
        ZoneHighlight {
            column: self.current_index(window, Axis::Column, display),
            row: self.current_index(window, Axis::Row, display),
        }
    }

    /// Compute and record one step for `window`, currently on
    /// `displays[current]`.
    ///
    /// `displays` must be sorted left-to-right.  Returns `None` (and records
    /// nothing) when the zone list it would step into is empty.
    pub fn advance(
        &mut self,
        window: WindowId,
        displays: &[DisplayInfo],
        current: usize,
        action: CycleAction,
    ) -> Option<Advance> {
        let CycleAction { axis, direction } = action;
        let registry = self.catalog.registry(axis);
        let display = displays.get(current)?;
        let len = registry.zones(display.resolution()).len();
        if len == 0 {
            debug!("no {} zones on {}", axis, display.id);
            return None;
        }

        let base = self.state.get(window, axis).or(self.default_index(axis, len));
        let (display_index, zone_index) = match (step(base, len, direction), axis) {
            (Step::Within(i), _) => (current, i),
            (Step::Overflow, Axis::Row) => (current, len - 1),
            (Step::Underflow, Axis::Row) => (current, 0),
            (Step::Overflow, Axis::Column) => {
                let next = (current + 1) % displays.len();
                let next_len = registry.zones(displays[next].resolution()).len();
                if next_len == 0 {
                    debug!("no column zones on {}", displays[next].id);
                    return None;
                }
                (next, 0)
            }
            (Step::Underflow, Axis::Column) => {
                let prev = (current + displays.len() - 1) % displays.len();
                let prev_len = registry.zones(displays[prev].resolution()).len();
                if prev_len == 0 {
                    debug!("no column zones on {}", displays[prev].id);
                    return None;
                }
                (prev, prev_len - 1)
            }
        };

        let target = &displays[display_index];
        let zone = registry.zones(target.resolution())[zone_index].clone();
        let other = self.current_cell(window, axis.other(), target);
        let cell = match axis {
            Axis::Column => GridCell::compose(&zone.cell, &other),
            Axis::Row => GridCell::compose(&other, &zone.cell),
        };

        self.state.set(window, axis, zone_index);
        Some(Advance {
            display_index,
            zone_index,
            zone,
            cell,
        })
    }

    /// Step the focused window one zone along `action.axis`.
    ///
    /// Resolves the focused window and its display, records the new index,
    /// asks `wm` to place the window and shows the result on `overlay`.
    /// Returns `None` without side effects when there is no focused window,
    /// its display is unknown, or the relevant zone list is empty.
    pub fn cycle<W, O>(&mut self, wm: &W, overlay: &mut O, action: CycleAction) -> Option<CycleOutcome>
    where
        W: FocusedWindowProvider + DisplayEnumerator,
        O: OverlayPresenter + ?Sized,
    {
        let Some(window) = wm.focused_window() else {
            debug!("cycle {} {}: no focused window", action.axis, action.direction);
            return None;
        };
        let Some(id) = wm.window_id(&window) else {
            debug!("cycle: focused window {:?} has no id", window);
            return None;
        };
        let Some(display_id) = wm.display_for(&window) else {
            debug!("cycle: {} is not on any display", id);
            return None;
        };

        let mut displays = wm.all_displays();
        sort_left_to_right(&mut displays);
        let Some(current) = displays.iter().position(|d| d.id == display_id) else {
            debug!("cycle: {} not among enumerated displays", display_id);
            return None;
        };

        let advance = self.advance(id, &displays, current, action)?;
        let target = &displays[advance.display_index];
        let frame = input_rect_for_cell(advance.cell, target.usable_area, primary_height(&displays));

        info!(
            "{} {} {} -> {} [{}] on {}",
            id, action.axis, action.direction, advance.zone.name, advance.cell, target.id
        );
        if let Err(e) = wm.set_frame(&window, frame) {
            warn!("set frame for {} failed: {}", id, e);
        }

        let highlight = self.highlight(id, target);
        present_on(overlay, target.id, Some(highlight));

        Some(CycleOutcome {
            window: id,
            display: target.id,
            zone: advance.zone,
            zone_index: advance.zone_index,
            cell: advance.cell,
            frame,
            highlight,
        })
    }
}

//  Tests
