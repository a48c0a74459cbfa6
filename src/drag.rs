//! Snapping a window by dragging it with the drag modifier held.
//!
//! While the pointer moves, the nearest zone is found on each axis
//! independently (distance to the zone's center along that axis only) and
//! the two are composed into a single cell on the display under the
//! pointer.  On release the last composite is applied to the window that
//! was grabbed.
//!
//! Nothing happens until the pointer has moved further than a small gate
//! from the mouse-down point, so ordinary modifier-clicks never snap.

use crate::geometry::{input_rect_for_cell, InputPoint, InputRect};
use crate::grid::{Axis, GridCell};
use crate::traits::{display_at_point, DisplayId, DisplayInfo, FocusedWindowProvider, ZoneHighlight};
use crate::zones::ZoneCatalog;
use log::{debug, info, warn};
use std::sync::Arc;

/// Distance (logical units) the pointer must travel from mouse-down before
/// any matching happens.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 8.0;

/// Tolerance band used when comparing center distances.
pub const DEFAULT_TIE_EPSILON: f64 = 1.0;

/// The composite zone matched for a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMatch {
    pub display: DisplayId,
    /// Index into the display's column-axis zone list.
    pub column: usize,
    /// Index into the display's row-axis zone list.
    pub row: usize,
    pub cell: GridCell,
}

impl DragMatch {
    pub fn highlight(&self) -> ZoneHighlight {
        ZoneHighlight {
            column: Some(self.column),
            row: Some(self.row),
        }
    }
}

/// One drag gesture, from mouse-down to mouse-up or cancellation.
#[derive(Debug, Clone)]
pub struct DragSession<Win> {
    /// Pointer position at mouse-down.
    pub start: InputPoint,
    /// Window under the pointer at mouse-down, if any.
    pub window: Option<Win>,
    /// Most recent composite, kept when the pointer leaves every display.
    pub last_match: Option<DragMatch>,
    /// Whether the pointer has passed the distance gate.
    pub active: bool,
}

impl<Win> DragSession<Win> {
    pub fn new(start: InputPoint, window: Option<Win>) -> Self {
        Self {
            start,
            window,
            last_match: None,
            active: false,
        }
    }
}

/// Nearest-zone matching for drags.
pub struct DragSnapEngine {
    catalog: Arc<ZoneCatalog>,
    threshold: f64,
    tie_epsilon: f64,
}

impl DragSnapEngine {
    pub fn new(catalog: Arc<ZoneCatalog>) -> Self {
        Self {
            catalog,
            threshold: DEFAULT_DRAG_THRESHOLD,
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_tie_epsilon(mut self, tie_epsilon: f64) -> Self {
        self.tie_epsilon = tie_epsilon;
        self
    }

    /// Distances from `point` to the center of every `axis` zone on
    /// `display`, with each zone's span.
    fn distances(
        &self,
        axis: Axis,
        point: InputPoint,
        display: &DisplayInfo,
        primary_height: f64,
    ) -> Vec<(f64, u32)> {
        self.catalog
            .registry(axis)
            .zones(display.resolution())
            .iter()
            .map(|zone| {
                let center = input_rect_for_cell(zone.cell, display.usable_area, primary_height).center();
                let dist = match axis {
                    Axis::Column => (point.x - center.x).abs(),
                    Axis::Row => (point.y - center.y).abs(),
                };
                (dist, zone.cell.span(axis))
            })
            .collect()
    }

    /// Index of the `axis` zone on `display` whose center is nearest to
    /// `point` along that axis.
    ///
    /// Every zone within the tie epsilon of the minimum distance counts as
    /// nearest; among those the narrowest wins, then the earliest.  `None`
    /// when the display has no zones on `axis`.
    pub fn nearest_on_axis(
        &self,
        axis: Axis,
        point: InputPoint,
        display: &DisplayInfo,
        primary_height: f64,
    ) -> Option<usize> {
        let distances = self.distances(axis, point, display, primary_height);
        let min = distances.iter().map(|&(dist, _)| dist).fold(f64::INFINITY, f64::min);
        distances
            .into_iter()
            .enumerate()
            .filter(|(_, (dist, _))| *dist <= min + self.tie_epsilon)
            .min_by_key(|&(i, (_, span))| (span, i))
            .map(|(i, _)| i)
    }

    /// Indices of `axis` zones whose centers coincide with zone `index`
    /// (within the tie epsilon), narrowest first.
    ///
    /// These are the zones a drag cannot tell apart by position alone.
    pub fn overlap_group(
        &self,
        axis: Axis,
        index: usize,
        display: &DisplayInfo,
        primary_height: f64,
    ) -> Vec<usize> {
        let zones = self.catalog.registry(axis).zones(display.resolution());
        let Some(zone) = zones.get(index) else {
            return Vec::new();
        };
        let center = input_rect_for_cell(zone.cell, display.usable_area, primary_height).center();
        let mut group: Vec<(usize, u32)> = self
            .distances(axis, center, display, primary_height)
            .into_iter()
            .enumerate()
            .filter(|(_, (dist, _))| *dist < self.tie_epsilon)
            .map(|(i, (_, span))| (i, span))
            .collect();
        group.sort_by_key(|&(i, span)| (span, i));
        group.into_iter().map(|(i, _)| i).collect()
    }

    /// Match `point` against `display`, composing the nearest zone on each
    /// axis.
    pub fn match_point(
        &self,
        point: InputPoint,
        display: &DisplayInfo,
        primary_height: f64,
    ) -> Option<DragMatch> {
        let column = self.nearest_on_axis(Axis::Column, point, display, primary_height)?;
        let row = self.nearest_on_axis(Axis::Row, point, display, primary_height)?;
        let res = display.resolution();
        let columns = &self.catalog.columns.zones(res)[column].cell;
        let rows = &self.catalog.rows.zones(res)[row].cell;
        Some(DragMatch {
            display: display.id,
            column,
            row,
            cell: GridCell::compose(columns, rows),
        })
    }

    /// Start a session at `start`, grabbing `window`.
    pub fn begin<Win>(&self, start: InputPoint, window: Option<Win>) -> DragSession<Win> {
        DragSession::new(start, window)
    }

    /// Feed a pointer move into `session`.
    ///
    /// Returns the new match once the pointer is past the gate and over a
    /// display with zones; otherwise `None`, leaving any earlier match in
    /// place.
    pub fn track<Win>(
        &self,
        session: &mut DragSession<Win>,
        point: InputPoint,
        displays: &[DisplayInfo],
        primary_height: f64,
    ) -> Option<DragMatch> {
        if !session.active {
            if session.start.distance_to(point) <= self.threshold {
                return None;
            }
            debug!("drag passed gate at ({:.1}, {:.1})", point.x, point.y);
            session.active = true;
        }
        let display = display_at_point(displays, point, primary_height)?;
        let matched = self.match_point(point, display, primary_height)?;
        if session.last_match != Some(matched) {
            debug!("drag over {} [{}]", matched.display, matched.cell);
        }
        session.last_match = Some(matched);
        Some(matched)
    }

    /// Finish `session`: place its window (or the focused window when none
    /// was grabbed) into the last matched cell.
    ///
    /// Returns the frame that was requested, or `None` when nothing was
    /// placed.
    pub fn commit<W>(
        &self,
        session: DragSession<W::Window>,
        wm: &W,
        displays: &[DisplayInfo],
        primary_height: f64,
    ) -> Option<InputRect>
    where
        W: FocusedWindowProvider + ?Sized,
    {
        let Some(matched) = session.last_match else {
            debug!("drag ended without a match");
            return None;
        };
        let Some(display) = displays.iter().find(|d| d.id == matched.display) else {
            debug!("drag target {} went away", matched.display);
            return None;
        };
        let Some(window) = session.window.or_else(|| wm.focused_window()) else {
            debug!("drag ended with no window to place");
            return None;
        };

        let frame = input_rect_for_cell(matched.cell, display.usable_area, primary_height);
        info!("drag snap {:?} -> [{}] on {}", window, matched.cell, display.id);
        if let Err(e) = wm.set_frame(&window, frame) {
            warn!("set frame for {:?} failed: {}", window, e);
        }
        Some(frame)
    }
}

//  Tests
