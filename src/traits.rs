//! Traits that decouple the zone engine from any concrete windowing system,
//! overlay renderer, or event transport.
//!
//! The engine only sees these abstractions.  A backend for a real desktop
//! implements them on top of its accessibility / display APIs; the
//! [`VirtualDesktop`](crate::desktop::VirtualDesktop) implements them in
//! memory for headless runs and tests.

use crate::geometry::{to_placement_space, InputPoint, InputRect, PlacementRect};
use crate::input::InputEvent;
use crate::zones::DisplayResolution;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc;

//  Identifiers

/// Stable identifier of a window, used to key per-window cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u32);

/// Stable identifier of a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "display#{}", self.0)
    }
}

//  Displays

/// Static information about a display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub id: DisplayId,
    /// Full display bounds, in placement space.
    pub frame: PlacementRect,
    /// The part of `frame` not covered by the menu bar or dock, in
    /// placement space.
    pub usable_area: PlacementRect,
    /// Backing scale factor (2.0 on a typical high-density panel).
    pub scale: f64,
}

impl DisplayInfo {
    /// Physical resolution, used to pick zone overrides.
    pub fn resolution(&self) -> DisplayResolution {
        DisplayResolution::from_logical(self.frame.width, self.frame.height, self.scale)
    }
}

/// Height of the primary display, the reference for converting between
/// input and placement space.
///
/// The primary display is the one whose frame sits at the placement-space
/// origin; if none does, the first display is used.  With no displays at all
/// the height is `0.0`.
pub fn primary_height(displays: &[DisplayInfo]) -> f64 {
    displays
        .iter()
        .find(|d| d.frame.x == 0.0 && d.frame.y == 0.0)
        .or_else(|| displays.first())
        .map(|d| d.frame.height)
        .unwrap_or(0.0)
}

/// Sort displays left-to-right by their frame origin (stable for ties).
pub fn sort_left_to_right(displays: &mut [DisplayInfo]) {
    displays.sort_by(|a, b| {
        a.frame
            .x
            .partial_cmp(&b.frame.x)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// The display whose frame contains the input-space point `p`.
pub fn display_at_point(
    displays: &[DisplayInfo],
    p: InputPoint,
    primary_height: f64,
) -> Option<&DisplayInfo> {
    let pp = to_placement_space(p, primary_height);
    displays.iter().find(|d| d.frame.contains(pp))
}

//  Collaborators

/// Access to the focused window and window frames.
///
/// Queries return `None` when the answer is unavailable (no focused window,
/// window already closed, …); that is an ordinary condition, not an error.
pub trait FocusedWindowProvider {
    /// Backend handle for a window.
    type Window: Clone + fmt::Debug;
    /// Error produced when a frame cannot be written.
    type Error: std::error::Error + Send + 'static;

    /// The window that currently has keyboard focus.
    fn focused_window(&self) -> Option<Self::Window>;

    /// Stable identifier for `window`.
    fn window_id(&self, window: &Self::Window) -> Option<WindowId>;

    /// The display `window` is on.
    fn display_for(&self, window: &Self::Window) -> Option<DisplayId>;

    /// Current frame of `window`, in input space.
    fn frame(&self, window: &Self::Window) -> Option<InputRect>;

    /// Move and resize `window` to `frame` (input space).
    ///
    /// Best effort: callers log a failure and carry on.  Any retry policy
    /// lives in the implementation.
    fn set_frame(&self, window: &Self::Window, frame: InputRect) -> Result<(), Self::Error>;
}

/// Hit-testing windows under the pointer, used to capture the window at the
/// start of a drag.
pub trait WindowPicker: FocusedWindowProvider {
    /// The topmost window at `point` (input space).
    fn window_at_point(&self, point: InputPoint) -> Option<Self::Window>;
}

/// Enumeration of the attached displays.
pub trait DisplayEnumerator {
    /// All displays, sorted left-to-right by position.
    fn all_displays(&self) -> Vec<DisplayInfo>;
}

//  Overlay

/// Which zone is highlighted on each axis of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneHighlight {
    /// Index into the display's column-axis zone list.
    pub column: Option<usize>,
    /// Index into the display's row-axis zone list.
    pub row: Option<usize>,
}

/// The visual zone overlay.
///
/// The presenter keeps its own visibility; the engine only asks it to show,
/// re-highlight, or hide.
pub trait OverlayPresenter {
    /// Show the overlay on `display`, or wherever the presenter places it by
    /// default when `display` is `None`.
    fn show(&mut self, display: Option<DisplayId>, highlight: Option<ZoneHighlight>);

    /// Change the highlighted zones without moving the overlay.
    fn update_highlight(&mut self, highlight: Option<ZoneHighlight>);

    /// Hide the overlay.  No-op when already hidden.
    fn hide(&mut self);

    /// Whether the overlay is currently shown.
    fn is_visible(&self) -> bool;

    /// The display the overlay is shown on, if any.
    fn display(&self) -> Option<DisplayId>;
}

/// Make sure the overlay is visible on `display` with `highlight`.
///
/// Shows it if hidden, moves it (hide + show) if it is on another display,
/// otherwise only updates the highlight.
pub fn present_on<O: OverlayPresenter + ?Sized>(
    overlay: &mut O,
    display: DisplayId,
    highlight: Option<ZoneHighlight>,
) {
    if !overlay.is_visible() {
        overlay.show(Some(display), highlight);
    } else if overlay.display() != Some(display) {
        overlay.hide();
        overlay.show(Some(display), highlight);
    } else {
        overlay.update_highlight(highlight);
    }
}

//  Event Source

/// A source of [`InputEvent`]s.
///
/// Implementations sit in the input-callback context (an OS event tap, a
/// socket, a test script, …) and forward events, in the order they were
/// produced, into `sink`.  The receiving end is drained by the single main
/// context that owns the [`InputStateMachine`](crate::input::InputStateMachine).
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each event must be sent exactly once and must never block on engine
///   work: the send is the only hand-off.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`InputEvent`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<InputEvent>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(id: u32, x: f64, w: f64, h: f64) -> DisplayInfo {
        let frame = PlacementRect::new(x, 0.0, w, h);
        DisplayInfo {
            id: DisplayId(id),
            frame,
            usable_area: frame,
            scale: 2.0,
        }
    }

    #[test]
    fn primary_is_display_at_origin() {
        let ds = vec![display(2, -1920.0, 1920.0, 1080.0), display(1, 0.0, 1440.0, 900.0)];
        assert_eq!(primary_height(&ds), 900.0);
        assert_eq!(primary_height(&[]), 0.0);
    }

    #[test]
    fn sorting_is_left_to_right() {
        let mut ds = vec![
            display(1, 0.0, 1440.0, 900.0),
            display(3, 3360.0, 1920.0, 1080.0),
            display(2, -1920.0, 1920.0, 1080.0),
        ];
        sort_left_to_right(&mut ds);
        let ids: Vec<u32> = ds.iter().map(|d| d.id.0).collect();
        assert_eq!(ids, [2, 1, 3]);
    }

    #[test]
    fn display_at_point_uses_placement_space() {
        let ds = vec![display(1, 0.0, 1200.0, 600.0), display(2, 1200.0, 1200.0, 600.0)];
        let h = primary_height(&ds);
        assert_eq!(display_at_point(&ds, InputPoint::new(100.0, 10.0), h).map(|d| d.id), Some(DisplayId(1)));
        assert_eq!(display_at_point(&ds, InputPoint::new(1300.0, 590.0), h).map(|d| d.id), Some(DisplayId(2)));
        assert!(display_at_point(&ds, InputPoint::new(2500.0, 10.0), h).is_none());
    }

    #[test]
    fn resolution_uses_backing_scale() {
        let d = display(1, 0.0, 2560.0, 720.0);
        assert_eq!(d.resolution(), DisplayResolution::new(5120, 1440));
    }

    //  Mock overlay

    #[derive(Debug, Default)]
    struct MockOverlay {
        log: Vec<String>,
        shown_on: Option<Option<DisplayId>>,
    }

    impl OverlayPresenter for MockOverlay {
        fn show(&mut self, display: Option<DisplayId>, _: Option<ZoneHighlight>) {
            self.log.push(format!("show {:?}", display.map(|d| d.0)));
            self.shown_on = Some(display);
        }
        fn update_highlight(&mut self, _: Option<ZoneHighlight>) {
            self.log.push("highlight".into());
        }
        fn hide(&mut self) {
            self.log.push("hide".into());
            self.shown_on = None;
        }
        fn is_visible(&self) -> bool {
            self.shown_on.is_some()
        }
        fn display(&self) -> Option<DisplayId> {
            self.shown_on.flatten()
        }
    }

    #[test]
    fn present_on_shows_moves_and_updates() {
        let mut o = MockOverlay::default();
        present_on(&mut o, DisplayId(1), None);
        present_on(&mut o, DisplayId(1), None);
        present_on(&mut o, DisplayId(2), None);
        assert_eq!(o.log, ["show Some(1)", "highlight", "hide", "show Some(2)"]);
    }

    //  Mock EventSource

    /// Emits a fixed script of events.
    struct ScriptSource {
        events: Vec<InputEvent>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("script error")]
    struct ScriptError;

    impl EventSource for ScriptSource {
        type Error = ScriptError;

        fn run(&mut self, sink: mpsc::Sender<InputEvent>) -> Result<(), ScriptError> {
            for ev in self.events.drain(..) {
                let _ = sink.send(ev);
            }
            Ok(())
        }
    }

    #[test]
    fn script_source_preserves_order() {
        let mut src = ScriptSource {
            events: vec![
                InputEvent::MouseDown(InputPoint::new(1.0, 2.0)),
                InputEvent::MouseUp(InputPoint::new(3.0, 4.0)),
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let evs: Vec<InputEvent> = rx.try_iter().collect();
        assert_eq!(
            evs,
            [
                InputEvent::MouseDown(InputPoint::new(1.0, 2.0)),
                InputEvent::MouseUp(InputPoint::new(3.0, 4.0)),
            ]
        );
    }
}
