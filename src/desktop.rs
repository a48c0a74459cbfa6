//! An in-memory desktop: displays and windows that can be focused, hit-tested
//! and moved.
//!
//! [`VirtualDesktop`] implements every collaborator trait the engine needs,
//! so the daemon can run headless (driven over the socket) and the engine
//! can be exercised end to end in tests.  Its layout comes from the
//! `desktop` section of the configuration.

use crate::geometry::{rect_to_placement_space, to_placement_space, InputPoint, InputRect, PlacementRect};
use crate::traits::{
    primary_height, sort_left_to_right, DisplayEnumerator, DisplayId, DisplayInfo,
    FocusedWindowProvider, WindowId, WindowPicker,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

/// A window on the virtual desktop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub id: WindowId,
    #[serde(default)]
    pub title: String,
    /// Frame in input space.
    pub frame: InputRect,
}

/// Layout of the virtual desktop.
///
/// # Example
///
/// ```json
/// {
///   "displays": [
///     { "id": 1, "frame": { "x": 0, "y": 0, "width": 1440, "height": 900 },
///       "usable_area": { "x": 0, "y": 0, "width": 1440, "height": 875 },
///       "scale": 2.0 }
///   ],
///   "windows": [
///     { "id": 1, "title": "Terminal",
///       "frame": { "x": 100, "y": 100, "width": 800, "height": 500 } }
///   ],
///   "focused": 1
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesktopConfig {
    #[serde(default = "laptop_displays")]
    pub displays: Vec<DisplayInfo>,
    /// Back to front; the last window is topmost.
    #[serde(default = "laptop_windows")]
    pub windows: Vec<WindowSpec>,
    /// Initially focused window.  Defaults to the topmost one.
    #[serde(default)]
    pub focused: Option<WindowId>,
}

fn laptop_displays() -> Vec<DisplayInfo> {
    vec![DisplayInfo {
        id: DisplayId(1),
        frame: PlacementRect::new(0.0, 0.0, 1440.0, 900.0),
        // 25-point menu bar along the top.
        usable_area: PlacementRect::new(0.0, 0.0, 1440.0, 875.0),
        scale: 2.0,
    }]
}

fn laptop_windows() -> Vec<WindowSpec> {
    vec![WindowSpec {
        id: WindowId(1),
        title: "Terminal".into(),
        frame: InputRect::new(100.0, 100.0, 800.0, 500.0),
    }]
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            displays: laptop_displays(),
            windows: laptop_windows(),
            focused: None,
        }
    }
}

/// Errors from placing a virtual window.
#[derive(Debug, thiserror::Error)]
pub enum DesktopError {
    #[error("no such window: {0}")]
    UnknownWindow(WindowId),
    #[error("{0} refused to move")]
    Locked(WindowId),
}

/// In-memory displays and windows.
#[derive(Debug)]
pub struct VirtualDesktop {
    displays: Vec<DisplayInfo>,
    windows: RefCell<Vec<WindowSpec>>,
    focused: Cell<Option<WindowId>>,
    locked: RefCell<HashSet<WindowId>>,
}

impl VirtualDesktop {
    pub fn new(mut displays: Vec<DisplayInfo>, windows: Vec<WindowSpec>) -> Self {
        sort_left_to_right(&mut displays);
        let focused = windows.last().map(|w| w.id);
        Self {
            displays,
            windows: RefCell::new(windows),
            focused: Cell::new(focused),
            locked: RefCell::new(HashSet::new()),
        }
    }

    pub fn from_config(config: &DesktopConfig) -> Self {
        let desktop = Self::new(config.displays.clone(), config.windows.clone());
        if let Some(id) = config.focused {
            if !desktop.focus(id) {
                warn!("focused window {} is not in the layout", id);
            }
        }
        desktop
    }

    /// Focus `id` and raise it to the top.  Returns `false` for an unknown
    /// window.
    pub fn focus(&self, id: WindowId) -> bool {
        let mut windows = self.windows.borrow_mut();
        let Some(pos) = windows.iter().position(|w| w.id == id) else {
            return false;
        };
        let w = windows.remove(pos);
        windows.push(w);
        self.focused.set(Some(id));
        true
    }

    /// Drop keyboard focus.
    pub fn clear_focus(&self) {
        self.focused.set(None);
    }

    /// Make `set_frame` fail (or succeed again) for `id`.
    pub fn set_locked(&self, id: WindowId, locked: bool) {
        let mut set = self.locked.borrow_mut();
        if locked {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    pub fn window(&self, id: WindowId) -> Option<WindowSpec> {
        self.windows.borrow().iter().find(|w| w.id == id).cloned()
    }

    /// All windows, back to front.
    pub fn windows(&self) -> Vec<WindowSpec> {
        self.windows.borrow().clone()
    }

    fn contains_window(&self, id: WindowId) -> bool {
        self.windows.borrow().iter().any(|w| w.id == id)
    }
}

impl FocusedWindowProvider for VirtualDesktop {
    type Window = WindowId;
    type Error = DesktopError;

    fn focused_window(&self) -> Option<WindowId> {
        self.focused.get().filter(|id| self.contains_window(*id))
    }

    fn window_id(&self, window: &WindowId) -> Option<WindowId> {
        self.contains_window(*window).then_some(*window)
    }

    /// The display containing the center of the window's frame.
    fn display_for(&self, window: &WindowId) -> Option<DisplayId> {
        let frame = self.frame(window)?;
        let h = primary_height(&self.displays);
        let center = rect_to_placement_space(frame, h).center();
        self.displays
            .iter()
            .find(|d| d.frame.contains(center))
            .map(|d| d.id)
    }

    fn frame(&self, window: &WindowId) -> Option<InputRect> {
        self.window(*window).map(|w| w.frame)
    }

    fn set_frame(&self, window: &WindowId, frame: InputRect) -> Result<(), DesktopError> {
        if self.locked.borrow().contains(window) {
            return Err(DesktopError::Locked(*window));
        }
        let mut windows = self.windows.borrow_mut();
        let w = windows
            .iter_mut()
            .find(|w| w.id == *window)
            .ok_or(DesktopError::UnknownWindow(*window))?;
        debug!(
            "{} ({}) -> ({:.0}, {:.0}) {:.0}x{:.0}",
            w.id, w.title, frame.x, frame.y, frame.width, frame.height
        );
        w.frame = frame;
        Ok(())
    }
}

impl WindowPicker for VirtualDesktop {
    fn window_at_point(&self, point: InputPoint) -> Option<WindowId> {
        let h = primary_height(&self.displays);
        let p = to_placement_space(point, h);
        self.windows
            .borrow()
            .iter()
            .rev()
            .find(|w| rect_to_placement_space(w.frame, h).contains(p))
            .map(|w| w.id)
    }
}

impl DisplayEnumerator for VirtualDesktop {
    fn all_displays(&self) -> Vec<DisplayInfo> {
        self.displays.clone()
    }
}
