//! **zonesnap**: zone-based window snapping on a fixed screen grid.
//!
//! Every display's usable area is divided into a 12 × 6 grid.  Named
//! *zones* are blocks of that grid, ordered per axis from one edge to the
//! other.  Holding the cycling modifier and pressing an arrow key steps the
//! focused window through the zones of one axis (columns wrap across
//! displays, rows stay put); holding the drag modifier while dragging snaps
//! the window to the nearest zone on each axis when the button is released.
//!
//! # Architecture
//!
//! The engine is organised around a few traits in [`traits`]:
//!
//! * [`traits::FocusedWindowProvider`], [`traits::WindowPicker`] and
//!   [`traits::DisplayEnumerator`] abstract the desktop, so the zone logic
//!   is not coupled to any window system.
//! * [`traits::OverlayPresenter`] abstracts the visual zone overlay.
//! * [`traits::EventSource`] abstracts the transport that delivers input
//!   events, so the main loop is not coupled to any event tap.
//!
//! [`input::InputStateMachine`] ties them together.  Concrete
//! implementations live in [`desktop`] (in-memory desktop), [`overlay`]
//! (channel-backed overlay) and [`ipc`] (Unix-socket event listener).

pub mod config;
pub mod cycle;
pub mod desktop;
pub mod drag;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod ipc;
pub mod keys;
pub mod overlay;
pub mod traits;
pub mod zones;
