//! An [`OverlayPresenter`] that forwards overlay changes over a channel.
//!
//! The engine never renders anything.  [`ChannelOverlay`] keeps the
//! visibility state the engine asks about and emits an [`OverlayEvent`] for
//! every change, so any listener (a renderer, a debug logger, a test) can
//! follow along without being owned by the engine.

use crate::traits::{DisplayId, OverlayPresenter, ZoneHighlight};
use log::debug;
use serde::Serialize;
use std::sync::mpsc;

/// A change to the overlay, as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OverlayEvent {
    /// Show the overlay on `display` (or the renderer's default display).
    Show {
        display: Option<DisplayId>,
        highlight: Option<ZoneHighlight>,
    },
    /// Change the highlighted zones in place.
    Highlight(Option<ZoneHighlight>),
    /// Hide the overlay.
    Hide,
}

/// Overlay state plus an optional event channel.
///
/// Without a channel (see [`detached`](Self::detached)) it only tracks
/// state.  A closed channel is tolerated; events are then dropped.
#[derive(Debug, Default)]
pub struct ChannelOverlay {
    tx: Option<mpsc::Sender<OverlayEvent>>,
    visible: bool,
    display: Option<DisplayId>,
    highlight: Option<ZoneHighlight>,
}

impl ChannelOverlay {
    pub fn new(tx: mpsc::Sender<OverlayEvent>) -> Self {
        Self {
            tx: Some(tx),
            ..Self::default()
        }
    }

    /// An overlay that tracks state but reports to nobody.
    pub fn detached() -> Self {
        Self::default()
    }

    /// The highlight last requested, while visible.
    pub fn highlight(&self) -> Option<ZoneHighlight> {
        self.highlight
    }

    fn emit(&self, event: OverlayEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("overlay receiver gone");
            }
        }
    }
}

impl OverlayPresenter for ChannelOverlay {
    fn show(&mut self, display: Option<DisplayId>, highlight: Option<ZoneHighlight>) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.display = display;
        self.highlight = highlight;
        self.emit(OverlayEvent::Show { display, highlight });
    }

    fn update_highlight(&mut self, highlight: Option<ZoneHighlight>) {
        if !self.visible || self.highlight == highlight {
            return;
        }
        self.highlight = highlight;
        self.emit(OverlayEvent::Highlight(highlight));
    }

    fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.display = None;
        self.highlight = None;
        self.emit(OverlayEvent::Hide);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn display(&self) -> Option<DisplayId> {
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::present_on;

    fn hl(column: usize, row: usize) -> Option<ZoneHighlight> {
        Some(ZoneHighlight {
            column: Some(column),
            row: Some(row),
        })
    }

    #[test]
    fn show_highlight_hide_emit_events() {
        let (tx, rx) = mpsc::channel();
        let mut o = ChannelOverlay::new(tx);
        o.show(Some(DisplayId(1)), hl(0, 3));
        o.update_highlight(hl(1, 3));
        o.hide();
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            [
                OverlayEvent::Show {
                    display: Some(DisplayId(1)),
                    highlight: hl(0, 3)
                },
                OverlayEvent::Highlight(hl(1, 3)),
                OverlayEvent::Hide,
            ]
        );
    }

    #[test]
    fn redundant_calls_are_silent() {
        let (tx, rx) = mpsc::channel();
        let mut o = ChannelOverlay::new(tx);
        o.hide();
        o.update_highlight(hl(0, 0));
        o.show(None, None);
        o.show(Some(DisplayId(2)), None);
        o.update_highlight(None);
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            [OverlayEvent::Show {
                display: None,
                highlight: None
            }]
        );
        assert!(o.is_visible());
        assert_eq!(o.display(), None);
    }

    #[test]
    fn present_on_moves_between_displays() {
        let (tx, rx) = mpsc::channel();
        let mut o = ChannelOverlay::new(tx);
        present_on(&mut o, DisplayId(1), hl(0, 0));
        present_on(&mut o, DisplayId(2), hl(2, 0));
        assert_eq!(o.display(), Some(DisplayId(2)));
        assert_eq!(o.highlight(), hl(2, 0));
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert!(
            matches!(
                events.as_slice(),
                [OverlayEvent::Show { .. }, OverlayEvent::Hide, OverlayEvent::Show { .. }]
            ),
            "expected show/hide/show, got: {events:#?}"
        );
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut o = ChannelOverlay::new(tx);
        o.show(Some(DisplayId(1)), None);
        o.hide();
        assert!(!o.is_visible());
    }

    #[test]
    fn detached_tracks_state() {
        let mut o = ChannelOverlay::detached();
        o.show(Some(DisplayId(3)), None);
        assert_eq!(o.display(), Some(DisplayId(3)));
    }
}
