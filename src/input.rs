//! The state machine that turns raw input events into cycling and
//! drag-snapping.
//!
//! [`InputStateMachine`] owns the collaborators, the [`CycleEngine`] and the
//! [`DragSnapEngine`], and reacts to [`InputEvent`]s delivered in order from
//! a single main context.  Whether the OS should swallow an event is decided
//! separately by the pure [`disposition`] function, which is cheap enough to
//! call from the input callback itself.

use crate::config::Config;
use crate::cycle::CycleEngine;
use crate::drag::{DragSession, DragSnapEngine};
use crate::geometry::InputPoint;
use crate::keys::{CycleAction, KeyBindings, KeyCode, ModifierSet};
use crate::traits::{
    present_on, primary_height, DisplayEnumerator, OverlayPresenter, WindowPicker,
};
use crate::zones::ZoneCatalog;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A keyboard or pointer event, in the order the OS produced it.
///
/// # Wire format
///
/// Events arrive over the socket as externally tagged JSON:
///
/// ```json
/// {"ModifiersChanged":{"control":true,"option":true}}
/// {"KeyDown":{"key":"right","modifiers":"ctrl+opt"}}
/// {"MouseDown":{"x":400,"y":300}}
/// {"MouseDragged":{"x":420,"y":300}}
/// {"MouseUp":{"x":420,"y":300}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// The set of held modifiers changed.
    ModifiersChanged(ModifierSet),
    /// A key went down with `modifiers` held.
    KeyDown { key: KeyCode, modifiers: ModifierSet },
    /// Primary button pressed at a point (input space).
    MouseDown(InputPoint),
    /// Pointer moved with the primary button held.
    MouseDragged(InputPoint),
    /// Primary button released.
    MouseUp(InputPoint),
}

/// What the OS should do with an event after the engine has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the event continue to the focused application.
    PassThrough,
    /// Consume the event.
    Swallow,
}

/// Decide whether `event` is consumed.
///
/// Only key presses bound to a cycling action, with exactly the cycling
/// modifiers held, are swallowed.  Pointer events always pass through so
/// that the window being dragged still moves.
pub fn disposition(event: &InputEvent, keys: &KeyBindings) -> Disposition {
    match event {
        InputEvent::KeyDown { key, modifiers } if keys.action_for(*key, *modifiers).is_some() => {
            Disposition::Swallow
        }
        _ => Disposition::PassThrough,
    }
}

/// Coarse state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Idle,
    /// The cycling modifier is held and the overlay is up.
    CyclingOverlayVisible,
    /// A drag session is in progress.
    Dragging,
}

/// Routes input events to the cycle and drag engines and drives the
/// overlay.
///
/// Generic over the window backend `W` and the overlay `O` so it can run
/// against a real desktop, the [`VirtualDesktop`](crate::desktop::VirtualDesktop),
/// or a test recorder.
pub struct InputStateMachine<W: WindowPicker + DisplayEnumerator, O: OverlayPresenter> {
    wm: W,
    overlay: O,
    keys: KeyBindings,
    cycle: CycleEngine,
    drag: DragSnapEngine,
    cycling_held: bool,
    drag_held: bool,
    session: Option<DragSession<W::Window>>,
}

impl<W: WindowPicker + DisplayEnumerator, O: OverlayPresenter> InputStateMachine<W, O> {
    /// Create a machine with the built-in zones and the key bindings and
    /// engine settings from `config`.
    pub fn new(wm: W, overlay: O, config: &Config) -> Self {
        Self::with_catalog(wm, overlay, config, Arc::new(ZoneCatalog::default()))
    }

    pub fn with_catalog(wm: W, overlay: O, config: &Config, catalog: Arc<ZoneCatalog>) -> Self {
        let engine = &config.engine;
        Self {
            wm,
            overlay,
            keys: config.keys.clone(),
            cycle: CycleEngine::new(catalog.clone(), engine.default_row_index),
            drag: DragSnapEngine::new(catalog)
                .with_threshold(engine.drag_threshold)
                .with_tie_epsilon(engine.tie_epsilon),
            cycling_held: false,
            drag_held: false,
            session: None,
        }
    }

    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn cycle_engine(&self) -> &CycleEngine {
        &self.cycle
    }

    pub fn keys(&self) -> &KeyBindings {
        &self.keys
    }

    /// The in-flight drag session, if any.
    pub fn session(&self) -> Option<&DragSession<W::Window>> {
        self.session.as_ref()
    }

    pub fn state(&self) -> InputState {
        if self.session.is_some() {
            InputState::Dragging
        } else if self.cycling_held {
            InputState::CyclingOverlayVisible
        } else {
            InputState::Idle
        }
    }

    /// Process one event and report whether it should be swallowed.
    pub fn handle(&mut self, event: InputEvent) -> Disposition {
        let verdict = disposition(&event, &self.keys);
        match event {
            InputEvent::ModifiersChanged(held) => self.on_modifiers(held),
            InputEvent::KeyDown { key, modifiers } => self.on_key(key, modifiers),
            InputEvent::MouseDown(p) => self.on_mouse_down(p),
            InputEvent::MouseDragged(p) => self.on_mouse_dragged(p),
            InputEvent::MouseUp(p) => self.on_mouse_up(p),
        }
        verdict
    }

    fn on_modifiers(&mut self, held: ModifierSet) {
        let was_cycling = self.cycling_held;
        self.cycling_held = self.keys.cycling_held(held);
        if self.cycling_held && !was_cycling {
            debug!("cycling modifier down ({})", held.display_string());
            self.show_cycling_overlay();
        } else if !self.cycling_held && was_cycling {
            debug!("cycling modifier up");
            // A live drag keeps the overlay until it ends.
            if self.session.is_none() {
                self.overlay.hide();
            }
        }

        let was_dragging = self.drag_held;
        self.drag_held = self.keys.drag_held(held);
        if was_dragging && !self.drag_held {
            if let Some(session) = self.session.take() {
                info!("drag cancelled after {:?}", session.last_match.map(|m| m.cell));
                self.end_drag();
            }
        }
    }

    fn on_key(&mut self, key: KeyCode, modifiers: ModifierSet) {
        let Some(action) = self.keys.action_for(key, modifiers) else {
            return;
        };
        // A placed window proves the cycling modifier is down and the overlay
        // is up, even if the flags-changed event was missed.
        if self.cycle(action) {
            self.cycling_held = true;
        }
    }

    fn cycle(&mut self, action: CycleAction) -> bool {
        self.cycle.cycle(&self.wm, &mut self.overlay, action).is_some()
    }

    /// Show the overlay for the focused window's display, or wherever the
    /// overlay goes by default when nothing is focused.
    fn show_cycling_overlay(&mut self) {
        let target = self.wm.focused_window().and_then(|w| {
            let id = self.wm.window_id(&w)?;
            let display_id = self.wm.display_for(&w)?;
            let displays = self.wm.all_displays();
            let display = displays.into_iter().find(|d| d.id == display_id)?;
            Some((id, display))
        });
        match target {
            Some((id, display)) => {
                let highlight = self.cycle.highlight(id, &display);
                present_on(&mut self.overlay, display.id, Some(highlight));
            }
            None if !self.overlay.is_visible() => self.overlay.show(None, None),
            None => {}
        }
    }

    fn on_mouse_down(&mut self, p: InputPoint) {
        if !self.drag_held {
            return;
        }
        let window = self.wm.window_at_point(p);
        debug!("drag start at ({:.1}, {:.1}) on {:?}", p.x, p.y, window);
        self.session = Some(self.drag.begin(p, window));
    }

    fn on_mouse_dragged(&mut self, p: InputPoint) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let displays = self.wm.all_displays();
        let h = primary_height(&displays);
        if let Some(matched) = self.drag.track(session, p, &displays, h) {
            present_on(&mut self.overlay, matched.display, Some(matched.highlight()));
        }
    }

    fn on_mouse_up(&mut self, p: InputPoint) {
        let Some(session) = self.session.take() else {
            return;
        };
        debug!("drag end at ({:.1}, {:.1})", p.x, p.y);
        let displays = self.wm.all_displays();
        let h = primary_height(&displays);
        self.drag.commit(session, &self.wm, &displays, h);
        self.end_drag();
    }

    /// Settle the overlay after a drag: back to the cycling overlay when
    /// that modifier is still down, hidden otherwise.
    fn end_drag(&mut self) {
        if self.cycling_held {
            self.show_cycling_overlay();
        } else {
            self.overlay.hide();
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::{VirtualDesktop, WindowSpec};
    use crate::geometry::{InputRect, PlacementRect};
    use crate::overlay::{ChannelOverlay, OverlayEvent};
    use crate::traits::{DisplayId, DisplayInfo, FocusedWindowProvider, WindowId, ZoneHighlight};
    use std::sync::mpsc;

    const CTRL_OPT: ModifierSet = ModifierSet::CONTROL.with(ModifierSet::OPTION);

    fn display(id: u32, x: f64) -> DisplayInfo {
        let frame = PlacementRect::new(x, 0.0, 1200.0, 600.0);
        DisplayInfo {
            id: DisplayId(id),
            frame,
            usable_area: frame,
            scale: 1.0,
        }
    }

    fn desktop() -> VirtualDesktop {
        VirtualDesktop::new(
            vec![display(1, 0.0), display(2, 1200.0)],
            vec![
                WindowSpec {
                    id: WindowId(2),
                    title: "editor".into(),
                    frame: InputRect::new(1300.0, 100.0, 400.0, 300.0),
                },
                WindowSpec {
                    id: WindowId(1),
                    title: "terminal".into(),
                    frame: InputRect::new(100.0, 100.0, 400.0, 300.0),
                },
            ],
        )
    }

    fn machine() -> (
        InputStateMachine<VirtualDesktop, ChannelOverlay>,
        mpsc::Receiver<OverlayEvent>,
    ) {
        let (tx, rx) = mpsc::channel();
        let m = InputStateMachine::new(desktop(), ChannelOverlay::new(tx), &Config::default());
        (m, rx)
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::KeyDown {
            key: code,
            modifiers: CTRL_OPT,
        }
    }

    fn frame_of(m: &InputStateMachine<VirtualDesktop, ChannelOverlay>, id: u32) -> InputRect {
        m.wm().frame(&WindowId(id)).unwrap()
    }

    //  Disposition

    #[test]
    fn bound_keys_with_exact_modifiers_are_swallowed() {
        let keys = KeyBindings::default();
        assert_eq!(disposition(&key(KeyCode::RIGHT_ARROW), &keys), Disposition::Swallow);
        let extra = InputEvent::KeyDown {
            key: KeyCode::RIGHT_ARROW,
            modifiers: CTRL_OPT.with(ModifierSet::COMMAND),
        };
        assert_eq!(disposition(&extra, &keys), Disposition::PassThrough);
        assert_eq!(disposition(&key(KeyCode(0)), &keys), Disposition::PassThrough);
        assert_eq!(
            disposition(&InputEvent::MouseDown(InputPoint::new(0.0, 0.0)), &keys),
            Disposition::PassThrough
        );
        assert_eq!(
            disposition(&InputEvent::ModifiersChanged(CTRL_OPT), &keys),
            Disposition::PassThrough
        );
    }

    //  Cycling

    #[test]
    fn holding_cycling_modifier_shows_overlay_on_focused_display() {
        let (mut m, rx) = machine();
        m.handle(InputEvent::ModifiersChanged(CTRL_OPT));
        assert_eq!(m.state(), InputState::CyclingOverlayVisible);
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            [OverlayEvent::Show {
                display: Some(DisplayId(1)),
                highlight: Some(ZoneHighlight {
                    column: None,
                    row: Some(3)
                }),
            }]
        );

        m.handle(InputEvent::ModifiersChanged(ModifierSet::NONE));
        assert_eq!(m.state(), InputState::Idle);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), [OverlayEvent::Hide]);
    }

    #[test]
    fn no_focused_window_shows_default_overlay() {
        let (mut m, rx) = machine();
        m.wm().clear_focus();
        m.handle(InputEvent::ModifiersChanged(CTRL_OPT));
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            [OverlayEvent::Show {
                display: None,
                highlight: None
            }]
        );
        // Cycling with nothing focused is a silent no-op.
        assert_eq!(m.handle(key(KeyCode::RIGHT_ARROW)), Disposition::Swallow);
        assert!(m.cycle_engine().state().is_empty());
    }

    #[test]
    fn unannounced_key_press_enters_cycling_only_when_it_places() {
        let (mut m, _rx) = machine();
        m.wm().clear_focus();
        m.handle(key(KeyCode::RIGHT_ARROW));
        assert_eq!(m.state(), InputState::Idle);
        assert!(!m.overlay().is_visible());

        m.wm().focus(WindowId(1));
        m.handle(key(KeyCode::RIGHT_ARROW));
        assert_eq!(m.state(), InputState::CyclingOverlayVisible);
        assert!(m.overlay().is_visible());
    }

    #[test]
    fn next_column_places_focused_window() {
        let (mut m, _rx) = machine();
        m.handle(InputEvent::ModifiersChanged(CTRL_OPT));
        m.handle(key(KeyCode::RIGHT_ARROW));
        assert_eq!(frame_of(&m, 1), InputRect::new(0.0, 0.0, 400.0, 600.0));
        m.handle(key(KeyCode::RIGHT_ARROW));
        assert_eq!(frame_of(&m, 1), InputRect::new(0.0, 0.0, 600.0, 600.0));
        assert_eq!(m.overlay().highlight().and_then(|h| h.column), Some(1));
    }

    #[test]
    fn previous_row_walks_up_from_full_height() {
        let (mut m, _rx) = machine();
        m.handle(key(KeyCode::UP_ARROW));
        assert_eq!(frame_of(&m, 1), InputRect::new(0.0, 0.0, 1200.0, 400.0));
        m.handle(key(KeyCode::UP_ARROW));
        assert_eq!(frame_of(&m, 1), InputRect::new(0.0, 0.0, 1200.0, 300.0));
    }

    #[test]
    fn column_cycling_wraps_onto_next_display() {
        let (mut m, rx) = machine();
        for _ in 0..8 {
            m.handle(key(KeyCode::RIGHT_ARROW));
        }
        assert_eq!(m.wm().display_for(&WindowId(1)), Some(DisplayId(2)));
        assert_eq!(frame_of(&m, 1), InputRect::new(1200.0, 0.0, 400.0, 600.0));
        assert_eq!(m.overlay().display(), Some(DisplayId(2)));
        let events: Vec<OverlayEvent> = rx.try_iter().collect();
        assert!(events.contains(&OverlayEvent::Hide), "overlay should move: {events:#?}");

        // And back again.
        m.handle(key(KeyCode::LEFT_ARROW));
        assert_eq!(m.wm().display_for(&WindowId(1)), Some(DisplayId(1)));
        assert_eq!(frame_of(&m, 1), InputRect::new(800.0, 0.0, 400.0, 600.0));
    }

    #[test]
    fn row_and_column_compose() {
        let (mut m, _rx) = machine();
        m.handle(key(KeyCode::LEFT_ARROW)); // Right Third
        m.handle(key(KeyCode::DOWN_ARROW)); // Bottom 2/3
        assert_eq!(frame_of(&m, 1), InputRect::new(800.0, 200.0, 400.0, 400.0));
    }

    #[test]
    fn modifier_superset_does_not_cycle() {
        let (mut m, _rx) = machine();
        let before = frame_of(&m, 1);
        let d = m.handle(InputEvent::KeyDown {
            key: KeyCode::RIGHT_ARROW,
            modifiers: CTRL_OPT.with(ModifierSet::SHIFT),
        });
        assert_eq!(d, Disposition::PassThrough);
        assert_eq!(frame_of(&m, 1), before);
    }

    #[test]
    fn failed_placement_keeps_cycle_state() {
        let (mut m, _rx) = machine();
        m.wm().set_locked(WindowId(1), true);
        m.handle(key(KeyCode::RIGHT_ARROW));
        assert_eq!(frame_of(&m, 1), InputRect::new(100.0, 100.0, 400.0, 300.0));
        assert_eq!(
            m.cycle_engine().state().get(WindowId(1), crate::grid::Axis::Column),
            Some(0)
        );
    }

    //  Dragging

    fn drag_path(m: &mut InputStateMachine<VirtualDesktop, ChannelOverlay>, points: &[(f64, f64)]) {
        let (sx, sy) = points[0];
        m.handle(InputEvent::MouseDown(InputPoint::new(sx, sy)));
        for &(x, y) in &points[1..] {
            m.handle(InputEvent::MouseDragged(InputPoint::new(x, y)));
        }
    }

    #[test]
    fn shift_drag_snaps_grabbed_window() {
        let (mut m, rx) = machine();
        // Focus is on window 1; grab window 2 on the right display.
        m.handle(InputEvent::ModifiersChanged(ModifierSet::SHIFT));
        drag_path(&mut m, &[(1400.0, 200.0), (1450.0, 200.0), (1400.0, 90.0)]);
        assert_eq!(m.state(), InputState::Dragging);
        assert_eq!(m.overlay().display(), Some(DisplayId(2)));

        m.handle(InputEvent::MouseUp(InputPoint::new(1400.0, 90.0)));
        assert_eq!(m.state(), InputState::Idle);
        // Left Third × Top 1/3 on display 2.
        assert_eq!(frame_of(&m, 2), InputRect::new(1200.0, 0.0, 400.0, 200.0));
        assert!(!m.overlay().is_visible());
        assert_eq!(rx.try_iter().last(), Some(OverlayEvent::Hide));
    }

    #[test]
    fn short_drag_places_nothing() {
        let (mut m, rx) = machine();
        m.handle(InputEvent::ModifiersChanged(ModifierSet::SHIFT));
        let before = frame_of(&m, 1);
        drag_path(&mut m, &[(200.0, 200.0), (204.0, 204.0), (208.0, 200.0)]);
        m.handle(InputEvent::MouseUp(InputPoint::new(208.0, 200.0)));
        assert_eq!(frame_of(&m, 1), before);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn releasing_drag_modifier_cancels() {
        let (mut m, _rx) = machine();
        m.handle(InputEvent::ModifiersChanged(ModifierSet::SHIFT));
        let before = frame_of(&m, 1);
        drag_path(&mut m, &[(200.0, 200.0), (300.0, 300.0)]);
        assert!(m.overlay().is_visible());
        m.handle(InputEvent::ModifiersChanged(ModifierSet::NONE));
        assert!(m.session().is_none());
        assert!(!m.overlay().is_visible());
        m.handle(InputEvent::MouseUp(InputPoint::new(300.0, 300.0)));
        assert_eq!(frame_of(&m, 1), before);
    }

    #[test]
    fn drag_on_empty_desktop_area_places_focused_window() {
        let (mut m, _rx) = machine();
        m.handle(InputEvent::ModifiersChanged(ModifierSet::SHIFT));
        drag_path(&mut m, &[(900.0, 500.0), (600.0, 300.0)]);
        assert!(m.session().unwrap().window.is_none());
        m.handle(InputEvent::MouseUp(InputPoint::new(600.0, 300.0)));
        assert_eq!(frame_of(&m, 1), InputRect::new(0.0, 0.0, 1200.0, 600.0));
    }

    #[test]
    fn mouse_without_drag_modifier_is_ignored() {
        let (mut m, rx) = machine();
        drag_path(&mut m, &[(200.0, 200.0), (600.0, 300.0)]);
        assert!(m.session().is_none());
        m.handle(InputEvent::MouseUp(InputPoint::new(600.0, 300.0)));
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn cycling_release_during_drag_defers_hide() {
        let (mut m, rx) = machine();
        m.handle(InputEvent::ModifiersChanged(CTRL_OPT.with(ModifierSet::SHIFT)));
        drag_path(&mut m, &[(200.0, 200.0), (600.0, 300.0)]);
        let _ = rx.try_iter().count();

        // Cycling modifiers released, shift still down: overlay stays.
        m.handle(InputEvent::ModifiersChanged(ModifierSet::SHIFT));
        assert!(m.overlay().is_visible());
        assert_eq!(m.state(), InputState::Dragging);

        m.handle(InputEvent::MouseUp(InputPoint::new(600.0, 300.0)));
        assert!(!m.overlay().is_visible());
    }

    #[test]
    fn cycling_still_held_after_drag_keeps_overlay() {
        let (mut m, _rx) = machine();
        m.handle(InputEvent::ModifiersChanged(CTRL_OPT.with(ModifierSet::SHIFT)));
        drag_path(&mut m, &[(200.0, 200.0), (100.0, 90.0)]);
        m.handle(InputEvent::MouseUp(InputPoint::new(100.0, 90.0)));
        assert_eq!(m.state(), InputState::CyclingOverlayVisible);
        assert!(m.overlay().is_visible());
        // Highlight now reflects the window's cycle position on its display.
        assert_eq!(m.overlay().display(), Some(DisplayId(1)));
    }
}
