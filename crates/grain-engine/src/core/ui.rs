use crate::event::{Event, EventCategory};

use super::ctx::EngineCtx;
use super::layer::Layer;

/// A layer that brackets the UI pass.
///
/// `begin` runs before any layer's `on_ui_render` in a frame and `end` after
/// all of them. While blocking, the layer swallows mouse or keyboard events
/// that the UI wants to capture, so layers below it never see them.
pub trait UiLayer: Layer {
    fn begin(&mut self, ctx: &mut EngineCtx);

    fn end(&mut self, ctx: &mut EngineCtx);

    fn block_events(&mut self, block: bool);

    /// Declares what the UI currently wants to own.
    fn set_capture(&mut self, mouse: bool, keyboard: bool);

    fn wants_capture_mouse(&self) -> bool;

    fn wants_capture_keyboard(&self) -> bool;
}

/// The always-present UI overlay.
///
/// It draws nothing itself; it owns the UI frame bracket and the capture
/// flags that decide which input categories stop here.
#[derive(Debug)]
pub struct UiOverlay {
    blocking: bool,
    capture_mouse: bool,
    capture_keyboard: bool,
    in_frame: bool,
    frames: u64,
}

impl UiOverlay {
    pub fn new() -> Self {
        Self {
            blocking: true,
            capture_mouse: false,
            capture_keyboard: false,
            in_frame: false,
            frames: 0,
        }
    }

    /// Number of completed UI frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for UiOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for UiOverlay {
    fn name(&self) -> &str {
        "UiOverlay"
    }

    fn on_attach(&mut self, _ctx: &mut EngineCtx) {
        log::debug!("ui overlay attached");
    }

    fn on_detach(&mut self) {
        log::debug!("ui overlay detached after {} frames", self.frames);
    }

    fn on_event(&mut self, event: &mut Event) {
        if !self.blocking {
            return;
        }
        let mouse = event.is_in_category(EventCategory::MOUSE) && self.capture_mouse;
        let keyboard = event.is_in_category(EventCategory::KEYBOARD) && self.capture_keyboard;
        event.set_handled(mouse || keyboard);
    }

    fn as_ui_layer(&mut self) -> Option<&mut dyn UiLayer> {
        Some(self)
    }
}

impl UiLayer for UiOverlay {
    fn begin(&mut self, _ctx: &mut EngineCtx) {
        debug_assert!(!self.in_frame, "ui frame begun twice");
        self.in_frame = true;
    }

    fn end(&mut self, _ctx: &mut EngineCtx) {
        debug_assert!(self.in_frame, "ui frame ended without begin");
        self.in_frame = false;
        self.frames += 1;
    }

    fn block_events(&mut self, block: bool) {
        self.blocking = block;
    }

    fn set_capture(&mut self, mouse: bool, keyboard: bool) {
        self.capture_mouse = mouse;
        self.capture_keyboard = keyboard;
    }

    fn wants_capture_mouse(&self) -> bool {
        self.capture_mouse
    }

    fn wants_capture_keyboard(&self) -> bool {
        self.capture_keyboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyPressed, MouseButtonPressed, MouseMoved, WindowResize};
    use crate::input::{Key, MouseButton};

    fn deliver(ui: &mut UiOverlay, event: impl Into<Event>) -> bool {
        let mut event = event.into();
        ui.on_event(&mut event);
        event.handled()
    }

    // ── capture ──────────────────────────────────────────────────────────

    #[test]
    fn nothing_is_captured_by_default() {
        let mut ui = UiOverlay::new();
        assert!(!deliver(&mut ui, MouseMoved { x: 1.0, y: 2.0 }));
        assert!(!deliver(&mut ui, KeyPressed { key: Key::A, repeat_count: 0 }));
    }

    #[test]
    fn mouse_capture_swallows_mouse_events_only() {
        let mut ui = UiOverlay::new();
        ui.set_capture(true, false);
        assert!(deliver(&mut ui, MouseMoved { x: 1.0, y: 2.0 }));
        assert!(deliver(&mut ui, MouseButtonPressed { button: MouseButton::Left }));
        assert!(!deliver(&mut ui, KeyPressed { key: Key::A, repeat_count: 0 }));
    }

    #[test]
    fn keyboard_capture_swallows_key_events_only() {
        let mut ui = UiOverlay::new();
        ui.set_capture(false, true);
        assert!(deliver(&mut ui, KeyPressed { key: Key::Space, repeat_count: 1 }));
        assert!(!deliver(&mut ui, MouseMoved { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn application_events_are_never_captured() {
        let mut ui = UiOverlay::new();
        ui.set_capture(true, true);
        assert!(!deliver(&mut ui, WindowResize { width: 10, height: 10 }));
    }

    #[test]
    fn not_blocking_lets_everything_through() {
        let mut ui = UiOverlay::new();
        ui.set_capture(true, true);
        ui.block_events(false);
        assert!(!deliver(&mut ui, MouseMoved { x: 1.0, y: 1.0 }));
        assert!(!deliver(&mut ui, KeyPressed { key: Key::A, repeat_count: 0 }));
    }

    #[test]
    fn already_handled_events_stay_handled() {
        let mut ui = UiOverlay::new();
        let mut event = Event::new(MouseMoved { x: 1.0, y: 1.0 });
        event.mark_handled();
        ui.on_event(&mut event);
        assert!(event.handled());
    }

    #[test]
    fn capture_flags_are_reported() {
        let mut ui = UiOverlay::new();
        ui.set_capture(true, false);
        assert!(ui.wants_capture_mouse());
        assert!(!ui.wants_capture_keyboard());
    }
}
