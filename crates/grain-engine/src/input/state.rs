use std::collections::HashSet;

use crate::event::{Event, EventPayload};

use super::types::{Key, MouseButton};

/// Pollable input state for the application window.
///
/// Fed from the same event stream the layers see, before propagation, so a
/// layer that swallows an event does not hide it from polling.
#[derive(Debug)]
pub struct InputState {
    focused: bool,
    cursor: (f32, f32),
    keys_down: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            focused: true,
            cursor: (0.0, 0.0),
            keys_down: HashSet::new(),
            buttons_down: HashSet::new(),
        }
    }
}

impl InputState {
    pub fn apply(&mut self, event: &Event) {
        match event.payload() {
            EventPayload::KeyPressed(e) => {
                self.keys_down.insert(e.key);
            }
            EventPayload::KeyReleased(e) => {
                self.keys_down.remove(&e.key);
            }
            EventPayload::MouseButtonPressed(e) => {
                self.buttons_down.insert(e.button);
            }
            EventPayload::MouseButtonReleased(e) => {
                self.buttons_down.remove(&e.button);
            }
            EventPayload::MouseMoved(e) => {
                self.cursor = (e.x, e.y);
            }
            EventPayload::WindowFocus(_) => {
                self.focused = true;
            }
            EventPayload::WindowLostFocus(_) => {
                // Releases are not delivered to an unfocused window.
                self.focused = false;
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Last known cursor position in logical pixels.
    pub fn mouse_position(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn mouse_x(&self) -> f32 {
        self.cursor.0
    }

    pub fn mouse_y(&self) -> f32 {
        self.cursor.1
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}
