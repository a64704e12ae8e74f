use std::fmt;

bitflags::bitflags! {
    /// Coarse event classes used for filtering without full type dispatch.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct EventCategory: u8 {
        const APPLICATION  = 1 << 0;
        const INPUT        = 1 << 1;
        const KEYBOARD     = 1 << 2;
        const MOUSE        = 1 << 3;
        const MOUSE_BUTTON = 1 << 4;
    }
}

/// Closed enumeration of event kinds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    WindowClose,
    WindowResize,
    WindowFocus,
    WindowLostFocus,
    WindowMoved,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::WindowClose,
        EventKind::WindowResize,
        EventKind::WindowFocus,
        EventKind::WindowLostFocus,
        EventKind::WindowMoved,
        EventKind::KeyPressed,
        EventKind::KeyReleased,
        EventKind::KeyTyped,
        EventKind::MouseButtonPressed,
        EventKind::MouseButtonReleased,
        EventKind::MouseMoved,
        EventKind::MouseScrolled,
    ];

    /// Category bitmask for this kind. Fixed per kind.
    pub const fn categories(self) -> EventCategory {
        match self {
            EventKind::WindowClose
            | EventKind::WindowResize
            | EventKind::WindowFocus
            | EventKind::WindowLostFocus
            | EventKind::WindowMoved => EventCategory::APPLICATION,

            EventKind::KeyPressed | EventKind::KeyReleased | EventKind::KeyTyped => {
                EventCategory::INPUT.union(EventCategory::KEYBOARD)
            }

            EventKind::MouseButtonPressed | EventKind::MouseButtonReleased => EventCategory::INPUT
                .union(EventCategory::MOUSE)
                .union(EventCategory::MOUSE_BUTTON),

            EventKind::MouseMoved | EventKind::MouseScrolled => {
                EventCategory::INPUT.union(EventCategory::MOUSE)
            }
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EventKind::WindowClose => "WindowClose",
            EventKind::WindowResize => "WindowResize",
            EventKind::WindowFocus => "WindowFocus",
            EventKind::WindowLostFocus => "WindowLostFocus",
            EventKind::WindowMoved => "WindowMoved",
            EventKind::KeyPressed => "KeyPressed",
            EventKind::KeyReleased => "KeyReleased",
            EventKind::KeyTyped => "KeyTyped",
            EventKind::MouseButtonPressed => "MouseButtonPressed",
            EventKind::MouseButtonReleased => "MouseButtonReleased",
            EventKind::MouseMoved => "MouseMoved",
            EventKind::MouseScrolled => "MouseScrolled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── categories ────────────────────────────────────────────────────────

    #[test]
    fn window_kinds_are_application_only() {
        for kind in [
            EventKind::WindowClose,
            EventKind::WindowResize,
            EventKind::WindowFocus,
            EventKind::WindowLostFocus,
            EventKind::WindowMoved,
        ] {
            assert_eq!(kind.categories(), EventCategory::APPLICATION, "{kind}");
        }
    }

    #[test]
    fn key_kinds_are_keyboard_input() {
        for kind in [EventKind::KeyPressed, EventKind::KeyReleased, EventKind::KeyTyped] {
            let c = kind.categories();
            assert!(c.contains(EventCategory::INPUT | EventCategory::KEYBOARD));
            assert!(!c.intersects(EventCategory::MOUSE | EventCategory::APPLICATION));
        }
    }

    #[test]
    fn mouse_button_kinds_carry_button_category() {
        let c = EventKind::MouseButtonPressed.categories();
        assert!(c.contains(EventCategory::INPUT | EventCategory::MOUSE | EventCategory::MOUSE_BUTTON));
        assert!(!EventKind::MouseMoved.categories().contains(EventCategory::MOUSE_BUTTON));
    }

    #[test]
    fn every_kind_has_a_category() {
        for kind in EventKind::ALL {
            assert!(!kind.categories().is_empty(), "{kind}");
        }
    }
}
