use std::fmt;

use crate::input::{Key, MouseButton};

use super::category::{EventCategory, EventKind};

/// The window was asked to close.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct WindowClose;

/// The drawable area changed size, in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowResize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct WindowFocus;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct WindowLostFocus;

/// Window origin moved, in physical screen pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WindowMoved {
    pub x: i32,
    pub y: i32,
}

/// `repeat_count` is 0 for the initial press and 1 for auto-repeat.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyPressed {
    pub key: Key,
    pub repeat_count: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyReleased {
    pub key: Key,
}

/// One committed character of text input.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyTyped {
    pub ch: char,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseButtonPressed {
    pub button: MouseButton,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseButtonReleased {
    pub button: MouseButton,
}

/// Cursor position in logical pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseMoved {
    pub x: f32,
    pub y: f32,
}

/// Scroll offsets in lines.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseScrolled {
    pub x_offset: f32,
    pub y_offset: f32,
}

/// Concrete event data, one variant per [`EventKind`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EventPayload {
    WindowClose(WindowClose),
    WindowResize(WindowResize),
    WindowFocus(WindowFocus),
    WindowLostFocus(WindowLostFocus),
    WindowMoved(WindowMoved),
    KeyPressed(KeyPressed),
    KeyReleased(KeyReleased),
    KeyTyped(KeyTyped),
    MouseButtonPressed(MouseButtonPressed),
    MouseButtonReleased(MouseButtonReleased),
    MouseMoved(MouseMoved),
    MouseScrolled(MouseScrolled),
}

/// A payload type that can be the target of a typed dispatch.
pub trait EventType: Sized + 'static {
    const KIND: EventKind;

    /// Borrows the payload if it has this type.
    fn from_payload(payload: &EventPayload) -> Option<&Self>;
}

macro_rules! event_types {
    ($($name:ident),* $(,)?) => {
        impl EventPayload {
            pub fn kind(&self) -> EventKind {
                match self {
                    $(EventPayload::$name(_) => EventKind::$name,)*
                }
            }
        }

        $(
            impl EventType for $name {
                const KIND: EventKind = EventKind::$name;

                fn from_payload(payload: &EventPayload) -> Option<&Self> {
                    match payload {
                        EventPayload::$name(inner) => Some(inner),
                        _ => None,
                    }
                }
            }

            impl From<$name> for EventPayload {
                fn from(value: $name) -> Self {
                    EventPayload::$name(value)
                }
            }

            impl From<$name> for Event {
                fn from(value: $name) -> Self {
                    Event::new(value)
                }
            }
        )*
    };
}

event_types!(
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
);

/// A single event instance travelling through one dispatch pass.
///
/// Invariant: `handled` only ever goes from `false` to `true`. Every setter
/// ORs into the flag, so a later stage cannot revive an event an earlier
/// stage consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    payload: EventPayload,
    handled: bool,
}

impl Event {
    pub fn new(payload: impl Into<EventPayload>) -> Self {
        Self {
            payload: payload.into(),
            handled: false,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    #[inline]
    pub fn categories(&self) -> EventCategory {
        self.kind().categories()
    }

    /// True if the event belongs to any of the categories in `category`.
    #[inline]
    pub fn is_in_category(&self, category: EventCategory) -> bool {
        self.categories().intersects(category)
    }

    #[inline]
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Typed view of the payload, `None` on kind mismatch.
    pub fn get<T: EventType>(&self) -> Option<&T> {
        T::from_payload(&self.payload)
    }

    #[inline]
    pub fn handled(&self) -> bool {
        self.handled
    }

    pub fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// ORs `handled` into the flag.
    pub fn set_handled(&mut self, handled: bool) {
        self.handled |= handled;
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        let described = match &self.payload {
            EventPayload::WindowClose(_)
            | EventPayload::WindowFocus(_)
            | EventPayload::WindowLostFocus(_) => write!(f, "{kind}"),
            EventPayload::WindowResize(e) => write!(f, "{kind}: {}x{}", e.width, e.height),
            EventPayload::WindowMoved(e) => write!(f, "{kind}: {}, {}", e.x, e.y),
            EventPayload::KeyPressed(e) => {
                write!(f, "{kind}: {} ({} repeats)", e.key, e.repeat_count)
            }
            EventPayload::KeyReleased(e) => write!(f, "{kind}: {}", e.key),
            EventPayload::KeyTyped(e) => write!(f, "{kind}: {:?}", e.ch),
            EventPayload::MouseButtonPressed(e) => write!(f, "{kind}: {}", e.button),
            EventPayload::MouseButtonReleased(e) => write!(f, "{kind}: {}", e.button),
            EventPayload::MouseMoved(e) => write!(f, "{kind}: {:.1}, {:.1}", e.x, e.y),
            EventPayload::MouseScrolled(e) => {
                write!(f, "{kind}: {:.1}, {:.1}", e.x_offset, e.y_offset)
            }
        };
        described?;
        if self.handled {
            f.write_str(" [handled]")?;
        }
        Ok(())
    }
}
