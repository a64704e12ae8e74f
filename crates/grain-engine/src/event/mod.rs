//! Typed, categorized events flowing from the window into the layer stack.
//!
//! An [`Event`] wraps a closed set of payloads ([`EventPayload`]). Category
//! membership is derived from the kind, so coarse filtering (e.g. "all mouse
//! input") never needs to inspect the concrete payload.
//!
//! Routing to typed handlers goes through [`EventDispatcher`].

mod category;
mod dispatcher;
mod types;

pub use category::{EventCategory, EventKind};
pub use dispatcher::EventDispatcher;
pub use types::{
    Event, EventPayload, EventType, KeyPressed, KeyReleased, KeyTyped, MouseButtonPressed,
    MouseButtonReleased, MouseMoved, MouseScrolled, WindowClose, WindowFocus, WindowLostFocus,
    WindowMoved, WindowResize,
};
