//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The window layer translates platform input into events; [`InputState`]
//! folds those events into pollable state.

mod state;
mod types;

pub use state::InputState;
pub use types::{Key, MouseButton};
