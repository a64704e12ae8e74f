//! Platform window collaborator.
//!
//! The application only talks to a [`Window`]: size queries plus one
//! `update` per loop iteration that delivers pending events to a sink and
//! then presents the frame. Two implementations ship with the engine:
//! [`WinitWindow`] for a real OS window and [`HeadlessWindow`] for running
//! without one.

mod headless;
mod props;
mod winit_window;

pub use headless::{HeadlessHandle, HeadlessWindow};
pub use props::WindowProps;
pub use winit_window::WinitWindow;

use crate::event::Event;

/// A platform window as seen by the application loop.
pub trait Window {
    /// Drawable width in physical pixels.
    fn width(&self) -> u32;

    /// Drawable height in physical pixels.
    fn height(&self) -> u32;

    fn title(&self) -> &str;

    fn set_vsync(&mut self, enabled: bool);

    fn is_vsync(&self) -> bool;

    /// Processes pending platform events, then presents the frame.
    ///
    /// Every event is handed to `on_event` synchronously, in arrival order,
    /// before this returns. The sink is never re-entered.
    fn update(&mut self, on_event: &mut dyn FnMut(&mut Event));
}

/// Presentation side of a window, owned by it.
pub trait GraphicsContext {
    /// Called with the new drawable size before the resize event is delivered.
    fn resize(&mut self, width: u32, height: u32);

    /// Executes the frame recorded so far and presents it.
    fn swap_buffers(&mut self);

    fn set_vsync(&mut self, enabled: bool) {
        let _ = enabled;
    }
}
