use crate::input::InputState;
use crate::render::{Renderer, ShaderLibrary};
use crate::time::FrameClock;

/// Runtime state shared with every layer hook.
///
/// Owned by the application and threaded through the layer callbacks, so
/// nothing here lives in a process-wide static.
pub struct EngineCtx {
    pub renderer: Renderer,
    pub clock: FrameClock,
    pub input: InputState,
    pub shaders: ShaderLibrary,
    window_size: (u32, u32),
    exit_requested: bool,
}

impl EngineCtx {
    pub fn new(renderer: Renderer, window_size: (u32, u32)) -> Self {
        Self {
            renderer,
            clock: FrameClock::new(),
            input: InputState::default(),
            shaders: ShaderLibrary::new(),
            window_size,
            exit_requested: false,
        }
    }

    /// Last non-degenerate window size, in physical pixels.
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Stops the loop once the current iteration completes.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(crate) fn take_exit_request(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }
}
