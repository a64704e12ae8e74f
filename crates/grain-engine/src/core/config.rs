use crate::device::GpuInit;
use crate::render::Backend;
use crate::window::WindowProps;

/// Everything needed to bring up an [`Application`](super::Application).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: WindowProps,
    pub backend: Backend,
    pub gpu: GpuInit,
    /// Attach the always-present UI overlay at construction.
    pub ui_overlay: bool,
    /// Headless only: deliver a `WindowClose` after this many presented frames.
    pub headless_frames: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowProps::default(),
            backend: Backend::Wgpu,
            gpu: GpuInit::default(),
            ui_overlay: true,
            headless_frames: None,
        }
    }
}

impl AppConfig {
    pub fn new(window: WindowProps) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_headless_frames(mut self, frames: u64) -> Self {
        self.headless_frames = Some(frames);
        self
    }

    pub fn with_ui_overlay(mut self, enabled: bool) -> Self {
        self.ui_overlay = enabled;
        self
    }
}
