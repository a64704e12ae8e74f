//! wgpu device and surface ownership for the windowed backend.
//!
//! [`Gpu`] brings up the adapter, device and queue for one window and keeps
//! its surface configured across resizes and present-mode changes.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::{present_mode_for, GpuInit};
pub use surface::SurfaceErrorAction;
