//! wgpu implementation of the renderer family.
//!
//! Shaders are WGSL with `vs_main` / `fs_main` entry points. Vertex
//! attributes are bound by slot: `@location(n)` matches the n-th attribute
//! recorded by the vertex array.

mod api;
mod context;
mod plan;
mod resources;

use std::sync::Arc;

use anyhow::Result;

use crate::device::{Gpu, GpuInit};

pub use api::WgpuApi;
pub use context::WgpuContext;
pub use resources::{WgpuIndexBuffer, WgpuShader, WgpuVertexBuffer};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Brings up a device on `window` and returns the API half (for the
/// renderer) and the presentation half (for the window).
pub fn create(
    window: Arc<winit::window::Window>,
    init: GpuInit,
) -> Result<(WgpuApi, WgpuContext)> {
    let gpu = pollster::block_on(Gpu::new(window, init))?;
    let info = gpu.adapter_info();
    log::info!("graphics adapter: {} ({:?})", info.name, info.backend);
    let plan = plan::SharedPlan::default();
    let api = WgpuApi::new(gpu.device().clone(), gpu.queue().clone(), plan.clone());
    Ok((api, WgpuContext::new(gpu, plan)))
}
