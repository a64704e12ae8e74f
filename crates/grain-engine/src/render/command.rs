use crate::coords::Viewport;
use crate::paint::Color;

use super::api::{Backend, RendererApi};
use super::vertex_array::VertexArray;

/// Thin forwarding layer over the injected [`RendererApi`].
pub struct RenderCommand {
    api: Box<dyn RendererApi>,
}

impl RenderCommand {
    pub fn new(api: Box<dyn RendererApi>) -> Self {
        Self { api }
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.api.backend()
    }

    #[inline]
    pub fn init(&mut self) {
        self.api.init();
    }

    #[inline]
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.api.set_viewport(viewport);
    }

    #[inline]
    pub fn set_clear_color(&mut self, color: Color) {
        self.api.set_clear_color(color);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.api.clear();
    }

    /// Draws an already bound vertex array.
    #[inline]
    pub fn draw_indexed(&mut self, vertex_array: &VertexArray, index_count: u32) {
        self.api.draw_indexed(vertex_array, index_count);
    }

    pub fn api_mut(&mut self) -> &mut dyn RendererApi {
        self.api.as_mut()
    }
}
