use std::path::Path;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::paint::Color;

use super::api::{Backend, RendererApi};
use super::buffer::{IndexBuffer, VertexBuffer};
use super::command::RenderCommand;
use super::error::RenderError;
use super::shader::{read_shader_file, split_stages, Shader};
use super::vertex_array::VertexArray;

/// Clear color applied by every `begin_scene`.
pub const SCENE_CLEAR_COLOR: Color = Color::rgba(0.2, 0.3, 0.3, 1.0);

/// Scene-level facade: `begin_scene` / `submit` / `end_scene` on top of a
/// [`RenderCommand`].
///
/// Also the single factory for GPU resources, so everything a layer creates
/// is tied to the backend this renderer was built with.
pub struct Renderer {
    command: RenderCommand,
    viewport: Viewport,
}

impl Renderer {
    /// Wraps `api` and runs its backend setup.
    pub fn new(api: Box<dyn RendererApi>) -> Self {
        api.backend().require();
        let mut command = RenderCommand::new(api);
        command.init();
        log::info!("renderer initialized (backend: {})", command.backend());
        Self {
            command,
            viewport: Viewport::default(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.command.backend()
    }

    /// Last viewport forwarded to the backend.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn begin_scene(&mut self) {
        self.command.set_clear_color(SCENE_CLEAR_COLOR);
        self.command.clear();
    }

    /// Reserved for batching; submissions are issued immediately.
    pub fn end_scene(&mut self) {}

    /// Binds `shader`, binds `vertex_array`, then draws it, in that order.
    pub fn submit(&mut self, shader: &dyn Shader, vertex_array: &VertexArray) {
        let api = self.command.api_mut();
        api.bind_shader(shader);
        api.bind_vertex_array(vertex_array);
        self.command.draw_indexed(vertex_array, 0);
    }

    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::full(width, height);
        self.command.set_viewport(self.viewport);
    }

    pub fn command(&mut self) -> &mut RenderCommand {
        &mut self.command
    }

    // ── resources ─────────────────────────────────────────────────────────

    pub fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Box<dyn VertexBuffer> {
        self.command.api_mut().create_vertex_buffer(vertices)
    }

    pub fn create_dynamic_vertex_buffer(&mut self, size: u64) -> Box<dyn VertexBuffer> {
        self.command.api_mut().create_dynamic_vertex_buffer(size)
    }

    pub fn create_index_buffer(&mut self, indices: &[u32]) -> Box<dyn IndexBuffer> {
        self.command.api_mut().create_index_buffer(indices)
    }

    pub fn create_vertex_array(&mut self) -> VertexArray {
        self.command.api_mut().create_vertex_array()
    }

    pub fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        self.command
            .api_mut()
            .create_shader(name, vertex_src, fragment_src)
    }

    /// Creates a shader from one source split on `#type` markers.
    pub fn create_shader_from_source(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        let stages = split_stages(name, source)?;
        self.create_shader(name, &stages.vertex, &stages.fragment)
    }

    /// Reads a combined shader file, named after its file stem.
    pub fn create_shader_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        let path = path.as_ref();
        let (name, source) = read_shader_file(path)?;
        log::debug!("loading shader '{name}' from {}", path.display());
        self.create_shader_from_source(&name, &source)
    }
}
