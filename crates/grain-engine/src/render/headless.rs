//! Backend that records every call instead of talking to a GPU.
//!
//! Used when no GPU is wanted (CI, servers) and as the fallback when the wgpu
//! backend fails to come up. The [`CommandLog`] is shared, so whoever created
//! the backend can inspect what the renderer issued.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::paint::Color;

use super::api::{Backend, RendererApi};
use super::buffer::{check_capacity, BufferLayout, IndexBuffer, VertexBuffer};
use super::error::RenderError;
use super::shader::Shader;
use super::vertex_array::{DrawCall, VertexArray};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    Init,
    SetViewport(Viewport),
    SetClearColor(Color),
    Clear,
    BindShader(String),
    BindVertexArray { vertex_buffers: usize, indexed: bool },
    DrawIndexed(u32),
    DrawArrays(u32),
}

/// Shared, append-only record of [`RenderOp`]s.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    ops: Rc<RefCell<Vec<RenderOp>>>,
}

impl CommandLog {
    pub fn push(&self, op: RenderOp) {
        log::trace!("headless: {op:?}");
        self.ops.borrow_mut().push(op);
    }

    /// Snapshot of everything recorded so far.
    pub fn ops(&self) -> Vec<RenderOp> {
        self.ops.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.ops.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }

    /// Number of draw operations (indexed or not) recorded.
    pub fn draw_count(&self) -> usize {
        self.ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, RenderOp::DrawIndexed(_) | RenderOp::DrawArrays(_)))
            .count()
    }
}

#[derive(Debug)]
pub struct HeadlessVertexBuffer {
    data: Vec<u8>,
    layout: BufferLayout,
}

impl HeadlessVertexBuffer {
    pub fn from_floats(vertices: &[f32]) -> Self {
        Self {
            data: bytemuck::cast_slice(vertices).to_vec(),
            layout: BufferLayout::default(),
        }
    }

    pub fn zeroed(size: u64) -> Self {
        Self {
            data: vec![0; size as usize],
            layout: BufferLayout::default(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl VertexBuffer for HeadlessVertexBuffer {
    fn backend(&self) -> Backend {
        Backend::Headless
    }

    fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn set_layout(&mut self, layout: BufferLayout) {
        self.layout = layout;
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_data(&mut self, data: &[u8]) {
        check_capacity(self.size(), data);
        self.data[..data.len()].copy_from_slice(data);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct HeadlessIndexBuffer {
    indices: Vec<u32>,
}

impl HeadlessIndexBuffer {
    pub fn new(indices: &[u32]) -> Self {
        Self {
            indices: indices.to_vec(),
        }
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

impl IndexBuffer for HeadlessIndexBuffer {
    fn backend(&self) -> Backend {
        Backend::Headless
    }

    fn count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct HeadlessShader {
    name: String,
    pub vertex_src: String,
    pub fragment_src: String,
}

impl Shader for HeadlessShader {
    fn name(&self) -> &str {
        &self.name
    }

    fn backend(&self) -> Backend {
        Backend::Headless
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Recording [`RendererApi`].
#[derive(Debug, Default)]
pub struct HeadlessApi {
    log: CommandLog,
}

impl HeadlessApi {
    pub fn new(log: CommandLog) -> Self {
        Self { log }
    }

    pub fn log(&self) -> &CommandLog {
        &self.log
    }
}

impl RendererApi for HeadlessApi {
    fn backend(&self) -> Backend {
        Backend::Headless
    }

    fn init(&mut self) {
        self.log.push(RenderOp::Init);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.log.push(RenderOp::SetViewport(viewport));
    }

    fn set_clear_color(&mut self, color: Color) {
        self.log.push(RenderOp::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.log.push(RenderOp::Clear);
    }

    fn bind_shader(&mut self, shader: &dyn Shader) {
        assert_eq!(
            shader.backend(),
            Backend::Headless,
            "shader '{}' was created by a different backend",
            shader.name()
        );
        self.log.push(RenderOp::BindShader(shader.name().to_string()));
    }

    fn bind_vertex_array(&mut self, vertex_array: &VertexArray) {
        assert_eq!(
            vertex_array.backend(),
            Backend::Headless,
            "vertex array was created by a different backend"
        );
        self.log.push(RenderOp::BindVertexArray {
            vertex_buffers: vertex_array.vertex_buffers().len(),
            indexed: vertex_array.index_buffer().is_some(),
        });
    }

    fn draw_indexed(&mut self, vertex_array: &VertexArray, index_count: u32) {
        match vertex_array.draw_call(index_count) {
            DrawCall::Indexed { count } => self.log.push(RenderOp::DrawIndexed(count)),
            DrawCall::Arrays { count } => self.log.push(RenderOp::DrawArrays(count)),
            DrawCall::Empty => {}
        }
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Box<dyn VertexBuffer> {
        Box::new(HeadlessVertexBuffer::from_floats(vertices))
    }

    fn create_dynamic_vertex_buffer(&mut self, size: u64) -> Box<dyn VertexBuffer> {
        Box::new(HeadlessVertexBuffer::zeroed(size))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Box<dyn IndexBuffer> {
        Box::new(HeadlessIndexBuffer::new(indices))
    }

    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        if vertex_src.trim().is_empty() || fragment_src.trim().is_empty() {
            return Err(RenderError::EmptySource { name: name.to_string() });
        }
        Ok(Rc::new(HeadlessShader {
            name: name.to_string(),
            vertex_src: vertex_src.to_string(),
            fragment_src: fragment_src.to_string(),
        }))
    }
}
