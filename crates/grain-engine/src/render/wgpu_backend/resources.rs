use std::any::Any;

use crate::render::api::Backend;
use crate::render::buffer::{check_capacity, BufferLayout, IndexBuffer, VertexBuffer};
use crate::render::shader::Shader;

/// Vertex storage in a wgpu buffer. Writable through the queue.
pub struct WgpuVertexBuffer {
    pub(super) buffer: wgpu::Buffer,
    queue: wgpu::Queue,
    layout: BufferLayout,
    size: u64,
}

impl WgpuVertexBuffer {
    pub(super) fn new(buffer: wgpu::Buffer, queue: wgpu::Queue, size: u64) -> Self {
        Self {
            buffer,
            queue,
            layout: BufferLayout::default(),
            size,
        }
    }
}

impl VertexBuffer for WgpuVertexBuffer {
    fn backend(&self) -> Backend {
        Backend::Wgpu
    }

    fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn set_layout(&mut self, layout: BufferLayout) {
        self.layout = layout;
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn set_data(&mut self, data: &[u8]) {
        check_capacity(self.size, data);
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        if data.len() % align == 0 {
            self.queue.write_buffer(&self.buffer, 0, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(align), 0);
            self.queue.write_buffer(&self.buffer, 0, &padded);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct WgpuIndexBuffer {
    pub(super) buffer: wgpu::Buffer,
    count: u32,
}

impl WgpuIndexBuffer {
    pub(super) fn new(buffer: wgpu::Buffer, count: u32) -> Self {
        Self { buffer, count }
    }
}

impl IndexBuffer for WgpuIndexBuffer {
    fn backend(&self) -> Backend {
        Backend::Wgpu
    }

    fn count(&self) -> u32 {
        self.count
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Compiled modules for both stages.
#[derive(Clone)]
pub(super) struct ShaderProgram {
    pub id: u64,
    pub name: String,
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

pub struct WgpuShader {
    pub(super) program: ShaderProgram,
}

impl Shader for WgpuShader {
    fn name(&self) -> &str {
        &self.program.name
    }

    fn backend(&self) -> Backend {
        Backend::Wgpu
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
