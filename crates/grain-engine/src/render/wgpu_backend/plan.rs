use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::paint::Color;
use crate::render::vertex_array::DrawCall;

use super::resources::ShaderProgram;

/// Vertex buffer layout as the pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct VertexLayoutKey {
    pub stride: u64,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

#[derive(Clone)]
pub(super) struct BoundArray {
    pub vertex_buffers: Vec<(wgpu::Buffer, VertexLayoutKey)>,
    pub index_buffer: Option<wgpu::Buffer>,
}

impl BoundArray {
    pub fn layouts(&self) -> Vec<VertexLayoutKey> {
        self.vertex_buffers.iter().map(|(_, l)| l.clone()).collect()
    }
}

pub(super) struct PlannedDraw {
    pub program: ShaderProgram,
    pub array: BoundArray,
    pub call: DrawCall,
    pub viewport: Option<Viewport>,
    pub blend: bool,
}

/// State and draws recorded by the API between two presents.
#[derive(Default)]
pub(super) struct FramePlan {
    pub clear_color: Color,
    pub clear: Option<Color>,
    pub viewport: Option<Viewport>,
    pub blend: bool,
    pub shader: Option<ShaderProgram>,
    pub array: Option<BoundArray>,
    pub draws: Vec<PlannedDraw>,
}

/// What a present has to execute.
pub(super) struct FrameWork {
    pub clear: Option<Color>,
    pub draws: Vec<PlannedDraw>,
}

impl FramePlan {
    /// Takes this frame's work. Bound state and the viewport persist.
    pub fn take_work(&mut self) -> FrameWork {
        FrameWork {
            clear: self.clear.take(),
            draws: std::mem::take(&mut self.draws),
        }
    }
}

pub(super) type SharedPlan = Rc<RefCell<FramePlan>>;
