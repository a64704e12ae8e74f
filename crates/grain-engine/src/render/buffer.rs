use std::any::Any;

use super::api::Backend;

/// Scalar type of one vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BaseType {
    Float,
    Int,
    Bool,
}

/// Semantic type of a vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    /// Stored as a 32-bit value.
    Bool,
}

impl ShaderDataType {
    /// Size in bytes.
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 4 * 2,
            ShaderDataType::Float3 => 4 * 3,
            ShaderDataType::Float4 => 4 * 4,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Int => 4,
            ShaderDataType::Int2 => 4 * 2,
            ShaderDataType::Int3 => 4 * 3,
            ShaderDataType::Int4 => 4 * 4,
            ShaderDataType::Bool => 4,
        }
    }

    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float | ShaderDataType::Int | ShaderDataType::Bool => 1,
            ShaderDataType::Float2 | ShaderDataType::Int2 => 2,
            ShaderDataType::Float3 | ShaderDataType::Int3 => 3,
            ShaderDataType::Float4 | ShaderDataType::Int4 => 4,
            ShaderDataType::Mat3 => 3 * 3,
            ShaderDataType::Mat4 => 4 * 4,
        }
    }

    pub const fn base_type(self) -> BaseType {
        match self {
            ShaderDataType::Float
            | ShaderDataType::Float2
            | ShaderDataType::Float3
            | ShaderDataType::Float4
            | ShaderDataType::Mat3
            | ShaderDataType::Mat4 => BaseType::Float,
            ShaderDataType::Int
            | ShaderDataType::Int2
            | ShaderDataType::Int3
            | ShaderDataType::Int4 => BaseType::Int,
            ShaderDataType::Bool => BaseType::Bool,
        }
    }

    /// Number of matrix columns, `None` for non-matrix types.
    pub const fn columns(self) -> Option<u32> {
        match self {
            ShaderDataType::Mat3 => Some(3),
            ShaderDataType::Mat4 => Some(4),
            _ => None,
        }
    }
}

/// One named attribute inside a [`BufferLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferElement {
    pub name: String,
    pub data_type: ShaderDataType,
    pub size: u32,
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            size: data_type.size(),
            offset: 0,
            normalized: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    pub fn component_count(&self) -> u32 {
        self.data_type.component_count()
    }
}

/// Interleaved vertex layout.
///
/// Offsets are assigned in one forward pass over the elements, in insertion
/// order; the stride is the sum of all element sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(elements: impl IntoIterator<Item = BufferElement>) -> Self {
        let mut layout = Self {
            elements: elements.into_iter().collect(),
            stride: 0,
        };
        layout.compute_offsets_and_stride();
        layout
    }

    fn compute_offsets_and_stride(&mut self) {
        let mut offset = 0;
        for element in &mut self.elements {
            element.offset = offset;
            offset += element.size;
        }
        self.stride = offset;
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BufferElement> {
        self.elements.iter()
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a BufferElement;
    type IntoIter = std::slice::Iter<'a, BufferElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// GPU vertex storage created by a [`RendererApi`](super::RendererApi).
///
/// The layout must be set before the buffer is handed to a
/// [`VertexArray`](super::VertexArray); once there, the array owns it and the
/// layout can no longer change.
pub trait VertexBuffer: Any {
    fn backend(&self) -> Backend;

    fn layout(&self) -> &BufferLayout;

    fn set_layout(&mut self, layout: BufferLayout);

    /// Capacity in bytes.
    fn size(&self) -> u64;

    /// Overwrites the buffer from offset 0.
    ///
    /// Panics if `data` is larger than the buffer.
    fn set_data(&mut self, data: &[u8]);

    fn as_any(&self) -> &dyn Any;
}

/// GPU storage for `u32` indices.
pub trait IndexBuffer: Any {
    fn backend(&self) -> Backend;

    /// Number of indices.
    fn count(&self) -> u32;

    fn as_any(&self) -> &dyn Any;
}

/// Checks a `set_data` write against the buffer capacity.
pub(crate) fn check_capacity(capacity: u64, data: &[u8]) {
    assert!(
        data.len() as u64 <= capacity,
        "vertex data ({} bytes) exceeds buffer capacity ({capacity} bytes)",
        data.len()
    );
}
