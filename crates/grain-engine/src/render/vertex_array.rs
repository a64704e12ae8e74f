use super::api::Backend;
use super::buffer::{BaseType, IndexBuffer, ShaderDataType, VertexBuffer};

/// One attribute slot recorded when a vertex buffer is added.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexAttribute {
    pub slot: u32,
    pub buffer_index: usize,
    pub data_type: ShaderDataType,
    pub component_count: u32,
    pub base_type: BaseType,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

/// What a draw of a vertex array resolves to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    Indexed { count: u32 },
    Arrays { count: u32 },
    /// Nothing bound, nothing to draw.
    Empty,
}

/// Vertex buffers plus an optional index buffer, with the attribute bindings
/// derived from their layouts.
///
/// Attribute slots increase monotonically across every buffer ever added to
/// this array and are never reused.
pub struct VertexArray {
    backend: Backend,
    vertex_buffers: Vec<Box<dyn VertexBuffer>>,
    index_buffer: Option<Box<dyn IndexBuffer>>,
    attributes: Vec<VertexAttribute>,
    next_slot: u32,
}

impl VertexArray {
    /// Creates an empty array for `backend`.
    ///
    /// Panics for [`Backend::None`].
    pub fn new(backend: Backend) -> Self {
        backend.require();
        Self {
            backend,
            vertex_buffers: Vec::new(),
            index_buffer: None,
            attributes: Vec::new(),
            next_slot: 0,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Takes ownership of `buffer` and records one attribute per layout
    /// element (one per column for matrices).
    ///
    /// Panics if the buffer has no layout or belongs to another backend.
    pub fn add_vertex_buffer(&mut self, buffer: Box<dyn VertexBuffer>) {
        assert!(!buffer.layout().is_empty(), "vertex buffer has no layout");
        assert_eq!(
            buffer.backend(),
            self.backend,
            "vertex buffer was created by a different backend"
        );

        let buffer_index = self.vertex_buffers.len();
        let layout = buffer.layout();
        let stride = layout.stride();

        for element in layout {
            let ty = element.data_type;
            match ty.columns() {
                Some(columns) => {
                    let column_size = ty.size() / columns;
                    for column in 0..columns {
                        self.attributes.push(VertexAttribute {
                            slot: self.next_slot,
                            buffer_index,
                            data_type: ty,
                            component_count: columns,
                            base_type: ty.base_type(),
                            normalized: element.normalized,
                            stride,
                            offset: element.offset + column_size * column,
                        });
                        self.next_slot += 1;
                    }
                }
                None => {
                    self.attributes.push(VertexAttribute {
                        slot: self.next_slot,
                        buffer_index,
                        data_type: ty,
                        component_count: ty.component_count(),
                        base_type: ty.base_type(),
                        normalized: element.normalized,
                        stride,
                        offset: element.offset,
                    });
                    self.next_slot += 1;
                }
            }
        }

        self.vertex_buffers.push(buffer);
    }

    /// Sets (or replaces) the index buffer.
    pub fn set_index_buffer(&mut self, buffer: Box<dyn IndexBuffer>) {
        assert_eq!(
            buffer.backend(),
            self.backend,
            "index buffer was created by a different backend"
        );
        self.index_buffer = Some(buffer);
    }

    pub fn vertex_buffers(&self) -> &[Box<dyn VertexBuffer>] {
        &self.vertex_buffers
    }

    pub fn index_buffer(&self) -> Option<&dyn IndexBuffer> {
        self.index_buffer.as_deref()
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Attributes recorded for the vertex buffer at `buffer_index`.
    pub fn attributes_of(&self, buffer_index: usize) -> impl Iterator<Item = &VertexAttribute> {
        self.attributes
            .iter()
            .filter(move |a| a.buffer_index == buffer_index)
    }

    /// Slot the next added attribute will receive.
    pub fn next_slot(&self) -> u32 {
        self.next_slot
    }

    /// Writes into the vertex buffer at `buffer_index`. Layouts stay fixed.
    ///
    /// Panics if the index is out of range or the data exceeds the capacity.
    pub fn set_vertex_data(&mut self, buffer_index: usize, data: &[u8]) {
        self.vertex_buffers[buffer_index].set_data(data);
    }

    /// Resolves the draw for `index_count` (0 means "everything").
    ///
    /// With an index buffer this is an indexed draw of `index_count` or the
    /// whole buffer. Without one, `index_count` vertices are drawn from the
    /// first vertex buffer, or `size / stride` of them when it is 0.
    pub fn draw_call(&self, index_count: u32) -> DrawCall {
        if let Some(ib) = &self.index_buffer {
            let count = if index_count == 0 { ib.count() } else { index_count };
            return DrawCall::Indexed { count };
        }

        let Some(first) = self.vertex_buffers.first() else {
            return DrawCall::Empty;
        };
        let stride = first.layout().stride() as u64;
        if index_count != 0 {
            return DrawCall::Arrays { count: index_count };
        }
        if stride == 0 {
            return DrawCall::Empty;
        }
        DrawCall::Arrays {
            count: (first.size() / stride) as u32,
        }
    }
}

impl std::fmt::Debug for VertexArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexArray")
            .field("backend", &self.backend)
            .field("vertex_buffers", &self.vertex_buffers.len())
            .field("indexed", &self.index_buffer.is_some())
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::buffer::{BufferElement, BufferLayout};
    use crate::render::headless::{HeadlessIndexBuffer, HeadlessVertexBuffer};

    fn vb(floats: usize, layout: &[(ShaderDataType, &str)]) -> Box<dyn VertexBuffer> {
        let mut buffer = HeadlessVertexBuffer::from_floats(&vec![0.0; floats]);
        buffer.set_layout(BufferLayout::new(
            layout.iter().map(|(ty, name)| BufferElement::new(*ty, *name)),
        ));
        Box::new(buffer)
    }

    // ── attributes ────────────────────────────────────────────────────────

    #[test]
    fn slots_follow_layout_order() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(vb(
            21,
            &[(ShaderDataType::Float3, "a_Position"), (ShaderDataType::Float4, "a_Color")],
        ));
        let a = va.attributes();
        assert_eq!(a.len(), 2);
        assert_eq!((a[0].slot, a[0].component_count, a[0].offset), (0, 3, 0));
        assert_eq!((a[1].slot, a[1].component_count, a[1].offset), (1, 4, 12));
        assert!(a.iter().all(|x| x.stride == 28));
    }

    #[test]
    fn slots_continue_across_buffers() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(vb(6, &[(ShaderDataType::Float2, "a_Uv")]));
        va.add_vertex_buffer(vb(6, &[(ShaderDataType::Float3, "a_Normal")]));
        let slots: Vec<u32> = va.attributes().iter().map(|a| a.slot).collect();
        assert_eq!(slots, [0, 1]);
        assert_eq!(va.attributes_of(1).count(), 1);
        assert_eq!(va.next_slot(), 2);
    }

    #[test]
    fn matrices_take_one_slot_per_column() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(vb(
            17,
            &[(ShaderDataType::Float, "a_Id"), (ShaderDataType::Mat4, "a_Transform")],
        ));
        let a = va.attributes();
        assert_eq!(a.len(), 5);
        let offsets: Vec<u32> = a[1..].iter().map(|x| x.offset).collect();
        assert_eq!(offsets, [4, 20, 36, 52]);
        assert!(a[1..].iter().all(|x| x.component_count == 4));
        assert_eq!(va.next_slot(), 5);
    }

    #[test]
    #[should_panic(expected = "vertex buffer has no layout")]
    fn buffer_without_layout_is_rejected() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(Box::new(HeadlessVertexBuffer::from_floats(&[0.0; 3])));
    }

    #[test]
    #[should_panic(expected = "no rendering backend")]
    fn none_backend_is_fatal() {
        VertexArray::new(Backend::None);
    }

    // ── draw resolution ───────────────────────────────────────────────────

    #[test]
    fn indexed_draw_defaults_to_full_index_buffer() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(vb(12, &[(ShaderDataType::Float3, "a_Position")]));
        va.set_index_buffer(Box::new(HeadlessIndexBuffer::new(&[0, 1, 2, 2, 3, 0])));
        assert_eq!(va.draw_call(0), DrawCall::Indexed { count: 6 });
        assert_eq!(va.draw_call(3), DrawCall::Indexed { count: 3 });
    }

    #[test]
    fn arrays_draw_falls_back_to_vertex_count() {
        let mut va = VertexArray::new(Backend::Headless);
        va.add_vertex_buffer(vb(9, &[(ShaderDataType::Float3, "a_Position")]));
        assert_eq!(va.draw_call(0), DrawCall::Arrays { count: 3 });
        assert_eq!(va.draw_call(2), DrawCall::Arrays { count: 2 });
    }

    #[test]
    fn empty_array_draws_nothing() {
        let va = VertexArray::new(Backend::Headless);
        assert_eq!(va.draw_call(0), DrawCall::Empty);
    }
}
