use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use grain_engine::core::{EngineCtx, Layer};
use grain_engine::render::{BufferElement, BufferLayout, Shader, ShaderDataType, VertexArray};

const SHADER_SOURCE: &str = include_str!("../shaders/triangle.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
}

const VERTICES: [Vertex; 3] = [
    Vertex { position: [-0.5, -0.5, 0.0] },
    Vertex { position: [0.5, -0.5, 0.0] },
    Vertex { position: [0.0, 0.5, 0.0] },
];

/// Draws one triangle every frame. No index buffer: the vertex count comes
/// from the buffer size and layout stride.
#[derive(Default)]
pub struct TriangleLayer {
    vertex_array: Option<VertexArray>,
    shader: Option<Rc<dyn Shader>>,
}

impl TriangleLayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for TriangleLayer {
    fn name(&self) -> &str {
        "Triangle"
    }

    fn on_attach(&mut self, ctx: &mut EngineCtx) {
        let renderer = &mut ctx.renderer;

        let mut vertex_buffer = renderer.create_vertex_buffer(bytemuck::cast_slice(&VERTICES));
        vertex_buffer.set_layout(BufferLayout::new([BufferElement::new(
            ShaderDataType::Float3,
            "a_Position",
        )]));

        let mut vertex_array = renderer.create_vertex_array();
        vertex_array.add_vertex_buffer(vertex_buffer);
        self.vertex_array = Some(vertex_array);

        match renderer.create_shader_from_source("triangle", SHADER_SOURCE) {
            Ok(shader) => {
                ctx.shaders.add_named(Rc::clone(&shader));
                self.shader = Some(shader);
            }
            Err(err) => log::error!("triangle shader unavailable: {err}"),
        }
    }

    fn on_detach(&mut self) {
        self.vertex_array = None;
        self.shader = None;
    }

    fn on_render(&mut self, ctx: &mut EngineCtx) {
        if let (Some(shader), Some(vertex_array)) = (&self.shader, &self.vertex_array) {
            ctx.renderer.submit(shader.as_ref(), vertex_array);
        }
    }
}

#[cfg(test)]
mod tests {
    use grain_engine::core::{AppConfig, Application};
    use grain_engine::render::headless::{CommandLog, HeadlessApi, RenderOp};
    use grain_engine::render::{split_stages, Backend};
    use grain_engine::window::HeadlessWindow;

    use super::*;

    // ── shader asset ──

    #[test]
    fn shipped_shader_splits_into_its_entry_points() {
        let sources = split_stages("triangle", SHADER_SOURCE).expect("both stages present");
        assert!(sources.vertex.contains("fn vs_main"));
        assert!(sources.fragment.contains("fn fs_main"));
        assert!(!sources.vertex.contains("fn fs_main"));
    }

    // ── drawing ──

    #[test]
    fn each_frame_draws_the_triangle() {
        let config = AppConfig::default().with_backend(Backend::Headless);
        let (window, _handle) = HeadlessWindow::new(&config.window);
        let log = CommandLog::default();
        let mut app = Application::from_parts(
            config,
            Box::new(window),
            Box::new(HeadlessApi::new(log.clone())),
        );
        app.push_layer(TriangleLayer::new());
        assert!(app.ctx().shaders.exists("triangle"));

        log.clear();
        app.step();

        let ops = log.ops();
        let bind = ops
            .iter()
            .position(|op| *op == RenderOp::BindShader("triangle".into()))
            .expect("shader bound");
        assert_eq!(
            ops[bind + 1..bind + 3],
            [
                RenderOp::BindVertexArray { vertex_buffers: 1, indexed: false },
                RenderOp::DrawArrays(3),
            ]
        );
        assert_eq!(log.draw_count(), 1);
    }
}
