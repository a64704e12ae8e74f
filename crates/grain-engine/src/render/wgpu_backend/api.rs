use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::coords::Viewport;
use crate::paint::Color;
use crate::render::api::{Backend, RendererApi};
use crate::render::buffer::{BaseType, IndexBuffer, VertexBuffer};
use crate::render::error::RenderError;
use crate::render::shader::Shader;
use crate::render::vertex_array::{DrawCall, VertexArray, VertexAttribute};

use super::plan::{BoundArray, PlannedDraw, SharedPlan, VertexLayoutKey};
use super::resources::{ShaderProgram, WgpuIndexBuffer, WgpuShader, WgpuVertexBuffer};
use super::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// [`RendererApi`] over wgpu.
///
/// Resource creation talks to the device directly. State changes and draws
/// are recorded into the frame plan shared with the window's
/// [`WgpuContext`](super::WgpuContext), which turns them into one render pass
/// when the frame is presented.
pub struct WgpuApi {
    device: wgpu::Device,
    queue: wgpu::Queue,
    plan: SharedPlan,
    next_shader_id: u64,
    warned_unbound: bool,
}

impl WgpuApi {
    pub(super) fn new(device: wgpu::Device, queue: wgpu::Queue, plan: SharedPlan) -> Self {
        Self {
            device,
            queue,
            plan,
            next_shader_id: 0,
            warned_unbound: false,
        }
    }

    /// Compiles one WGSL module inside a validation scope so bad source comes
    /// back as [`RenderError::Compile`] instead of reaching the device's
    /// uncaptured error handler.
    fn compile_module(
        &self,
        name: &str,
        stage: &str,
        source: &str,
    ) -> Result<wgpu::ShaderModule, RenderError> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{name} ({stage})")),
                source: wgpu::ShaderSource::Wgsl(source.to_owned().into()),
            });
        match pollster::block_on(scope.pop()) {
            Some(err) => Err(RenderError::Compile {
                name: name.to_string(),
                message: err.to_string(),
            }),
            None => Ok(module),
        }
    }
}

impl RendererApi for WgpuApi {
    fn backend(&self) -> Backend {
        Backend::Wgpu
    }

    fn init(&mut self) {
        // Alpha blending on; no depth attachment, so depth testing stays off.
        self.plan.borrow_mut().blend = true;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.plan.borrow_mut().viewport = Some(viewport);
    }

    fn set_clear_color(&mut self, color: Color) {
        self.plan.borrow_mut().clear_color = color;
    }

    fn clear(&mut self) {
        let mut plan = self.plan.borrow_mut();
        plan.clear = Some(plan.clear_color);
    }

    fn bind_shader(&mut self, shader: &dyn Shader) {
        let Some(shader) = shader.as_any().downcast_ref::<WgpuShader>() else {
            panic!("shader '{}' was created by a different backend", shader.name());
        };
        self.plan.borrow_mut().shader = Some(shader.program.clone());
    }

    fn bind_vertex_array(&mut self, vertex_array: &VertexArray) {
        let array = bind_array(vertex_array);
        self.plan.borrow_mut().array = Some(array);
    }

    fn draw_indexed(&mut self, vertex_array: &VertexArray, index_count: u32) {
        let call = vertex_array.draw_call(index_count);
        if call == DrawCall::Empty {
            return;
        }

        let mut plan = self.plan.borrow_mut();
        let Some(program) = plan.shader.clone() else {
            if !self.warned_unbound {
                log::warn!("draw issued with no shader bound; skipped");
                self.warned_unbound = true;
            }
            return;
        };
        let array = match &plan.array {
            Some(array) => array.clone(),
            None => bind_array(vertex_array),
        };
        let draw = PlannedDraw {
            program,
            array,
            call,
            viewport: plan.viewport,
            blend: plan.blend,
        };
        plan.draws.push(draw);
    }

    fn create_vertex_buffer(&mut self, vertices: &[f32]) -> Box<dyn VertexBuffer> {
        let contents: &[u8] = bytemuck::cast_slice(vertices);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grain vertex buffer"),
                contents,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        Box::new(WgpuVertexBuffer::new(
            buffer,
            self.queue.clone(),
            contents.len() as u64,
        ))
    }

    fn create_dynamic_vertex_buffer(&mut self, size: u64) -> Box<dyn VertexBuffer> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("grain dynamic vertex buffer"),
            size: size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Box::new(WgpuVertexBuffer::new(buffer, self.queue.clone(), size))
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Box<dyn IndexBuffer> {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("grain index buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Box::new(WgpuIndexBuffer::new(buffer, indices.len() as u32))
    }

    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Rc<dyn Shader>, RenderError> {
        check_entry_point(name, vertex_src, VERTEX_ENTRY)?;
        check_entry_point(name, fragment_src, FRAGMENT_ENTRY)?;

        let vertex = self.compile_module(name, "vertex", vertex_src)?;
        let fragment = if fragment_src == vertex_src {
            vertex.clone()
        } else {
            self.compile_module(name, "fragment", fragment_src)?
        };

        let id = self.next_shader_id;
        self.next_shader_id += 1;
        log::debug!("compiled shader '{name}' (id {id})");

        Ok(Rc::new(WgpuShader {
            program: ShaderProgram {
                id,
                name: name.to_string(),
                vertex,
                fragment,
            },
        }))
    }
}

fn check_entry_point(name: &str, source: &str, entry: &str) -> Result<(), RenderError> {
    if source.trim().is_empty() {
        return Err(RenderError::EmptySource { name: name.to_string() });
    }
    if !declares_fn(source, entry) {
        return Err(RenderError::Compile {
            name: name.to_string(),
            message: format!("missing entry point '{entry}'"),
        });
    }
    Ok(())
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when `source` has `fn <ident>` with `ident` standing as a whole word.
fn declares_fn(source: &str, ident: &str) -> bool {
    source.match_indices("fn").any(|(at, kw)| {
        if source[..at].chars().next_back().is_some_and(is_ident_char) {
            return false;
        }
        let after = &source[at + kw.len()..];
        let name = after.trim_start();
        if name.len() == after.len() {
            return false;
        }
        name.strip_prefix(ident)
            .is_some_and(|rest| !rest.chars().next().is_some_and(is_ident_char))
    })
}

fn bind_array(vertex_array: &VertexArray) -> BoundArray {
    let vertex_buffers = vertex_array
        .vertex_buffers()
        .iter()
        .enumerate()
        .map(|(i, vb)| {
            let Some(inner) = vb.as_any().downcast_ref::<WgpuVertexBuffer>() else {
                panic!("vertex buffer was created by a different backend");
            };
            let layout = VertexLayoutKey {
                stride: vb.layout().stride() as u64,
                attributes: vertex_array.attributes_of(i).map(to_wgpu_attribute).collect(),
            };
            (inner.buffer.clone(), layout)
        })
        .collect();

    let index_buffer = vertex_array.index_buffer().map(|ib| {
        let Some(inner) = ib.as_any().downcast_ref::<WgpuIndexBuffer>() else {
            panic!("index buffer was created by a different backend");
        };
        inner.buffer.clone()
    });

    BoundArray {
        vertex_buffers,
        index_buffer,
    }
}

fn to_wgpu_attribute(attr: &VertexAttribute) -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        format: vertex_format(attr.base_type, attr.component_count),
        offset: attr.offset as u64,
        shader_location: attr.slot,
    }
}

/// 32-bit formats only; wgpu has no normalized 32-bit integer formats, so the
/// normalization flag does not change the format.
pub(super) fn vertex_format(base: BaseType, components: u32) -> wgpu::VertexFormat {
    use wgpu::VertexFormat as F;
    match (base, components) {
        (BaseType::Float, 1) => F::Float32,
        (BaseType::Float, 2) => F::Float32x2,
        (BaseType::Float, 3) => F::Float32x3,
        (BaseType::Float, _) => F::Float32x4,
        (BaseType::Int, 1) => F::Sint32,
        (BaseType::Int, 2) => F::Sint32x2,
        (BaseType::Int, 3) => F::Sint32x3,
        (BaseType::Int, _) => F::Sint32x4,
        (BaseType::Bool, _) => F::Uint32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_component_counts() {
        assert_eq!(vertex_format(BaseType::Float, 3), wgpu::VertexFormat::Float32x3);
        assert_eq!(vertex_format(BaseType::Int, 2), wgpu::VertexFormat::Sint32x2);
        assert_eq!(vertex_format(BaseType::Bool, 1), wgpu::VertexFormat::Uint32);
    }

    #[test]
    fn entry_points_are_required() {
        assert!(check_entry_point("t", "@vertex fn vs_main() {}", VERTEX_ENTRY).is_ok());
        assert!(matches!(
            check_entry_point("t", "@vertex fn main() {}", VERTEX_ENTRY),
            Err(RenderError::Compile { .. })
        ));
    }

    #[test]
    fn entry_point_must_be_a_whole_word() {
        assert!(!declares_fn("@vertex fn vs_main_alt() {}", VERTEX_ENTRY));
        assert!(!declares_fn("@vertex fnvs_main() {}", VERTEX_ENTRY));
        assert!(!declares_fn("@vertex defn vs_main() {}", VERTEX_ENTRY));
        assert!(declares_fn("@vertex fn  vs_main() {}", VERTEX_ENTRY));
        assert!(declares_fn("@vertex fn\tvs_main\n() {}", VERTEX_ENTRY));
        assert!(declares_fn("fn helper() {}\n@vertex fn vs_main() {}", VERTEX_ENTRY));
    }

    // ── compilation against a real device ──

    fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::default();
        let options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: None,
            force_fallback_adapter: false,
        };
        let adapter = pollster::block_on(instance.request_adapter(&options)).ok()?;
        let desc = wgpu::DeviceDescriptor {
            required_limits: adapter.limits(),
            ..Default::default()
        };
        pollster::block_on(adapter.request_device(&desc)).ok()
    }

    fn test_api() -> Option<WgpuApi> {
        let Some((device, queue)) = test_device() else {
            eprintln!("no wgpu adapter available; skipping");
            return None;
        };
        Some(WgpuApi::new(device, queue, SharedPlan::default()))
    }

    #[test]
    fn malformed_wgsl_is_a_compile_error() {
        let Some(mut api) = test_api() else { return };
        let result = api.create_shader(
            "bad",
            "@vertex fn vs_main( -> garbage",
            "@fragment fn fs_main() {}",
        );
        match result {
            Err(RenderError::Compile { name, message }) => {
                assert_eq!(name, "bad");
                assert!(!message.is_empty());
            }
            Err(other) => panic!("expected a compile error, got {other}"),
            Ok(_) => panic!("malformed source compiled"),
        }
    }

    #[test]
    fn valid_wgsl_compiles() {
        let Some(mut api) = test_api() else { return };
        let source = "@vertex fn vs_main() -> @builtin(position) vec4<f32> {\n    return vec4<f32>(0.0, 0.0, 0.0, 1.0);\n}\n@fragment fn fs_main() -> @location(0) vec4<f32> {\n    return vec4<f32>(1.0, 1.0, 1.0, 1.0);\n}\n";
        let shader = api.create_shader("ok", source, source).expect("valid source");
        assert_eq!(shader.name(), "ok");
    }
}
