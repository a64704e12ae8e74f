use std::collections::{HashMap, HashSet};

use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::device::{present_mode_for, Gpu};
use crate::paint::Color;
use crate::render::vertex_array::DrawCall;
use crate::window::GraphicsContext;

use super::plan::{PlannedDraw, SharedPlan, VertexLayoutKey};
use super::{FRAGMENT_ENTRY, VERTEX_ENTRY};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    shader: u64,
    buffers: Vec<VertexLayoutKey>,
    format: wgpu::TextureFormat,
    blend: bool,
}

/// Presentation side of the wgpu backend: owns the surface and executes the
/// frame plan recorded by [`WgpuApi`](super::WgpuApi).
pub struct WgpuContext {
    gpu: Gpu,
    plan: SharedPlan,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    failed: HashSet<PipelineKey>,
}

impl WgpuContext {
    pub(super) fn new(gpu: Gpu, plan: SharedPlan) -> Self {
        Self {
            gpu,
            plan,
            pipelines: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// Cached pipeline for `draw`, or `None` when the device rejected it.
    /// A rejected key is remembered so the failure is logged once.
    fn pipeline_for(&mut self, draw: &PlannedDraw) -> Option<wgpu::RenderPipeline> {
        let format = self.gpu.surface_format();
        let key = PipelineKey {
            shader: draw.program.id,
            buffers: draw.array.layouts(),
            format,
            blend: draw.blend,
        };
        if let Some(pipeline) = self.pipelines.get(&key) {
            return Some(pipeline.clone());
        }
        if self.failed.contains(&key) {
            return None;
        }

        let device = self.gpu.device();
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grain pipeline layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .buffers
            .iter()
            .map(|b| wgpu::VertexBufferLayout {
                array_stride: b.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &b.attributes,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&draw.program.name),
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &draw.program.vertex,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &draw.program.fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: key.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(scope.pop()) {
            log::error!(
                "pipeline for shader '{}' rejected, skipping its draws: {err}",
                draw.program.name
            );
            self.failed.insert(key);
            return None;
        }

        log::debug!(
            "created pipeline for shader '{}' ({} vertex buffers)",
            draw.program.name,
            key.buffers.len()
        );
        self.pipelines.insert(key, pipeline.clone());
        Some(pipeline)
    }
}

impl GraphicsContext for WgpuContext {
    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.gpu.set_present_mode(present_mode_for(enabled));
    }

    fn swap_buffers(&mut self) {
        let work = self.plan.borrow_mut().take_work();

        let mut frame = match self.gpu.begin_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(err) => {
                self.gpu.handle_surface_error(err);
                return;
            }
        };

        let pipelines: Vec<Option<wgpu::RenderPipeline>> =
            work.draws.iter().map(|d| self.pipeline_for(d)).collect();
        let surface = self.gpu.size();

        {
            let load = match work.clear {
                Some(c) => wgpu::LoadOp::Clear(to_wgpu_color(c)),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("grain scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (draw, pipeline) in work.draws.iter().zip(&pipelines) {
                let Some(pipeline) = pipeline else {
                    continue;
                };
                let viewport = draw
                    .viewport
                    .unwrap_or(Viewport::full(surface.width, surface.height));
                let Some(vp) = viewport.clamped_to(surface.width, surface.height) else {
                    continue;
                };
                rpass.set_viewport(
                    vp.x as f32,
                    vp.y as f32,
                    vp.width as f32,
                    vp.height as f32,
                    0.0,
                    1.0,
                );

                rpass.set_pipeline(pipeline);
                for (slot, (buffer, _)) in draw.array.vertex_buffers.iter().enumerate() {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }

                match (draw.call, &draw.array.index_buffer) {
                    (DrawCall::Indexed { count }, Some(ib)) => {
                        rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..count, 0, 0..1);
                    }
                    (DrawCall::Arrays { count }, _) => rpass.draw(0..count, 0..1),
                    _ => {}
                }
            }
        }

        self.gpu.submit(frame);
    }
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}
