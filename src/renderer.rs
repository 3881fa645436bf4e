//! GPU renderer: device initialization, buffer setup, and the per-frame
//! draw path.
//!
//! The mesh is drawn twice per frame from one shared vertex buffer: a
//! triangle-list pass for the solid body, then a line-list pass for the
//! edge overlay. Each draw style is a [`DrawBatch`] pairing its pipeline
//! with its own index buffer and color bind group.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use wgpu::util::DeviceExt;

use crate::camera::ViewUniform;
use crate::error::{ViewerError, ViewerResult};
use crate::geometry::{PolygonMesh, Vertex};
use crate::shader::{ShaderModules, ShaderProgram};
use crate::ViewerConfig;

const VERTEX_SHADER: &str = r#"#version 450

layout(set = 0, binding = 0) uniform ViewUniforms {
    float aspect_ratio;
    float x_offset;
    float y_offset;
};

layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(
        x_offset + position.x * aspect_ratio,
        y_offset + position.y,
        0.0,
        1.0
    );
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 450

layout(set = 1, binding = 0) uniform DrawColor {
    vec4 color;
};

layout(location = 0) out vec4 out_color;

void main() {
    out_color = color;
}
"#;

const BACKGROUND_COLOR: wgpu::Color = wgpu::Color {
    r: 0.9686,
    g: 0.1137,
    b: 0.1804,
    a: 1.0,
};

const ENTITY_COLOR: Vec4 = Vec4::new(0.0, 0.6, 0.9843, 1.0);
const OUTLINE_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Flat color uniform, group 1 binding 0 in the fragment stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ColorUniform {
    color: Vec4,
}

/// One draw style over the shared vertex buffer.
struct DrawBatch {
    pipeline: wgpu::RenderPipeline,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    color_bind_group: wgpu::BindGroup,
}

/// GPU resources for the mesh. Absent when the shader program failed to
/// link; frames then clear the screen and present nothing else.
struct DrawResources {
    vertex_buffer: wgpu::Buffer,
    view_buffer: wgpu::Buffer,
    view_bind_group: wgpu::BindGroup,
    fill: DrawBatch,
    outline: DrawBatch,
}

/// Renderer owning the surface, device, and all GPU-resident mesh data.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    draw: Option<DrawResources>,
}

impl Renderer {
    pub fn new(
        window: Arc<winit::window::Window>,
        mesh: &PolygonMesh,
        config: &ViewerConfig,
    ) -> ViewerResult<Self> {
        pollster::block_on(Self::new_async(window, mesh, config))
    }

    async fn new_async(
        window: Arc<winit::window::Window>,
        mesh: &PolygonMesh,
        config: &ViewerConfig,
    ) -> ViewerResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ViewerError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::DeviceCreationFailed(e.to_string()))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let program = ShaderProgram::build(VERTEX_SHADER, FRAGMENT_SHADER);
        let draw = program
            .into_modules(&device)
            .map(|modules| Self::create_draw_resources(&device, surface_format, mesh, &modules));

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            draw,
        })
    }

    fn create_draw_resources(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        mesh: &PolygonMesh,
        modules: &ShaderModules,
    ) -> DrawResources {
        let view_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("View Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let color_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Color Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&view_layout, &color_layout],
            push_constant_ranges: &[],
        });

        // Shared vertex buffer, uploaded once.
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let view_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("View Buffer"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let view_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("View Bind Group"),
            layout: &view_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_buffer.as_entire_binding(),
            }],
        });

        let fill = Self::create_batch(
            device,
            &pipeline_layout,
            &color_layout,
            modules,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            mesh.fill_index_bytes(),
            mesh.fill_indices.len() as u32,
            ENTITY_COLOR,
            "Fill",
        );

        let outline = Self::create_batch(
            device,
            &pipeline_layout,
            &color_layout,
            modules,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            mesh.outline_index_bytes(),
            mesh.outline_indices.len() as u32,
            OUTLINE_COLOR,
            "Outline",
        );

        DrawResources {
            vertex_buffer,
            view_buffer,
            view_bind_group,
            fill,
            outline,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_batch(
        device: &wgpu::Device,
        pipeline_layout: &wgpu::PipelineLayout,
        color_layout: &wgpu::BindGroupLayout,
        modules: &ShaderModules,
        surface_format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
        index_bytes: &[u8],
        index_count: u32,
        color: Vec4,
        label: &str,
    ) -> DrawBatch {
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} Pipeline")),
            layout: Some(pipeline_layout),
            vertex: wgpu::VertexState {
                module: &modules.vertex,
                entry_point: "main",
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &modules.fragment,
                entry_point: "main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX,
        });

        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Color Buffer")),
            contents: bytemuck::bytes_of(&ColorUniform { color }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let color_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Color Bind Group")),
            layout: color_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: color_buffer.as_entire_binding(),
            }],
        });

        DrawBatch {
            pipeline,
            index_buffer,
            index_count,
            color_bind_group,
        }
    }

    /// Reconfigure the surface for a new framebuffer size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Render one frame: clear, draw fill then outline, present.
    pub fn render(&mut self, view: &ViewUniform) -> ViewerResult<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewerError::OutOfMemory),
            Err(e) => return Err(ViewerError::AcquireFrameFailed(e.to_string())),
        };

        if let Some(draw) = &self.draw {
            self.queue
                .write_buffer(&draw.view_buffer, 0, bytemuck::bytes_of(view));
        }

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(draw) = &self.draw {
                pass.set_viewport(
                    0.0,
                    0.0,
                    self.surface_config.width as f32,
                    self.surface_config.height as f32,
                    0.0,
                    1.0,
                );

                pass.set_bind_group(0, &draw.view_bind_group, &[]);
                pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));

                // Body first, edges on top.
                pass.set_pipeline(&draw.fill.pipeline);
                pass.set_bind_group(1, &draw.fill.color_bind_group, &[]);
                pass.set_index_buffer(draw.fill.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.fill.index_count, 0, 0..1);

                pass.set_pipeline(&draw.outline.pipeline);
                pass.set_bind_group(1, &draw.outline.color_bind_group, &[]);
                pass.set_index_buffer(
                    draw.outline.index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                pass.draw_indexed(0..draw.outline.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{compile_stage, ShaderStage};

    #[test]
    fn test_embedded_shaders_compile() {
        let vertex = compile_stage(VERTEX_SHADER, ShaderStage::Vertex);
        assert!(vertex.is_ok(), "vertex: {:?}", vertex.diagnostic());

        let fragment = compile_stage(FRAGMENT_SHADER, ShaderStage::Fragment);
        assert!(fragment.is_ok(), "fragment: {:?}", fragment.diagnostic());
    }

    #[test]
    fn test_embedded_shaders_link() {
        let program = ShaderProgram::build(VERTEX_SHADER, FRAGMENT_SHADER);
        assert!(program.is_linked());
    }

    #[test]
    fn test_color_uniform_layout() {
        // std140 vec4 block.
        assert_eq!(std::mem::size_of::<ColorUniform>(), 16);
    }
}
