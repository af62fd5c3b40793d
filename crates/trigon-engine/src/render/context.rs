use std::collections::HashMap;
use std::ops::Range;

use super::error::GfxError;
use super::shader::ShaderProgram;
use super::vertex::{effective_stride, BufferId};

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}

/// Snapshot of the active vertex buffer, refreshed on every bind.
pub(crate) struct BoundVertexBuffer {
    pub id: BufferId,
    pub buffer: Option<wgpu::Buffer>,
    pub stride: u32,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: u64,
    stride: u32,
    attributes: Vec<wgpu::VertexAttribute>,
}

/// Explicit graphics state, owned by the application root.
///
/// This object replaces the bind targets a GL-style API keeps in process
/// globals: it tracks the active shader program and vertex buffer, allocates
/// identities, and caches render pipelines derived from (program, layout)
/// pairs. All draw state flows through it; nothing is global.
pub struct GfxContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    bound_program: Option<ShaderProgram>,
    bound_buffer: Option<BoundVertexBuffer>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    next_program_id: u64,
    next_buffer_id: u64,
}

impl GfxContext {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            bound_program: None,
            bound_buffer: None,
            pipelines: HashMap::new(),
            next_program_id: 0,
            next_buffer_id: 0,
        }
    }

    /// Convenience constructor from an initialized GPU layer.
    pub fn for_gpu(gpu: &crate::device::Gpu<'_>) -> Self {
        Self::new(
            gpu.device().clone(),
            gpu.queue().clone(),
            gpu.surface_format(),
        )
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    // ── identity + resource allocation ────────────────────────────────────

    pub(crate) fn alloc_program_id(&mut self) -> u64 {
        let id = self.next_program_id;
        self.next_program_id += 1;
        id
    }

    pub(crate) fn alloc_buffer_id(&mut self) -> BufferId {
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        BufferId(id)
    }

    pub(crate) fn create_vertex_buffer(&self, label: &str, size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    // ── bind state ────────────────────────────────────────────────────────

    pub fn bind_program(&mut self, program: &ShaderProgram) {
        self.bound_program = Some(program.clone());
    }

    pub fn bound_program(&self) -> Option<&ShaderProgram> {
        self.bound_program.as_ref()
    }

    pub fn bound_program_id(&self) -> Option<u64> {
        self.bound_program.as_ref().map(|p| p.id())
    }

    pub(crate) fn bind_vertex_buffer(&mut self, snapshot: BoundVertexBuffer) {
        self.bound_buffer = Some(snapshot);
    }

    pub fn bound_buffer_id(&self) -> Option<BufferId> {
        self.bound_buffer.as_ref().map(|b| b.id)
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws `vertices` from the bound vertex buffer with the bound program.
    ///
    /// The pipeline for the (program, layout) pair is created on first use
    /// and cached. Drawing with nothing uploaded yet is a no-op.
    pub fn draw(
        &mut self,
        target: &mut RenderTarget<'_>,
        vertices: Range<u32>,
    ) -> Result<(), GfxError> {
        let Some(program) = self.bound_program.clone() else {
            return Err(GfxError::NoBoundProgram);
        };
        let Some(bound) = self.bound_buffer.as_ref() else {
            return Err(GfxError::NoBoundBuffer);
        };
        let Some(buffer) = bound.buffer.clone() else {
            return Ok(());
        };
        if vertices.is_empty() {
            return Ok(());
        }

        let stride = bound.stride;
        let attributes = bound.attributes.clone();
        let key = PipelineKey {
            program: program.id(),
            stride,
            attributes: attributes.clone(),
        };

        let device = self.device.clone();
        let format = self.surface_format;
        let pipeline = self
            .pipelines
            .entry(key)
            .or_insert_with(|| build_pipeline(&device, format, &program, stride, &attributes));

        let inner = program.inner();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trigon draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &inner.bind_group, &[]);
        rpass.set_vertex_buffer(0, buffer.slice(..));
        rpass.draw(vertices, 0..1);

        Ok(())
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    program: &ShaderProgram,
    stride: u32,
    attributes: &[wgpu::VertexAttribute],
) -> wgpu::RenderPipeline {
    let inner = program.inner();

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("trigon pipeline layout"),
        bind_group_layouts: &[&inner.bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("trigon pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &inner.vs_module,
            entry_point: Some(inner.vs_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: effective_stride(stride, attributes),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            }],
        },

        fragment: Some(wgpu::FragmentState {
            module: &inner.fs_module,
            entry_point: Some(inner.fs_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
    })
}
