use bytemuck::Pod;

use super::context::{BoundVertexBuffer, GfxContext};
use super::error::GfxError;
use super::staging::StagingBuffer;

/// Element type of a vertex attribute.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AttributeType {
    #[default]
    F32,
    I32,
    U32,
}

/// Immutable description of one vertex attribute: a named, typed slot in the
/// vertex stage consuming one field of per-vertex data.
///
/// No validation happens here; a zero size or an unsupported combination is
/// rejected later, when the attribute is attached to a buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    name: String,
    size: u32,
    ty: AttributeType,
    normalized: bool,
    stride: u32,
}

impl VertexAttribute {
    pub fn builder() -> VertexAttributeBuilder {
        VertexAttributeBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn ty(&self) -> AttributeType {
        self.ty
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Maps (type, size, normalized) onto a concrete vertex format.
    ///
    /// This is the point where malformed descriptors surface: there are no
    /// normalized 32-bit formats, and sizes outside 1..=4 do not exist.
    pub(crate) fn format(&self) -> Result<wgpu::VertexFormat, GfxError> {
        use wgpu::VertexFormat as F;

        if self.normalized && self.ty != AttributeType::F32 {
            return Err(GfxError::UnsupportedAttribute {
                name: self.name.clone(),
                detail: "no normalized 32-bit integer vertex formats exist".to_owned(),
            });
        }

        let format = match (self.ty, self.size) {
            (AttributeType::F32, 1) => F::Float32,
            (AttributeType::F32, 2) => F::Float32x2,
            (AttributeType::F32, 3) => F::Float32x3,
            (AttributeType::F32, 4) => F::Float32x4,
            (AttributeType::I32, 1) => F::Sint32,
            (AttributeType::I32, 2) => F::Sint32x2,
            (AttributeType::I32, 3) => F::Sint32x3,
            (AttributeType::I32, 4) => F::Sint32x4,
            (AttributeType::U32, 1) => F::Uint32,
            (AttributeType::U32, 2) => F::Uint32x2,
            (AttributeType::U32, 3) => F::Uint32x3,
            (AttributeType::U32, 4) => F::Uint32x4,
            (ty, size) => {
                return Err(GfxError::UnsupportedAttribute {
                    name: self.name.clone(),
                    detail: format!("{size} components of {ty:?} is not a vertex format"),
                });
            }
        };
        Ok(format)
    }
}

/// Fluent, reusable builder for [`VertexAttribute`].
///
/// `build` snapshots the current fields without consuming the builder, so a
/// single builder can stamp out several attributes that share common fields:
///
/// ```no_run
/// # use trigon_engine::render::VertexAttribute;
/// let mut builder = VertexAttribute::builder();
/// builder.size(3).stride(12);
/// let position = builder.name("position").build();
/// let normal = builder.name("normal").build();
/// # let _ = (position, normal);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VertexAttributeBuilder {
    name: String,
    size: u32,
    ty: AttributeType,
    normalized: bool,
    stride: u32,
}

impl VertexAttributeBuilder {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn size(&mut self, size: u32) -> &mut Self {
        self.size = size;
        self
    }

    pub fn ty(&mut self, ty: AttributeType) -> &mut Self {
        self.ty = ty;
        self
    }

    pub fn normalized(&mut self, normalized: bool) -> &mut Self {
        self.normalized = normalized;
        self
    }

    pub fn stride(&mut self, stride: u32) -> &mut Self {
        self.stride = stride;
        self
    }

    pub fn build(&self) -> VertexAttribute {
        VertexAttribute {
            name: self.name.clone(),
            size: self.size,
            ty: self.ty,
            normalized: self.normalized,
            stride: self.stride,
        }
    }
}

/// Usage hint carried by a vertex buffer.
///
/// Descriptive only: wgpu buffers are always created as vertex +
/// copy-destination, but the hint survives for labeling and diagnostics.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum BufferUsage {
    Stream,
    #[default]
    Static,
    Dynamic,
}

/// Identity of a vertex buffer within one [`GfxContext`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) u64);

/// A growable vertex buffer: a host staging buffer mirrored to a GPU-resident
/// buffer object.
///
/// Appends are sequential and write-once; there is no removal, update in
/// place, or random access. After every successful append the GPU buffer's
/// first `len()` bytes equal the staging contents — the whole logical buffer
/// is re-uploaded in one copy, and growth recreates the GPU buffer at the
/// doubled capacity first.
pub struct VertexBuffer {
    id: BufferId,
    staging: StagingBuffer,
    gpu: Option<wgpu::Buffer>,
    usage: BufferUsage,
    label: String,
    stride: u32,
    attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexBuffer {
    pub fn new(ctx: &mut GfxContext) -> Self {
        Self::with_usage(ctx, BufferUsage::default())
    }

    pub fn with_usage(ctx: &mut GfxContext, usage: BufferUsage) -> Self {
        let buffer = Self {
            id: ctx.alloc_buffer_id(),
            staging: StagingBuffer::new(),
            gpu: None,
            usage,
            label: "buffer".to_owned(),
            stride: 0,
            attributes: Vec::new(),
        };
        buffer.bind(ctx);
        buffer
    }

    /// Records this buffer as the context's active vertex buffer.
    ///
    /// Idempotent; later appends and attribute changes re-bind automatically
    /// so the context's snapshot never goes stale.
    pub fn bind(&self, ctx: &mut GfxContext) {
        ctx.bind_vertex_buffer(BoundVertexBuffer {
            id: self.id,
            buffer: self.gpu.clone(),
            stride: self.stride,
            attributes: self.attributes.clone(),
        });
    }

    /// Attaches an attribute layout, resolving its shader location against
    /// the currently bound program.
    ///
    /// Describing a buffer layout before any program is bound is a
    /// configuration error and fails with [`GfxError::NoBoundProgram`].
    pub fn add_attribute(
        &mut self,
        ctx: &mut GfxContext,
        attribute: &VertexAttribute,
    ) -> Result<(), GfxError> {
        let Some(program) = ctx.bound_program().cloned() else {
            log::error!(
                "failed to add attribute `{}`: no shader program is bound",
                attribute.name()
            );
            return Err(GfxError::NoBoundProgram);
        };

        let Some(location) = program.attribute_location(attribute.name()) else {
            return Err(GfxError::UnknownAttribute {
                name: attribute.name().to_owned(),
            });
        };
        let format = attribute.format()?;

        self.attributes.push(wgpu::VertexAttribute {
            format,
            offset: 0,
            shader_location: location,
        });
        self.stride = attribute.stride();
        self.label = format!("buffer(`{}`)", attribute.name());

        self.bind(ctx);
        Ok(())
    }

    /// Appends one plain-old-data value.
    pub fn push<T: Pod>(&mut self, ctx: &mut GfxContext, value: &T) {
        self.push_bytes(ctx, bytemuck::bytes_of(value));
    }

    /// Appends raw bytes to the tail of the buffer and mirrors the whole
    /// logical contents to the GPU.
    pub fn push_bytes(&mut self, ctx: &mut GfxContext, bytes: &[u8]) {
        if let Some(growth) = self.staging.append(bytes) {
            log::info!(
                "expanded {} capacity: {} -> {}",
                self.label,
                growth.from,
                growth.to
            );
            // The GPU buffer is fixed-size; growth means a fresh allocation.
            self.gpu = None;
        }

        let capacity = self.staging.capacity();
        let (label, usage) = (&self.label, self.usage);
        let buffer = self.gpu.get_or_insert_with(|| {
            log::debug!("allocating {capacity} byte GPU buffer for {label} ({usage:?})");
            ctx.create_vertex_buffer(label, capacity as u64)
        });

        ctx.queue().write_buffer(buffer, 0, self.staging.bytes());
        self.bind(ctx);
    }

    /// Total bytes appended so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.staging.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    /// Current staging capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.staging.capacity()
    }

    /// The buffered bytes, host side.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.staging.bytes()
    }

    /// Number of whole vertices buffered, per the attached attribute layout.
    pub fn vertex_count(&self) -> u32 {
        let stride = effective_stride(self.stride, &self.attributes);
        if stride == 0 {
            return 0;
        }
        (self.staging.len() as u64 / stride) as u32
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn set_usage(&mut self, usage: BufferUsage) {
        self.usage = usage;
    }
}

/// A stride of zero means tightly packed: the widest attribute wins (all
/// attributes sit at offset zero).
pub(crate) fn effective_stride(stride: u32, attributes: &[wgpu::VertexAttribute]) -> u64 {
    if stride > 0 {
        return stride as u64;
    }
    attributes
        .iter()
        .map(|a| a.format.size())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── builder ───────────────────────────────────────────────────────────

    #[test]
    fn builder_is_reusable_across_builds() {
        let mut builder = VertexAttribute::builder();
        builder.size(3).ty(AttributeType::F32).stride(12);

        let position = builder.name("position").build();
        let normal = builder.name("normal").build();

        assert_eq!(position.name(), "position");
        assert_eq!(normal.name(), "normal");
        for attr in [&position, &normal] {
            assert_eq!(attr.size(), 3);
            assert_eq!(attr.stride(), 12);
            assert_eq!(attr.ty(), AttributeType::F32);
            assert!(!attr.normalized());
        }
    }

    #[test]
    fn builder_accepts_degenerate_descriptors() {
        // Validation is deferred; building a zero-sized attribute is fine.
        let attr = VertexAttribute::builder().name("broken").size(0).build();
        assert_eq!(attr.size(), 0);
        assert!(matches!(
            attr.format(),
            Err(GfxError::UnsupportedAttribute { .. })
        ));
    }

    // ── format mapping ────────────────────────────────────────────────────

    #[test]
    fn float_formats() {
        let mut builder = VertexAttribute::builder();
        builder.name("a").ty(AttributeType::F32);
        assert_eq!(builder.size(1).build().format().unwrap(), wgpu::VertexFormat::Float32);
        assert_eq!(builder.size(3).build().format().unwrap(), wgpu::VertexFormat::Float32x3);
        assert_eq!(builder.size(4).build().format().unwrap(), wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn integer_formats() {
        let mut builder = VertexAttribute::builder();
        builder.name("a").size(2);
        assert_eq!(
            builder.ty(AttributeType::I32).build().format().unwrap(),
            wgpu::VertexFormat::Sint32x2
        );
        assert_eq!(
            builder.ty(AttributeType::U32).build().format().unwrap(),
            wgpu::VertexFormat::Uint32x2
        );
    }

    #[test]
    fn normalized_integer_attributes_are_rejected() {
        let attr = VertexAttribute::builder()
            .name("weights")
            .size(4)
            .ty(AttributeType::U32)
            .normalized(true)
            .build();
        assert!(matches!(
            attr.format(),
            Err(GfxError::UnsupportedAttribute { .. })
        ));
    }

    #[test]
    fn normalized_floats_are_accepted_as_is() {
        // GL ignores the flag for floats; keep that behavior.
        let attr = VertexAttribute::builder()
            .name("position")
            .size(3)
            .normalized(true)
            .build();
        assert_eq!(attr.format().unwrap(), wgpu::VertexFormat::Float32x3);
    }

    // ── stride ────────────────────────────────────────────────────────────

    #[test]
    fn zero_stride_means_tightly_packed() {
        let attrs = [wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }];
        assert_eq!(effective_stride(0, &attrs), 12);
        assert_eq!(effective_stride(16, &attrs), 16);
        assert_eq!(effective_stride(0, &[]), 0);
    }
}
