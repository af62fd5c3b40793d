//! Graphics layer: shader programs, vertex buffers, uniforms, draw state.
//!
//! Nothing here is global. Bind state (the active program and vertex
//! buffer) lives in an explicit [`GfxContext`] owned by the application and
//! passed into every operation that touches it.
//!
//! Convention:
//! - vertex data is appended, never edited in place
//! - the GPU copy of a buffer always mirrors the host staging copy
//! - shader stages are compiled (parsed + validated) on the CPU, so
//!   diagnostics arrive before any pipeline is built

mod context;
mod error;
mod shader;
mod staging;
mod uniform;
mod vertex;

pub use context::{GfxContext, RenderTarget};
pub use error::GfxError;
pub use shader::{Shader, ShaderProgram, ShaderProgramBuilder, ShaderStage};
pub use staging::{Growth, StagingBuffer};
pub use uniform::{Uniform, UniformType, UniformValue};
pub use vertex::{
    AttributeType, BufferId, BufferUsage, VertexAttribute, VertexAttributeBuilder, VertexBuffer,
};
