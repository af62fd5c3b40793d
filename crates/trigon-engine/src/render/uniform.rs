use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use bytemuck::Pod;

use crate::geom::Vector3;

use super::shader::ProgramInner;

/// Every uniform gets a fixed-size allocation; 16 bytes covers the widest
/// supported type (`vec3<f32>`) and keeps bindings alignment-friendly.
pub(crate) const UNIFORM_SLOT_BYTES: usize = 16;

/// Shader-side type of a uniform global.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformType {
    F32,
    I32,
    U32,
    Vec3,
}

/// One uniform global owned by a program: its GPU buffer plus a CPU mirror.
///
/// wgpu has no synchronous uniform readback, so reads are served from the
/// mirror; mirror and buffer are written together and cannot diverge.
pub(crate) struct UniformSlot {
    pub name: String,
    pub binding: u32,
    pub ty: UniformType,
    pub buffer: wgpu::Buffer,
    pub mirror: RefCell<[u8; UNIFORM_SLOT_BYTES]>,
}

/// Value types that may back a [`Uniform`].
pub trait UniformValue: Pod {
    const TYPE: UniformType;
}

impl UniformValue for f32 {
    const TYPE: UniformType = UniformType::F32;
}

impl UniformValue for i32 {
    const TYPE: UniformType = UniformType::I32;
}

impl UniformValue for u32 {
    const TYPE: UniformType = UniformType::U32;
}

impl UniformValue for Vector3 {
    const TYPE: UniformType = UniformType::Vec3;
}

enum Backing {
    /// The name did not resolve; reads yield zero and writes are absorbed.
    Blank,
    Live {
        program: Rc<ProgramInner>,
        slot: usize,
    },
}

/// Typed handle to one named shader input.
///
/// Uniforms whose names do not resolve (optimized out, misspelled, absent in
/// this build of the shader) come back blank rather than failing; see
/// [`ShaderProgram::uniform`](super::ShaderProgram::uniform).
pub struct Uniform<T: UniformValue> {
    name: String,
    backing: Backing,
    _value: PhantomData<T>,
}

impl<T: UniformValue> Uniform<T> {
    pub(crate) fn blank(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            backing: Backing::Blank,
            _value: PhantomData,
        }
    }

    pub(crate) fn live(name: &str, program: Rc<ProgramInner>, slot: usize) -> Self {
        Self {
            name: name.to_owned(),
            backing: Backing::Live { program, slot },
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle is the unresolved sentinel.
    pub fn is_blank(&self) -> bool {
        matches!(self.backing, Backing::Blank)
    }

    /// The resolved binding index, if any.
    pub fn location(&self) -> Option<u32> {
        match &self.backing {
            Backing::Blank => None,
            Backing::Live { program, slot } => Some(program.uniforms[*slot].binding),
        }
    }

    /// Writes `value` to the CPU mirror and the GPU buffer.
    ///
    /// A blank uniform absorbs the write.
    pub fn set(&self, value: T) {
        let Backing::Live { program, slot } = &self.backing else {
            return;
        };
        let slot = &program.uniforms[*slot];

        let mut mirror = slot.mirror.borrow_mut();
        let bytes = bytemuck::bytes_of(&value);
        mirror[..bytes.len()].copy_from_slice(bytes);
        program.queue.write_buffer(&slot.buffer, 0, &mirror[..]);
    }

    /// Reads the last written value; zero for blank uniforms.
    pub fn value(&self) -> T {
        match &self.backing {
            Backing::Blank => T::zeroed(),
            Backing::Live { program, slot } => {
                let mirror = program.uniforms[*slot].mirror.borrow();
                bytemuck::pod_read_unaligned(&mirror[..std::mem::size_of::<T>()])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::vec3;

    // ── blank sentinel ────────────────────────────────────────────────────

    #[test]
    fn blank_uniform_reports_blank() {
        let u = Uniform::<f32>::blank("nonexistent");
        assert!(u.is_blank());
        assert_eq!(u.location(), None);
        assert_eq!(u.name(), "nonexistent");
    }

    #[test]
    fn blank_writes_are_absorbed_and_reads_are_zero() {
        let u = Uniform::<f32>::blank("nonexistent");
        u.set(42.0);
        assert_eq!(u.value(), 0.0);

        let u = Uniform::<i32>::blank("nonexistent");
        u.set(-7);
        assert_eq!(u.value(), 0);

        let u = Uniform::<u32>::blank("nonexistent");
        u.set(7);
        assert_eq!(u.value(), 0);

        let u = Uniform::<Vector3>::blank("nonexistent");
        u.set(vec3(1.0, 2.0, 3.0));
        assert_eq!(u.value(), Vector3::zero());
    }
}
