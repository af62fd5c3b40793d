use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::context::GfxContext;
use super::error::GfxError;
use super::uniform::{Uniform, UniformSlot, UniformType, UniformValue, UNIFORM_SLOT_BYTES};

/// The two shader stages a program links together.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// One compiled shader stage.
///
/// Compilation happens on the CPU (parse + validate); a failed compile
/// surfaces the compiler's rendered diagnostic and yields no `Shader`.
#[derive(Debug)]
pub struct Shader {
    stage: ShaderStage,
    source: String,
    module: naga::Module,
}

impl Shader {
    pub fn new(stage: ShaderStage, source: &str) -> Result<Self, GfxError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|err| {
            let message = err.emit_to_string(source);
            log::error!("failed to build a {} shader: {message}", stage.label());
            GfxError::ShaderCompile { stage, message }
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator.validate(&module).map_err(|err| {
            let message = err.emit_to_string(source);
            log::error!("failed to build a {} shader: {message}", stage.label());
            GfxError::ShaderCompile { stage, message }
        })?;

        if entry_point(&module, stage).is_none() {
            return Err(GfxError::ShaderCompile {
                stage,
                message: format!("source has no {} entry point", stage.label()),
            });
        }

        Ok(Self {
            stage,
            source: source.to_owned(),
            module,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

fn entry_point(module: &naga::Module, stage: ShaderStage) -> Option<&naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.to_naga())
}

/// Vertex-input names mapped to their `@location` indices.
///
/// Both argument styles count: direct `@location` arguments and members of a
/// struct argument.
fn vertex_inputs(module: &naga::Module, entry: &naga::EntryPoint) -> HashMap<String, u32> {
    let mut inputs = HashMap::new();

    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(naga::Binding::Location { location, .. }) => {
                if let Some(name) = &arg.name {
                    inputs.insert(name.clone(), *location);
                }
            }
            Some(naga::Binding::BuiltIn(_)) => {}
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let (Some(name), Some(naga::Binding::Location { location, .. })) =
                            (&member.name, &member.binding)
                        {
                            inputs.insert(name.clone(), *location);
                        }
                    }
                }
            }
        }
    }

    inputs
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UniformGlobal {
    name: String,
    group: u32,
    binding: u32,
    ty: UniformType,
}

/// Uniform globals declared by a module, in declaration order.
fn uniform_globals(module: &naga::Module) -> Result<Vec<UniformGlobal>, GfxError> {
    let mut globals = Vec::new();

    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let Some(name) = var.name.clone() else { continue };
        let Some(resource) = &var.binding else { continue };

        let ty = match &module.types[var.ty].inner {
            naga::TypeInner::Scalar(naga::Scalar {
                kind: naga::ScalarKind::Float,
                width: 4,
            }) => UniformType::F32,
            naga::TypeInner::Scalar(naga::Scalar {
                kind: naga::ScalarKind::Sint,
                width: 4,
            }) => UniformType::I32,
            naga::TypeInner::Scalar(naga::Scalar {
                kind: naga::ScalarKind::Uint,
                width: 4,
            }) => UniformType::U32,
            naga::TypeInner::Vector {
                size: naga::VectorSize::Tri,
                scalar:
                    naga::Scalar {
                        kind: naga::ScalarKind::Float,
                        width: 4,
                    },
            } => UniformType::Vec3,
            other => {
                return Err(GfxError::ProgramLink(format!(
                    "uniform `{name}` has an unsupported type: {other:?}"
                )));
            }
        };

        globals.push(UniformGlobal {
            name,
            group: resource.group,
            binding: resource.binding,
            ty,
        });
    }

    Ok(globals)
}

/// Shared state behind a linked program.
pub(crate) struct ProgramInner {
    pub id: u64,
    pub queue: wgpu::Queue,
    pub vs_module: wgpu::ShaderModule,
    pub fs_module: wgpu::ShaderModule,
    pub vs_entry: String,
    pub fs_entry: String,
    pub attributes: HashMap<String, u32>,
    pub uniforms: Vec<UniformSlot>,
    pub uniform_names: HashMap<String, usize>,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

/// A linked shader program: one vertex and one fragment stage.
///
/// Cloning is cheap and clones refer to the same program; identity comes
/// from a context-allocated id.
#[derive(Clone)]
pub struct ShaderProgram {
    inner: Rc<ProgramInner>,
}

impl ShaderProgram {
    pub fn builder() -> ShaderProgramBuilder {
        ShaderProgramBuilder::default()
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub(crate) fn inner(&self) -> &Rc<ProgramInner> {
        &self.inner
    }

    /// Makes this program the context's active one.
    pub fn bind(&self, ctx: &mut GfxContext) {
        ctx.bind_program(self);
    }

    /// Whether this program is the context's active one.
    pub fn is_bound(&self, ctx: &GfxContext) -> bool {
        ctx.bound_program_id() == Some(self.id())
    }

    /// Shader location of a named vertex input, if the program has one.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.inner.attributes.get(name).copied()
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.inner.uniform_names.contains_key(name)
    }

    /// Resolves a named uniform.
    ///
    /// Unknown names (and type mismatches) are not errors: shader uniforms
    /// may be optimized out or vary by build, so the caller gets a blank
    /// handle that absorbs reads and writes, and a warning is logged.
    pub fn uniform<T: UniformValue>(&self, name: &str) -> Uniform<T> {
        let Some(&slot) = self.inner.uniform_names.get(name) else {
            log::warn!("could not find uniform with name `{name}`; returning a blank handle");
            return Uniform::blank(name);
        };

        let declared = self.inner.uniforms[slot].ty;
        if declared != T::TYPE {
            log::warn!(
                "uniform `{name}` is declared as {declared:?} but was requested as {:?}; \
                 returning a blank handle",
                T::TYPE
            );
            return Uniform::blank(name);
        }

        Uniform::live(name, Rc::clone(&self.inner), slot)
    }
}

/// Accumulates shader stages and links them into a [`ShaderProgram`].
#[derive(Default)]
pub struct ShaderProgramBuilder {
    shaders: Vec<Shader>,
}

impl ShaderProgramBuilder {
    pub fn attach_shader(mut self, shader: Shader) -> Self {
        self.shaders.push(shader);
        self
    }

    /// Links the attached stages.
    ///
    /// Link failures carry a descriptive message: a missing or duplicated
    /// stage, a uniform declared incompatibly across stages, duplicate
    /// bindings, or uniforms outside bind group 0.
    pub fn build(self, ctx: &mut GfxContext) -> Result<ShaderProgram, GfxError> {
        let mut vertex = None;
        let mut fragment = None;
        for shader in self.shaders {
            let slot = match shader.stage() {
                ShaderStage::Vertex => &mut vertex,
                ShaderStage::Fragment => &mut fragment,
            };
            if slot.is_some() {
                return Err(link_error(format!(
                    "more than one {} stage attached",
                    shader.stage().label()
                )));
            }
            *slot = Some(shader);
        }
        let vertex = vertex.ok_or_else(|| link_error("no vertex stage attached".to_owned()))?;
        let fragment =
            fragment.ok_or_else(|| link_error("no fragment stage attached".to_owned()))?;

        let merged = merge_uniforms(
            uniform_globals(&vertex.module)?,
            uniform_globals(&fragment.module)?,
        )?;

        let vs_entry = entry_point(&vertex.module, ShaderStage::Vertex)
            .map(|ep| ep.name.clone())
            .ok_or_else(|| link_error("vertex stage has no entry point".to_owned()))?;
        let fs_entry = entry_point(&fragment.module, ShaderStage::Fragment)
            .map(|ep| ep.name.clone())
            .ok_or_else(|| link_error("fragment stage has no entry point".to_owned()))?;

        let attributes = entry_point(&vertex.module, ShaderStage::Vertex)
            .map(|ep| vertex_inputs(&vertex.module, ep))
            .unwrap_or_default();

        let device = ctx.device().clone();
        let vs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trigon vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex.source.as_str().into()),
        });
        let fs_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trigon fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment.source.as_str().into()),
        });

        let mut uniforms = Vec::with_capacity(merged.len());
        let mut uniform_names = HashMap::new();
        for global in merged {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("uniform `{}`", global.name)),
                size: UNIFORM_SLOT_BYTES as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            uniform_names.insert(global.name.clone(), uniforms.len());
            uniforms.push(UniformSlot {
                name: global.name,
                binding: global.binding,
                ty: global.ty,
                buffer,
                mirror: RefCell::new([0u8; UNIFORM_SLOT_BYTES]),
            });
        }
        for slot in &uniforms {
            log::debug!("linked uniform `{}` at binding {}", slot.name, slot.binding);
        }

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("trigon program bgl"),
                entries: &layout_entries,
            });

        let group_entries: Vec<wgpu::BindGroupEntry> = uniforms
            .iter()
            .map(|slot| wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: slot.buffer.as_entire_binding(),
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trigon program bind group"),
            layout: &bind_group_layout,
            entries: &group_entries,
        });

        Ok(ShaderProgram {
            inner: Rc::new(ProgramInner {
                id: ctx.alloc_program_id(),
                queue: ctx.queue().clone(),
                vs_module,
                fs_module,
                vs_entry,
                fs_entry,
                attributes,
                uniforms,
                uniform_names,
                bind_group_layout,
                bind_group,
            }),
        })
    }
}

fn link_error(message: String) -> GfxError {
    log::error!("failed to link a shader program: {message}");
    GfxError::ProgramLink(message)
}

fn merge_uniforms(
    vertex: Vec<UniformGlobal>,
    fragment: Vec<UniformGlobal>,
) -> Result<Vec<UniformGlobal>, GfxError> {
    let mut merged = vertex;

    for global in fragment {
        match merged.iter().find(|m| m.name == global.name) {
            Some(existing) if *existing == global => {}
            Some(_) => {
                return Err(link_error(format!(
                    "uniform `{}` is declared incompatibly in the vertex and fragment stages",
                    global.name
                )));
            }
            None => merged.push(global),
        }
    }

    for global in &merged {
        if global.group != 0 {
            return Err(link_error(format!(
                "uniform `{}` must live in bind group 0 (found group {})",
                global.name, global.group
            )));
        }
        let same_binding = merged
            .iter()
            .filter(|other| other.binding == global.binding)
            .count();
        if same_binding > 1 {
            return Err(link_error(format!(
                "binding {} is declared by more than one uniform",
                global.binding
            )));
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX_SRC: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    "#;

    const FRAGMENT_SRC: &str = r#"
        @group(0) @binding(0) var<uniform> u_time: f32;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(u_time, 0.0, 0.0, 1.0);
        }
    "#;

    // ── compilation ───────────────────────────────────────────────────────

    #[test]
    fn valid_stages_compile() {
        assert!(Shader::new(ShaderStage::Vertex, VERTEX_SRC).is_ok());
        assert!(Shader::new(ShaderStage::Fragment, FRAGMENT_SRC).is_ok());
    }

    #[test]
    fn syntax_errors_carry_the_compiler_diagnostic() {
        let err = Shader::new(ShaderStage::Vertex, "@vertex fn broken( -> {").unwrap_err();
        let GfxError::ShaderCompile { stage, message } = err else {
            panic!("expected a compile error");
        };
        assert_eq!(stage, ShaderStage::Vertex);
        assert!(!message.is_empty());
    }

    #[test]
    fn wrong_stage_is_a_compile_error() {
        // A fragment-only source offered as a vertex stage has no entry point.
        let err = Shader::new(ShaderStage::Vertex, FRAGMENT_SRC).unwrap_err();
        assert!(matches!(err, GfxError::ShaderCompile { .. }));
    }

    // ── reflection ────────────────────────────────────────────────────────

    #[test]
    fn direct_arguments_reflect_locations() {
        let shader = Shader::new(ShaderStage::Vertex, VERTEX_SRC).unwrap();
        let entry = entry_point(&shader.module, ShaderStage::Vertex).unwrap();
        let inputs = vertex_inputs(&shader.module, entry);
        assert_eq!(inputs.get("position"), Some(&0));
    }

    #[test]
    fn struct_arguments_reflect_member_locations() {
        let src = r#"
            struct VertexIn {
                @location(0) position: vec3<f32>,
                @location(1) weight: f32,
            }

            @vertex
            fn vs_main(in: VertexIn) -> @builtin(position) vec4<f32> {
                return vec4<f32>(in.position * in.weight, 1.0);
            }
        "#;
        let shader = Shader::new(ShaderStage::Vertex, src).unwrap();
        let entry = entry_point(&shader.module, ShaderStage::Vertex).unwrap();
        let inputs = vertex_inputs(&shader.module, entry);
        assert_eq!(inputs.get("position"), Some(&0));
        assert_eq!(inputs.get("weight"), Some(&1));
    }

    #[test]
    fn uniform_globals_reflect_names_and_bindings() {
        let src = r#"
            @group(0) @binding(0) var<uniform> u_time: f32;
            @group(0) @binding(1) var<uniform> u_tint: vec3<f32>;
            @group(0) @binding(2) var<uniform> u_mode: i32;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                _ = u_mode;
                return vec4<f32>(u_tint * u_time, 1.0);
            }
        "#;
        let shader = Shader::new(ShaderStage::Fragment, src).unwrap();
        let globals = uniform_globals(&shader.module).unwrap();
        assert_eq!(globals.len(), 3);
        assert!(globals.contains(&UniformGlobal {
            name: "u_time".to_owned(),
            group: 0,
            binding: 0,
            ty: UniformType::F32,
        }));
        assert!(globals.contains(&UniformGlobal {
            name: "u_tint".to_owned(),
            group: 0,
            binding: 1,
            ty: UniformType::Vec3,
        }));
        assert!(globals.contains(&UniformGlobal {
            name: "u_mode".to_owned(),
            group: 0,
            binding: 2,
            ty: UniformType::I32,
        }));
    }

    // ── uniform merging ───────────────────────────────────────────────────

    fn global(name: &str, binding: u32, ty: UniformType) -> UniformGlobal {
        UniformGlobal {
            name: name.to_owned(),
            group: 0,
            binding,
            ty,
        }
    }

    #[test]
    fn shared_uniforms_merge_to_one_slot() {
        let merged = merge_uniforms(
            vec![global("u_time", 0, UniformType::F32)],
            vec![
                global("u_time", 0, UniformType::F32),
                global("u_tint", 1, UniformType::Vec3),
            ],
        )
        .unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn conflicting_declarations_fail_to_link() {
        let err = merge_uniforms(
            vec![global("u_time", 0, UniformType::F32)],
            vec![global("u_time", 0, UniformType::I32)],
        )
        .unwrap_err();
        assert!(matches!(err, GfxError::ProgramLink(_)));
    }

    #[test]
    fn duplicate_bindings_fail_to_link() {
        let err = merge_uniforms(
            vec![global("u_time", 0, UniformType::F32)],
            vec![global("u_tint", 0, UniformType::Vec3)],
        )
        .unwrap_err();
        assert!(matches!(err, GfxError::ProgramLink(_)));
    }

    #[test]
    fn uniforms_outside_group_zero_fail_to_link() {
        let mut g = global("u_time", 0, UniformType::F32);
        g.group = 1;
        let err = merge_uniforms(vec![g], Vec::new()).unwrap_err();
        assert!(matches!(err, GfxError::ProgramLink(_)));
    }
}
