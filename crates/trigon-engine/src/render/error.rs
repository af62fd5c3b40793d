use std::fmt;

use super::shader::ShaderStage;

/// Errors surfaced by the graphics layer.
///
/// Misuse (describing buffer layout with no bound program) is an error the
/// caller may recover from or abort on — never an unconditional process
/// termination.
#[derive(Debug)]
pub enum GfxError {
    /// A shader stage failed to compile; `message` carries the compiler's
    /// rendered diagnostic.
    ShaderCompile {
        stage: ShaderStage,
        message: String,
    },
    /// Linking the attached stages failed.
    ProgramLink(String),
    /// An operation required a bound shader program and none was bound.
    NoBoundProgram,
    /// A draw was issued with no bound vertex buffer.
    NoBoundBuffer,
    /// An attribute name did not resolve against the bound program.
    UnknownAttribute { name: String },
    /// An attribute descriptor has no corresponding vertex format.
    UnsupportedAttribute { name: String, detail: String },
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::ShaderCompile { stage, message } => {
                write!(f, "failed to compile a {} shader: {message}", stage.label())
            }
            GfxError::ProgramLink(message) => {
                write!(f, "failed to link a shader program: {message}")
            }
            GfxError::NoBoundProgram => write!(f, "no shader program is bound"),
            GfxError::NoBoundBuffer => write!(f, "no vertex buffer is bound"),
            GfxError::UnknownAttribute { name } => {
                write!(f, "the bound program has no vertex input named `{name}`")
            }
            GfxError::UnsupportedAttribute { name, detail } => {
                write!(f, "attribute `{name}` is unsupported: {detail}")
            }
        }
    }
}

impl std::error::Error for GfxError {}
