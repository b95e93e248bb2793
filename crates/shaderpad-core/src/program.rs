use std::fmt;

use tracing::{debug, error};

use crate::backend::Backend;
use crate::error::PadError;

/// Pipeline stage of a shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiles one shader stage. A failed shader object is deleted before returning.
pub fn compile<B: Backend>(
    backend: &mut B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Shader, PadError> {
    let shader = backend
        .create_shader(stage)
        .map_err(|e| PadError::BackendCreate(format!("create_shader({stage}) failed: {e}")))?;
    backend.shader_source(&shader, source);
    backend.compile_shader(&shader);
    if !backend.shader_compile_status(&shader) {
        let log = backend.shader_info_log(&shader);
        backend.delete_shader(shader);
        error!(%stage, "shader compile failed:\n{log}");
        return Err(PadError::Compile { stage, log });
    }
    Ok(shader)
}

/// Links a vertex and fragment shader into a program.
///
/// Both shader objects are consumed: they are detached and deleted whether or not linking
/// succeeds, so the returned program is the only object left alive.
pub fn link<B: Backend>(
    backend: &mut B,
    vertex: B::Shader,
    fragment: B::Shader,
) -> Result<B::Program, PadError> {
    let program = match backend.create_program() {
        Ok(p) => p,
        Err(e) => {
            backend.delete_shader(vertex);
            backend.delete_shader(fragment);
            return Err(PadError::BackendCreate(format!("create_program failed: {e}")));
        }
    };

    backend.attach_shader(&program, &vertex);
    backend.attach_shader(&program, &fragment);
    backend.link_program(&program);

    backend.detach_shader(&program, &vertex);
    backend.detach_shader(&program, &fragment);
    backend.delete_shader(vertex);
    backend.delete_shader(fragment);

    if !backend.program_link_status(&program) {
        let log = backend.program_info_log(&program);
        backend.delete_program(program);
        error!("program link failed:\n{log}");
        return Err(PadError::Link { log });
    }

    debug!(?program, "program linked");
    Ok(program)
}

/// Compiles both stages and links them. Nothing is left allocated on failure.
pub fn build_program<B: Backend>(
    backend: &mut B,
    vert_src: &str,
    frag_src: &str,
) -> Result<B::Program, PadError> {
    let vs = compile(backend, ShaderStage::Vertex, vert_src)?;
    let fs = match compile(backend, ShaderStage::Fragment, frag_src) {
        Ok(fs) => fs,
        Err(e) => {
            backend.delete_shader(vs);
            return Err(e);
        }
    };
    link(backend, vs, fs)
}
