//! shaderpad runtime (glow/OpenGL backend)
//
// This crate intentionally contains **only** the `Backend` implementation over a glow context:
// - shader/program objects and info logs
// - active-uniform queries and typed uniform writes
// - the quad's vertex buffers and draw state
//
// It does NOT contain windowing, context creation, file IO, or reload policy.
#![allow(clippy::missing_safety_doc)]

use glow::HasContext;
use tracing::debug;

use shaderpad_core::{ActiveUniform, Backend, Components, MatrixOrder, ShaderStage};

pub use shaderpad_core::PadError;

/// [`Backend`] over an OpenGL 3.3 core / GLES 3 context.
///
/// Core profiles refuse attribute state without a vertex array object, so one VAO is created
/// up front and stays bound for the backend's lifetime.
pub struct GlowBackend {
    gl: glow::Context,
    vao: glow::NativeVertexArray,
}

impl std::fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `glow::Context` holds the loaded function table; omit it.
        f.debug_struct("GlowBackend")
            .field("vao", &self.vao)
            .field("gl", &"<glow context>")
            .finish()
    }
}

impl GlowBackend {
    /// Wraps a loaded context.
    ///
    /// The context must stay current on this thread for as long as the backend is used.
    pub unsafe fn new(gl: glow::Context) -> Result<Self, PadError> {
        let vao = gl
            .create_vertex_array()
            .map_err(|e| PadError::BackendCreate(format!("create_vertex_array: {e}")))?;
        gl.bind_vertex_array(Some(vao));
        debug!(
            version = ?gl.version(),
            "glow backend ready"
        );
        Ok(Self { gl, vao })
    }

    #[inline]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Deletes the backend's own objects. Sessions must be destroyed first.
    pub unsafe fn destroy(self) {
        self.gl.bind_vertex_array(None);
        self.gl.delete_vertex_array(self.vao);
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

// Every call below goes through the context handed to `GlowBackend::new`, whose contract
// requires it to be current.
impl Backend for GlowBackend {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Location = glow::NativeUniformLocation;
    type Buffer = glow::NativeBuffer;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage_enum(stage)) }
    }

    fn shader_source(&mut self, shader: &Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(*shader, source) }
    }

    fn compile_shader(&mut self, shader: &Self::Shader) {
        unsafe { self.gl.compile_shader(*shader) }
    }

    fn shader_compile_status(&self, shader: &Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(*shader) }
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(*shader) }
    }

    fn delete_shader(&mut self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&mut self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader) {
        unsafe { self.gl.attach_shader(*program, *shader) }
    }

    fn detach_shader(&mut self, program: &Self::Program, shader: &Self::Shader) {
        unsafe { self.gl.detach_shader(*program, *shader) }
    }

    fn link_program(&mut self, program: &Self::Program) {
        unsafe { self.gl.link_program(*program) }
    }

    fn program_link_status(&self, program: &Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(*program) }
    }

    fn program_info_log(&self, program: &Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(*program) }
    }

    fn delete_program(&mut self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&mut self, program: Option<&Self::Program>) {
        unsafe { self.gl.use_program(program.copied()) }
    }

    fn active_uniform_count(&self, program: &Self::Program) -> u32 {
        unsafe { self.gl.get_active_uniforms(*program) }
    }

    fn active_uniform(&self, program: &Self::Program, index: u32) -> Option<ActiveUniform> {
        let info = unsafe { self.gl.get_active_uniform(*program, index) }?;
        Some(ActiveUniform {
            name: info.name,
            type_id: info.utype,
            size: info.size,
        })
    }

    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Location> {
        unsafe { self.gl.get_uniform_location(*program, name) }
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(*program, name) }
    }

    fn uniform_f32v(&mut self, location: &Self::Location, components: Components, data: &[f32]) {
        let loc = Some(location);
        unsafe {
            match components {
                Components::One => self.gl.uniform_1_f32_slice(loc, data),
                Components::Two => self.gl.uniform_2_f32_slice(loc, data),
                Components::Three => self.gl.uniform_3_f32_slice(loc, data),
                Components::Four => self.gl.uniform_4_f32_slice(loc, data),
            }
        }
    }

    fn uniform_i32v(&mut self, location: &Self::Location, components: Components, data: &[i32]) {
        let loc = Some(location);
        unsafe {
            match components {
                Components::One => self.gl.uniform_1_i32_slice(loc, data),
                Components::Two => self.gl.uniform_2_i32_slice(loc, data),
                Components::Three => self.gl.uniform_3_i32_slice(loc, data),
                Components::Four => self.gl.uniform_4_i32_slice(loc, data),
            }
        }
    }

    fn uniform_matrix_f32v(&mut self, location: &Self::Location, order: MatrixOrder, data: &[f32]) {
        let loc = Some(location);
        unsafe {
            match order {
                MatrixOrder::Two => self.gl.uniform_matrix_2_f32_slice(loc, false, data),
                MatrixOrder::Three => self.gl.uniform_matrix_3_f32_slice(loc, false, data),
                MatrixOrder::Four => self.gl.uniform_matrix_4_f32_slice(loc, false, data),
            }
        }
    }

    fn create_buffer(&mut self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn buffer_data_f32(&mut self, buffer: &Self::Buffer, data: &[f32]) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn delete_buffer(&mut self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn vertex_attrib_f32(&mut self, buffer: &Self::Buffer, attrib: u32, components: i32) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(*buffer));
            self.gl
                .vertex_attrib_pointer_f32(attrib, components, glow::FLOAT, false, 0, 0);
            self.gl.enable_vertex_attrib_array(attrib);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear_depth_f32(1.0);
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_func(glow::LEQUAL);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn draw_triangle_strip(&mut self, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLE_STRIP, first, count) }
    }
}
