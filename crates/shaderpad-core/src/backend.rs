//! Rendering backend capability set.
//!
//! The core never talks to a graphics API directly. Everything it needs is on [`Backend`], so
//! reflection, dispatch and the frame loop can run against a recording mock in tests.

use std::fmt::Debug;

use crate::program::ShaderStage;

/// Component count of a vector uniform write (`uniform{1..4}{f,i}v`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Components {
    One,
    Two,
    Three,
    Four,
}

impl Components {
    pub fn from_cols(cols: u8) -> Option<Self> {
        match cols {
            1 => Some(Components::One),
            2 => Some(Components::Two),
            3 => Some(Components::Three),
            4 => Some(Components::Four),
            _ => None,
        }
    }

    pub fn count(self) -> usize {
        match self {
            Components::One => 1,
            Components::Two => 2,
            Components::Three => 3,
            Components::Four => 4,
        }
    }
}

/// Order of a square matrix uniform write (`uniformMatrix{2,3,4}fv`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixOrder {
    Two,
    Three,
    Four,
}

impl MatrixOrder {
    pub fn from_cols(cols: u8) -> Option<Self> {
        match cols {
            2 => Some(MatrixOrder::Two),
            3 => Some(MatrixOrder::Three),
            4 => Some(MatrixOrder::Four),
            _ => None,
        }
    }

    pub fn element_count(self) -> usize {
        match self {
            MatrixOrder::Two => 4,
            MatrixOrder::Three => 9,
            MatrixOrder::Four => 16,
        }
    }
}

/// Backend-reported info for one active uniform index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUniform {
    pub name: String,
    pub type_id: u32,
    /// Array length (1 for non-array uniforms).
    pub size: i32,
}

/// The graphics operations the core consumes.
///
/// Object creation reports failures as backend diagnostics (`String`), like `glow` does.
/// Implementations must keep the underlying context current for every call.
pub trait Backend {
    type Shader: Clone + Debug;
    type Program: Clone + Debug;
    type Location: Clone + Debug;
    type Buffer: Clone + Debug;

    // ---- Shaders ----
    fn create_shader(&mut self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&mut self, shader: &Self::Shader, source: &str);
    fn compile_shader(&mut self, shader: &Self::Shader);
    fn shader_compile_status(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> String;
    fn delete_shader(&mut self, shader: Self::Shader);

    // ---- Programs ----
    fn create_program(&mut self) -> Result<Self::Program, String>;
    fn attach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);
    fn detach_shader(&mut self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&mut self, program: &Self::Program);
    fn program_link_status(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> String;
    fn delete_program(&mut self, program: Self::Program);
    fn use_program(&mut self, program: Option<&Self::Program>);

    // ---- Reflection ----
    fn active_uniform_count(&self, program: &Self::Program) -> u32;
    fn active_uniform(&self, program: &Self::Program, index: u32) -> Option<ActiveUniform>;
    fn uniform_location(&self, program: &Self::Program, name: &str) -> Option<Self::Location>;
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;

    // ---- Uniform writes (target the currently used program) ----
    fn uniform_f32v(&mut self, location: &Self::Location, components: Components, data: &[f32]);
    fn uniform_i32v(&mut self, location: &Self::Location, components: Components, data: &[i32]);
    /// Matrix data is passed through in caller order, never transposed.
    fn uniform_matrix_f32v(&mut self, location: &Self::Location, order: MatrixOrder, data: &[f32]);

    // ---- Buffers / drawing ----
    fn create_buffer(&mut self) -> Result<Self::Buffer, String>;
    fn buffer_data_f32(&mut self, buffer: &Self::Buffer, data: &[f32]);
    fn delete_buffer(&mut self, buffer: Self::Buffer);
    /// Binds `buffer` as a tightly packed float attribute at `attrib`.
    fn vertex_attrib_f32(&mut self, buffer: &Self::Buffer, attrib: u32, components: i32);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    /// Clears color and depth (depth 1.0) with depth testing enabled (`LEQUAL`).
    fn clear(&mut self, color: [f32; 4]);
    fn draw_triangle_strip(&mut self, first: i32, count: i32);
}
