//! Recording backend for tests.
//!
//! Handles are plain `u32` ids. Every call is appended to a log; compile/link outcomes and
//! the active-uniform table of the next linked program are scripted by the test.

use std::collections::{BTreeMap, BTreeSet};

use crate::backend::{ActiveUniform, Backend, Components, MatrixOrder};
use crate::program::ShaderStage;
use crate::taxonomy::gl;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    UniformF32 {
        program: Option<u32>,
        location: u32,
        components: Components,
        data: Vec<f32>,
    },
    UniformI32 {
        program: Option<u32>,
        location: u32,
        components: Components,
        data: Vec<i32>,
    },
    UniformMatrix {
        program: Option<u32>,
        location: u32,
        order: MatrixOrder,
        data: Vec<f32>,
    },
    CreateBuffer(u32),
    BufferData(u32, Vec<f32>),
    DeleteBuffer(u32),
    VertexAttrib {
        buffer: u32,
        attrib: u32,
        components: i32,
    },
    Viewport(i32, i32, i32, i32),
    Clear([f32; 4]),
    DrawTriangleStrip(i32, i32),
}

impl Call {
    pub fn is_uniform_write(&self) -> bool {
        matches!(
            self,
            Call::UniformF32 { .. } | Call::UniformI32 { .. } | Call::UniformMatrix { .. }
        )
    }
}

#[derive(Debug, Clone)]
struct MockUniform {
    info: ActiveUniform,
    location: Option<u32>,
}

#[derive(Debug, Default)]
struct MockProgram {
    linked: bool,
    uniforms: Vec<MockUniform>,
}

/// Test double for [`Backend`].
#[derive(Debug)]
pub struct MockBackend {
    next_id: u32,
    calls: Vec<Call>,

    shaders: BTreeMap<u32, ShaderStage>,
    programs: BTreeMap<u32, MockProgram>,
    buffers: BTreeSet<u32>,
    bound: Option<u32>,

    compile_failure: Option<(ShaderStage, String)>,
    link_failure: Option<String>,
    uniform_table: Vec<ActiveUniform>,
    unaddressable: BTreeSet<String>,
    attribs: BTreeMap<String, u32>,
    fail_buffers: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A backend whose programs expose `aVertexPosition`/`aVertexColor` and no uniforms.
    pub fn new() -> Self {
        let mut attribs = BTreeMap::new();
        attribs.insert("aVertexPosition".to_string(), 0);
        attribs.insert("aVertexColor".to_string(), 1);
        Self {
            next_id: 1,
            calls: Vec::new(),
            shaders: BTreeMap::new(),
            programs: BTreeMap::new(),
            buffers: BTreeSet::new(),
            bound: None,
            compile_failure: None,
            link_failure: None,
            uniform_table: Vec::new(),
            unaddressable: BTreeSet::new(),
            attribs,
            fail_buffers: false,
        }
    }

    /// Backend whose programs declare the uniforms of the default shader pair.
    pub fn with_default_uniforms() -> Self {
        let mut b = Self::new();
        b.set_uniforms(&[
            ("uModelViewMatrix", gl::FLOAT_MAT4),
            ("uProjectionMatrix", gl::FLOAT_MAT4),
            ("factor", gl::FLOAT),
            ("colOffset", gl::FLOAT_VEC4),
        ]);
        b
    }

    // ---- Scripting ----

    /// Every subsequent compile of `stage` fails with `log`.
    pub fn fail_compile(&mut self, stage: ShaderStage, log: &str) {
        self.compile_failure = Some((stage, log.to_string()));
    }

    /// Every subsequent link fails with `log`.
    pub fn fail_link(&mut self, log: &str) {
        self.link_failure = Some(log.to_string());
    }

    /// Subsequent `create_buffer` calls fail.
    pub fn fail_buffers(&mut self, fail: bool) {
        self.fail_buffers = fail;
    }

    pub fn clear_failures(&mut self) {
        self.compile_failure = None;
        self.link_failure = None;
        self.fail_buffers = false;
    }

    /// Active uniforms (name, type id) reported by programs linked from now on.
    pub fn set_uniforms(&mut self, table: &[(&str, u32)]) {
        self.uniform_table = table
            .iter()
            .map(|(name, type_id)| ActiveUniform {
                name: (*name).to_string(),
                type_id: *type_id,
                size: 1,
            })
            .collect();
    }

    /// `uniform_location` returns `None` for `name` in programs linked from now on.
    pub fn make_unaddressable(&mut self, name: &str) {
        self.unaddressable.insert(name.to_string());
    }

    // ---- Inspection ----

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn uniform_writes(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| c.is_uniform_write()).collect()
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::DrawTriangleStrip(..)))
            .count()
    }

    pub fn live_shaders(&self) -> Vec<u32> {
        self.shaders.keys().copied().collect()
    }

    pub fn live_programs(&self) -> Vec<u32> {
        self.programs.keys().copied().collect()
    }

    pub fn live_buffers(&self) -> Vec<u32> {
        self.buffers.iter().copied().collect()
    }

    pub fn bound_program(&self) -> Option<u32> {
        self.bound
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn find_uniform(&self, program: u32, name: &str) -> Option<&MockUniform> {
        self.programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.info.name == name)
    }
}

impl Backend for MockBackend {
    type Shader = u32;
    type Program = u32;
    type Location = u32;
    type Buffer = u32;

    fn create_shader(&mut self, stage: ShaderStage) -> Result<u32, String> {
        let id = self.alloc();
        self.shaders.insert(id, stage);
        self.calls.push(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&mut self, _shader: &u32, _source: &str) {}

    fn compile_shader(&mut self, shader: &u32) {
        self.calls.push(Call::CompileShader(*shader));
    }

    fn shader_compile_status(&self, shader: &u32) -> bool {
        match (&self.compile_failure, self.shaders.get(shader)) {
            (Some((failing, _)), Some(stage)) => failing != stage,
            _ => true,
        }
    }

    fn shader_info_log(&self, shader: &u32) -> String {
        match (&self.compile_failure, self.shaders.get(shader)) {
            (Some((failing, log)), Some(stage)) if failing == stage => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&mut self, shader: u32) {
        assert!(
            self.shaders.remove(&shader).is_some(),
            "delete_shader({shader}): not a live shader"
        );
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<u32, String> {
        let id = self.alloc();
        self.programs.insert(id, MockProgram::default());
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&mut self, _program: &u32, _shader: &u32) {}

    fn detach_shader(&mut self, _program: &u32, _shader: &u32) {}

    fn link_program(&mut self, program: &u32) {
        self.calls.push(Call::LinkProgram(*program));
        if self.link_failure.is_some() {
            return;
        }
        let table = self.uniform_table.clone();
        let mut uniforms = Vec::with_capacity(table.len());
        for info in table {
            let location = if self.unaddressable.contains(&info.name) {
                None
            } else {
                Some(self.alloc())
            };
            uniforms.push(MockUniform { info, location });
        }
        if let Some(p) = self.programs.get_mut(program) {
            p.linked = true;
            p.uniforms = uniforms;
        }
    }

    fn program_link_status(&self, program: &u32) -> bool {
        self.programs.get(program).map(|p| p.linked).unwrap_or(false)
    }

    fn program_info_log(&self, _program: &u32) -> String {
        self.link_failure.clone().unwrap_or_default()
    }

    fn delete_program(&mut self, program: u32) {
        assert!(
            self.programs.remove(&program).is_some(),
            "delete_program({program}): not a live program"
        );
        if self.bound == Some(program) {
            self.bound = None;
        }
        self.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<&u32>) {
        if let Some(p) = program {
            assert!(self.programs.contains_key(p), "use_program({p}): not a live program");
        }
        self.bound = program.copied();
        self.calls.push(Call::UseProgram(self.bound));
    }

    fn active_uniform_count(&self, program: &u32) -> u32 {
        self.programs
            .get(program)
            .map(|p| p.uniforms.len() as u32)
            .unwrap_or(0)
    }

    fn active_uniform(&self, program: &u32, index: u32) -> Option<ActiveUniform> {
        self.programs
            .get(program)?
            .uniforms
            .get(index as usize)
            .map(|u| u.info.clone())
    }

    fn uniform_location(&self, program: &u32, name: &str) -> Option<u32> {
        self.find_uniform(*program, name)?.location
    }

    fn attrib_location(&self, program: &u32, name: &str) -> Option<u32> {
        if !self.programs.contains_key(program) {
            return None;
        }
        self.attribs.get(name).copied()
    }

    fn uniform_f32v(&mut self, location: &u32, components: Components, data: &[f32]) {
        self.calls.push(Call::UniformF32 {
            program: self.bound,
            location: *location,
            components,
            data: data.to_vec(),
        });
    }

    fn uniform_i32v(&mut self, location: &u32, components: Components, data: &[i32]) {
        self.calls.push(Call::UniformI32 {
            program: self.bound,
            location: *location,
            components,
            data: data.to_vec(),
        });
    }

    fn uniform_matrix_f32v(&mut self, location: &u32, order: MatrixOrder, data: &[f32]) {
        self.calls.push(Call::UniformMatrix {
            program: self.bound,
            location: *location,
            order,
            data: data.to_vec(),
        });
    }

    fn create_buffer(&mut self) -> Result<u32, String> {
        if self.fail_buffers {
            return Err("out of memory".to_string());
        }
        let id = self.alloc();
        self.buffers.insert(id);
        self.calls.push(Call::CreateBuffer(id));
        Ok(id)
    }

    fn buffer_data_f32(&mut self, buffer: &u32, data: &[f32]) {
        self.calls.push(Call::BufferData(*buffer, data.to_vec()));
    }

    fn delete_buffer(&mut self, buffer: u32) {
        assert!(
            self.buffers.remove(&buffer),
            "delete_buffer({buffer}): not a live buffer"
        );
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn vertex_attrib_f32(&mut self, buffer: &u32, attrib: u32, components: i32) {
        assert!(self.buffers.contains(buffer), "vertex_attrib_f32: buffer {buffer} was freed");
        self.calls.push(Call::VertexAttrib {
            buffer: *buffer,
            attrib,
            components,
        });
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(Call::Viewport(x, y, width, height));
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(Call::Clear(color));
    }

    fn draw_triangle_strip(&mut self, first: i32, count: i32) {
        assert!(self.bound.is_some(), "draw without a bound program");
        self.calls.push(Call::DrawTriangleStrip(first, count));
    }
}
