use std::fmt;

use glam::{Mat4, Vec3};
use tracing::{debug, info};

use crate::backend::{Backend, MatrixOrder};
use crate::binding::{self, Setter, UniformValues};
use crate::error::PadError;
use crate::program::build_program;
use crate::reflect::{reflect, UniformDescriptor};
use crate::render_loop::FrameContext;
use crate::taxonomy::gl;

/// Quad corners, drawn as a triangle strip.
pub const QUAD_POSITIONS: [f32; 8] = [
    1.0, 1.0, //
    -1.0, 1.0, //
    1.0, -1.0, //
    -1.0, -1.0,
];

/// Per-corner RGBA: white, red, green, blue.
pub const QUAD_COLORS: [f32; 16] = [
    1.0, 1.0, 1.0, 1.0, //
    1.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 0.0, 1.0, //
    0.0, 0.0, 1.0, 1.0,
];

pub const ATTRIB_POSITION: &str = "aVertexPosition";
pub const ATTRIB_COLOR: &str = "aVertexColor";
pub const UNIFORM_PROJECTION: &str = "uProjectionMatrix";
pub const UNIFORM_MODEL_VIEW: &str = "uModelViewMatrix";

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const FIELD_OF_VIEW_DEG: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;
const CAMERA_Z: f32 = -6.0;

/// Drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960, 540)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Attribs {
    position: Option<u32>,
    color: Option<u32>,
}

/// Everything one generation renders with: the linked program, its reflected uniforms, and
/// the quad buffers. Released together by [`RenderSession::destroy`].
pub struct RenderSession<B: Backend> {
    program: B::Program,
    uniforms: Vec<UniformDescriptor<B::Location>>,
    position_buffer: B::Buffer,
    color_buffer: B::Buffer,
    attribs: Attribs,
    projection: Option<B::Location>,
    model_view: Option<B::Location>,
    rotation: f32,
}

impl<B: Backend> fmt::Debug for RenderSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSession")
            .field("program", &self.program)
            .field("uniforms", &self.uniforms.len())
            .field("attribs", &self.attribs)
            .field("rotation", &self.rotation)
            .finish()
    }
}

fn builtin_matrix<L: Clone>(uniforms: &[UniformDescriptor<L>], name: &str) -> Option<L> {
    uniforms
        .iter()
        .find(|u| u.name == name && u.type_id == gl::FLOAT_MAT4)
        .map(|u| u.location.clone())
}

fn create_quad_buffer<B: Backend>(backend: &mut B, data: &[f32]) -> Result<B::Buffer, PadError> {
    let buffer = backend
        .create_buffer()
        .map_err(|e| PadError::BackendCreate(format!("create_buffer failed: {e}")))?;
    backend.buffer_data_f32(&buffer, data);
    Ok(buffer)
}

impl<B: Backend> RenderSession<B> {
    /// Compiles, links and reflects the program and uploads the quad.
    ///
    /// On failure every backend object created so far is released.
    pub fn build(backend: &mut B, vert_src: &str, frag_src: &str) -> Result<Self, PadError> {
        let program = build_program(backend, vert_src, frag_src)?;
        let uniforms = reflect(backend, &program);

        let position_buffer = match create_quad_buffer(backend, &QUAD_POSITIONS) {
            Ok(b) => b,
            Err(e) => {
                backend.delete_program(program);
                return Err(e);
            }
        };
        let color_buffer = match create_quad_buffer(backend, &QUAD_COLORS) {
            Ok(b) => b,
            Err(e) => {
                backend.delete_buffer(position_buffer);
                backend.delete_program(program);
                return Err(e);
            }
        };

        let attribs = Attribs {
            position: backend.attrib_location(&program, ATTRIB_POSITION),
            color: backend.attrib_location(&program, ATTRIB_COLOR),
        };
        let projection = builtin_matrix(&uniforms, UNIFORM_PROJECTION);
        let model_view = builtin_matrix(&uniforms, UNIFORM_MODEL_VIEW);

        info!(
            uniforms = uniforms.len(),
            has_projection = projection.is_some(),
            has_model_view = model_view.is_some(),
            "session built"
        );

        Ok(Self {
            program,
            uniforms,
            position_buffer,
            color_buffer,
            attribs,
            projection,
            model_view,
            rotation: 0.0,
        })
    }

    #[inline]
    pub fn program(&self) -> &B::Program {
        &self.program
    }

    #[inline]
    pub fn uniforms(&self) -> &[UniformDescriptor<B::Location>] {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformDescriptor<B::Location>> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Current quad rotation about +Z, in radians.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    fn lookup(&self, name: &str) -> Result<&UniformDescriptor<B::Location>, PadError> {
        self.uniform(name).ok_or_else(|| PadError::UnknownUniform {
            name: name.to_string(),
        })
    }

    /// Writes editable-control text to the named uniform of this session's program.
    pub fn apply_uniform<S: AsRef<str>>(
        &self,
        backend: &mut B,
        name: &str,
        raw: &[S],
    ) -> Result<Setter, PadError> {
        let desc = self.lookup(name)?;
        backend.use_program(Some(&self.program));
        binding::apply(backend, desc, raw)
    }

    /// Writes typed values to the named uniform of this session's program.
    pub fn apply_uniform_values(
        &self,
        backend: &mut B,
        name: &str,
        values: UniformValues,
    ) -> Result<Setter, PadError> {
        let desc = self.lookup(name)?;
        backend.use_program(Some(&self.program));
        binding::apply_parsed(backend, desc, values)
    }

    /// Draws one frame of the quad and advances the rotation by the frame delta.
    pub fn draw(&mut self, backend: &mut B, frame: &FrameContext, viewport: Viewport) {
        backend.viewport(0, 0, viewport.width, viewport.height);
        backend.clear(CLEAR_COLOR);

        if let Some(attrib) = self.attribs.position {
            backend.vertex_attrib_f32(&self.position_buffer, attrib, 2);
        }
        if let Some(attrib) = self.attribs.color {
            backend.vertex_attrib_f32(&self.color_buffer, attrib, 4);
        }

        backend.use_program(Some(&self.program));

        if let Some(loc) = &self.projection {
            let projection = Mat4::perspective_rh_gl(
                FIELD_OF_VIEW_DEG.to_radians(),
                viewport.aspect(),
                Z_NEAR,
                Z_FAR,
            );
            backend.uniform_matrix_f32v(loc, MatrixOrder::Four, &projection.to_cols_array());
        }
        if let Some(loc) = &self.model_view {
            let model_view = Mat4::from_translation(Vec3::new(0.0, 0.0, CAMERA_Z))
                * Mat4::from_rotation_z(self.rotation);
            backend.uniform_matrix_f32v(loc, MatrixOrder::Four, &model_view.to_cols_array());
        }

        backend.draw_triangle_strip(0, 4);

        self.rotation += frame.delta_secs as f32;
    }

    /// Releases the program and buffers.
    pub fn destroy(self, backend: &mut B) {
        debug!(program = ?self.program, "destroying session");
        backend.use_program(None);
        backend.delete_buffer(self.position_buffer);
        backend.delete_buffer(self.color_buffer);
        backend.delete_program(self.program);
    }
}
