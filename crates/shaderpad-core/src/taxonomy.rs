//! Static classification of backend uniform type ids.
//!
//! Type ids are OpenGL enum values. The table never changes at runtime; `classify` is a pure
//! lookup over it.

/// GL type enum values recognised by the taxonomy (same values as `glow::*`).
pub mod gl {
    pub const FLOAT: u32 = 0x1406;
    pub const FLOAT_VEC2: u32 = 0x8B50;
    pub const FLOAT_VEC3: u32 = 0x8B51;
    pub const FLOAT_VEC4: u32 = 0x8B52;
    pub const INT: u32 = 0x1404;
    pub const INT_VEC2: u32 = 0x8B53;
    pub const INT_VEC3: u32 = 0x8B54;
    pub const INT_VEC4: u32 = 0x8B55;
    pub const BOOL: u32 = 0x8B56;
    pub const BOOL_VEC2: u32 = 0x8B57;
    pub const BOOL_VEC3: u32 = 0x8B58;
    pub const BOOL_VEC4: u32 = 0x8B59;
    pub const FLOAT_MAT2: u32 = 0x8B5A;
    pub const FLOAT_MAT3: u32 = 0x8B5B;
    pub const FLOAT_MAT4: u32 = 0x8B5C;
    pub const SAMPLER_2D: u32 = 0x8B5E;
    pub const SAMPLER_CUBE: u32 = 0x8B60;
}

/// Scalar element kind of a uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float,
    Int,
    Bool,
    Undefined,
}

/// Numeric layout: `rows == 1` is a scalar/vector, `rows == cols > 1` is a square matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: u8,
    pub cols: u8,
}

impl Shape {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    #[inline]
    pub fn is_matrix(self) -> bool {
        self.rows > 1 && self.rows == self.cols
    }

    #[inline]
    pub fn len(self) -> usize {
        self.rows as usize * self.cols as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// Classification result for one type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// GL-style display name (`FLOAT_VEC3`, `SAMPLER_2D`, ...). `None` for unknown ids.
    pub name: Option<&'static str>,
    pub element: ElementKind,
    /// `None` for opaque samplers and unknown ids.
    pub shape: Option<Shape>,
}

impl TypeInfo {
    const fn known(name: &'static str, element: ElementKind, rows: u8, cols: u8) -> Self {
        Self {
            name: Some(name),
            element,
            shape: Some(Shape::new(rows, cols)),
        }
    }

    const fn opaque(name: &'static str) -> Self {
        Self {
            name: Some(name),
            element: ElementKind::Undefined,
            shape: None,
        }
    }

    const UNKNOWN: TypeInfo = TypeInfo {
        name: None,
        element: ElementKind::Undefined,
        shape: None,
    };

    /// Display name, falling back to the hex id for unknown types.
    pub fn display_name(&self, type_id: u32) -> String {
        match self.name {
            Some(n) => n.to_string(),
            None => format!("UNKNOWN(0x{type_id:04X})"),
        }
    }
}

/// Every type id the taxonomy knows, in declaration order.
pub const SUPPORTED_TYPE_IDS: [u32; 17] = [
    gl::FLOAT,
    gl::FLOAT_VEC2,
    gl::FLOAT_VEC3,
    gl::FLOAT_VEC4,
    gl::INT,
    gl::INT_VEC2,
    gl::INT_VEC3,
    gl::INT_VEC4,
    gl::BOOL,
    gl::BOOL_VEC2,
    gl::BOOL_VEC3,
    gl::BOOL_VEC4,
    gl::FLOAT_MAT2,
    gl::FLOAT_MAT3,
    gl::FLOAT_MAT4,
    gl::SAMPLER_2D,
    gl::SAMPLER_CUBE,
];

/// Maps a backend type id to its name, element kind and shape.
pub fn classify(type_id: u32) -> TypeInfo {
    use ElementKind::*;
    match type_id {
        gl::FLOAT => TypeInfo::known("FLOAT", Float, 1, 1),
        gl::FLOAT_VEC2 => TypeInfo::known("FLOAT_VEC2", Float, 1, 2),
        gl::FLOAT_VEC3 => TypeInfo::known("FLOAT_VEC3", Float, 1, 3),
        gl::FLOAT_VEC4 => TypeInfo::known("FLOAT_VEC4", Float, 1, 4),

        gl::INT => TypeInfo::known("INT", Int, 1, 1),
        gl::INT_VEC2 => TypeInfo::known("INT_VEC2", Int, 1, 2),
        gl::INT_VEC3 => TypeInfo::known("INT_VEC3", Int, 1, 3),
        gl::INT_VEC4 => TypeInfo::known("INT_VEC4", Int, 1, 4),

        gl::BOOL => TypeInfo::known("BOOL", Bool, 1, 1),
        gl::BOOL_VEC2 => TypeInfo::known("BOOL_VEC2", Bool, 1, 2),
        gl::BOOL_VEC3 => TypeInfo::known("BOOL_VEC3", Bool, 1, 3),
        gl::BOOL_VEC4 => TypeInfo::known("BOOL_VEC4", Bool, 1, 4),

        gl::FLOAT_MAT2 => TypeInfo::known("FLOAT_MAT2", Float, 2, 2),
        gl::FLOAT_MAT3 => TypeInfo::known("FLOAT_MAT3", Float, 3, 3),
        gl::FLOAT_MAT4 => TypeInfo::known("FLOAT_MAT4", Float, 4, 4),

        gl::SAMPLER_2D => TypeInfo::opaque("SAMPLER_2D"),
        gl::SAMPLER_CUBE => TypeInfo::opaque("SAMPLER_CUBE"),

        _ => TypeInfo::UNKNOWN,
    }
}
