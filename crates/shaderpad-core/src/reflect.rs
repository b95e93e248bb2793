use tracing::{debug, warn};

use crate::backend::Backend;
use crate::taxonomy::{classify, ElementKind, Shape};

/// One active uniform of a linked program.
///
/// `shape` and `element` are derived once from the backend type id when the program is
/// reflected and never recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescriptor<L> {
    pub name: String,
    pub location: L,
    pub type_id: u32,
    pub type_name: String,
    /// `None` for opaque samplers and unknown types.
    pub shape: Option<Shape>,
    pub element: ElementKind,
    /// Backend-reported array length (1 for non-arrays). Edits address element 0.
    pub array_len: i32,
}

impl<L> UniformDescriptor<L> {
    pub fn is_matrix(&self) -> bool {
        self.shape.is_some_and(Shape::is_matrix)
    }

    /// Whether the UI should generate value controls for this uniform.
    pub fn is_editable(&self) -> bool {
        self.shape.is_some() && self.element != ElementKind::Undefined
    }

    /// `rows * cols`, or 0 for shapeless uniforms.
    pub fn component_count(&self) -> usize {
        self.shape.map(Shape::len).unwrap_or(0)
    }

    /// The initial control grid (rows of `cols` text values, all `"0"`).
    pub fn initial_values(&self) -> Option<Vec<Vec<String>>> {
        if !self.is_editable() {
            return None;
        }
        let shape = self.shape?;
        Some(vec![vec!["0".to_string(); shape.cols as usize]; shape.rows as usize])
    }
}

/// Enumerates the active uniforms of `program` in backend order.
///
/// Indices whose info or location cannot be queried are skipped with a warning.
pub fn reflect<B: Backend>(backend: &B, program: &B::Program) -> Vec<UniformDescriptor<B::Location>> {
    let count = backend.active_uniform_count(program);
    let mut out = Vec::with_capacity(count as usize);

    for index in 0..count {
        let Some(info) = backend.active_uniform(program, index) else {
            warn!(index, "active uniform query returned nothing; skipping");
            continue;
        };
        let Some(location) = backend.uniform_location(program, &info.name) else {
            warn!(name = %info.name, "uniform has no location; skipping");
            continue;
        };

        let ty = classify(info.type_id);
        let desc = UniformDescriptor {
            type_name: ty.display_name(info.type_id),
            name: info.name,
            location,
            type_id: info.type_id,
            shape: ty.shape,
            element: ty.element,
            array_len: info.size,
        };
        debug!(name = %desc.name, ty = %desc.type_name, "reflected uniform");
        out.push(desc);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::program::build_program;
    use crate::taxonomy::gl;

    #[test]
    fn reflects_shapes_in_backend_order() {
        let mut mock = MockBackend::new();
        mock.set_uniforms(&[
            ("uModelViewMatrix", gl::FLOAT_MAT4),
            ("factor", gl::FLOAT),
            ("colOffset", gl::FLOAT_VEC4),
        ]);
        let program = build_program(&mut mock, "v", "f").unwrap();

        let uniforms = reflect(&mock, &program);
        let got: Vec<_> = uniforms
            .iter()
            .map(|u| (u.name.as_str(), u.shape.map(|s| (s.rows, s.cols)), u.element))
            .collect();
        assert_eq!(
            got,
            vec![
                ("uModelViewMatrix", Some((4, 4)), ElementKind::Float),
                ("factor", Some((1, 1)), ElementKind::Float),
                ("colOffset", Some((1, 4)), ElementKind::Float),
            ]
        );
        assert!(uniforms[0].is_matrix());
        assert_eq!(uniforms[0].component_count(), 16);
    }

    #[test]
    fn ordering_is_not_alphabetical() {
        let mut mock = MockBackend::new();
        mock.set_uniforms(&[("zeta", gl::INT), ("alpha", gl::BOOL)]);
        let program = build_program(&mut mock, "v", "f").unwrap();

        let names: Vec<_> = reflect(&mock, &program).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn samplers_are_listed_but_not_editable() {
        let mut mock = MockBackend::new();
        mock.set_uniforms(&[("uTex", gl::SAMPLER_2D), ("uGain", gl::FLOAT_VEC2)]);
        let program = build_program(&mut mock, "v", "f").unwrap();

        let uniforms = reflect(&mock, &program);
        assert_eq!(uniforms.len(), 2);
        assert_eq!(uniforms[0].type_name, "SAMPLER_2D");
        assert!(!uniforms[0].is_editable());
        assert_eq!(uniforms[0].initial_values(), None);
        assert_eq!(
            uniforms[1].initial_values(),
            Some(vec![vec!["0".to_string(), "0".to_string()]])
        );
    }

    #[test]
    fn unaddressable_uniforms_are_skipped() {
        let mut mock = MockBackend::new();
        mock.set_uniforms(&[("a", gl::FLOAT), ("b", gl::FLOAT)]);
        mock.make_unaddressable("a");
        let program = build_program(&mut mock, "v", "f").unwrap();

        let names: Vec<_> = reflect(&mock, &program).into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["b"]);
    }
}
