//! Writing edited values back into uniforms.
//!
//! The setter is chosen from an explicit table keyed on `(is_matrix, element kind, cols)`;
//! every component is parsed before the single backend write, so a bad input never produces a
//! partial update.

use tracing::trace;

use crate::backend::{Backend, Components, MatrixOrder};
use crate::error::PadError;
use crate::reflect::UniformDescriptor;
use crate::taxonomy::ElementKind;

/// The typed backend uniform setter for a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setter {
    /// `uniform{N}fv`
    FloatVec(Components),
    /// `uniform{N}iv` (also used for bool uniforms)
    IntVec(Components),
    /// `uniformMatrix{N}fv`
    Matrix(MatrixOrder),
}

impl Setter {
    /// Number of values one write of this setter consumes.
    pub fn value_count(self) -> usize {
        match self {
            Setter::FloatVec(c) | Setter::IntVec(c) => c.count(),
            Setter::Matrix(o) => o.element_count(),
        }
    }
}

/// Dispatch table. `None` means no setter exists for the combination.
pub fn select_setter(is_matrix: bool, kind: ElementKind, cols: u8) -> Option<Setter> {
    use ElementKind::*;
    match (is_matrix, kind) {
        (true, Float) => MatrixOrder::from_cols(cols).map(Setter::Matrix),
        (true, Int | Bool | Undefined) => None,
        (false, Float) => Components::from_cols(cols).map(Setter::FloatVec),
        (false, Int | Bool) => Components::from_cols(cols).map(Setter::IntVec),
        (false, Undefined) => None,
    }
}

/// Parsed, typed uniform data.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValues {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl UniformValues {
    pub fn len(&self) -> usize {
        match self {
            UniformValues::F32(v) => v.len(),
            UniformValues::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn setter_for<L>(desc: &UniformDescriptor<L>) -> Result<Setter, PadError> {
    let unsupported = || PadError::UnsupportedUniformType {
        name: desc.name.clone(),
        type_name: desc.type_name.clone(),
    };
    let shape = desc.shape.ok_or_else(unsupported)?;
    select_setter(shape.is_matrix(), desc.element, shape.cols).ok_or_else(unsupported)
}

fn check_len<L>(desc: &UniformDescriptor<L>, actual: usize) -> Result<(), PadError> {
    let expected = desc.component_count();
    if actual != expected {
        return Err(PadError::ShapeMismatch {
            name: desc.name.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn parse_f32(raw: &str) -> Result<f32, PadError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PadError::InvalidNumericInput {
            raw_text: raw.to_string(),
        })
}

fn parse_i32(raw: &str) -> Result<i32, PadError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| PadError::InvalidNumericInput {
            raw_text: raw.to_string(),
        })
}

/// `2^31` is exact in `f32`; `i32::MAX` is not and rounds up to it.
const I32_LIMIT: f32 = 2_147_483_648.0;

fn f32_to_i32(f: f32) -> Result<i32, PadError> {
    if f.fract() == 0.0 && (-I32_LIMIT..I32_LIMIT).contains(&f) {
        Ok(f as i32)
    } else {
        Err(PadError::InvalidNumericInput {
            raw_text: f.to_string(),
        })
    }
}

/// One backend write: the setter together with values of its element type.
#[derive(Debug, Clone, PartialEq)]
enum Write {
    Float(Components, Vec<f32>),
    Int(Components, Vec<i32>),
    Matrix(MatrixOrder, Vec<f32>),
}

impl Write {
    fn parse<S: AsRef<str>>(setter: Setter, raw: &[S]) -> Result<Self, PadError> {
        let floats = || raw.iter().map(|s| parse_f32(s.as_ref())).collect::<Result<Vec<_>, _>>();
        match setter {
            Setter::FloatVec(c) => floats().map(|v| Write::Float(c, v)),
            Setter::Matrix(o) => floats().map(|v| Write::Matrix(o, v)),
            Setter::IntVec(c) => raw
                .iter()
                .map(|s| parse_i32(s.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .map(|v| Write::Int(c, v)),
        }
    }

    /// Converts between int and float only where no value changes.
    fn coerce(setter: Setter, values: UniformValues) -> Result<Self, PadError> {
        let floats = |values: UniformValues| match values {
            UniformValues::F32(v) => v,
            UniformValues::I32(v) => v.into_iter().map(|i| i as f32).collect(),
        };
        match setter {
            Setter::FloatVec(c) => Ok(Write::Float(c, floats(values))),
            Setter::Matrix(o) => Ok(Write::Matrix(o, floats(values))),
            Setter::IntVec(c) => match values {
                UniformValues::I32(v) => Ok(Write::Int(c, v)),
                UniformValues::F32(v) => v
                    .into_iter()
                    .map(f32_to_i32)
                    .collect::<Result<Vec<_>, _>>()
                    .map(|v| Write::Int(c, v)),
            },
        }
    }

    fn into_values(self) -> UniformValues {
        match self {
            Write::Float(_, v) | Write::Matrix(_, v) => UniformValues::F32(v),
            Write::Int(_, v) => UniformValues::I32(v),
        }
    }

    fn submit<B: Backend>(&self, backend: &mut B, location: &B::Location) {
        match self {
            Write::Float(c, v) => backend.uniform_f32v(location, *c, v),
            Write::Int(c, v) => backend.uniform_i32v(location, *c, v),
            Write::Matrix(o, v) => backend.uniform_matrix_f32v(location, *o, v),
        }
    }
}

/// Parses editable-control text with the numeric parser `setter` takes
/// (float for float vectors and matrices, integer for int and bool vectors).
pub fn parse_values<S: AsRef<str>>(setter: Setter, raw: &[S]) -> Result<UniformValues, PadError> {
    Write::parse(setter, raw).map(Write::into_values)
}

/// Parses `raw` (one text value per component, row-major) and writes it to `desc`.
///
/// Requires the descriptor's program to be the backend's current program.
pub fn apply<B: Backend, S: AsRef<str>>(
    backend: &mut B,
    desc: &UniformDescriptor<B::Location>,
    raw: &[S],
) -> Result<Setter, PadError> {
    let setter = setter_for(desc)?;
    check_len(desc, raw.len())?;
    let write = Write::parse(setter, raw)?;
    trace!(name = %desc.name, ?setter, "uniform write");
    write.submit(backend, &desc.location);
    Ok(setter)
}

/// Writes already-typed values to `desc`, converting between int and float where lossless.
pub fn apply_parsed<B: Backend>(
    backend: &mut B,
    desc: &UniformDescriptor<B::Location>,
    values: UniformValues,
) -> Result<Setter, PadError> {
    let setter = setter_for(desc)?;
    check_len(desc, values.len())?;
    let write = Write::coerce(setter, values)?;
    write.submit(backend, &desc.location);
    Ok(setter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Call, MockBackend};
    use crate::taxonomy::{classify, gl};

    fn desc(name: &str, type_id: u32, location: u32) -> UniformDescriptor<u32> {
        let ty = classify(type_id);
        UniformDescriptor {
            name: name.to_string(),
            location,
            type_id,
            type_name: ty.display_name(type_id),
            shape: ty.shape,
            element: ty.element,
            array_len: 1,
        }
    }

    fn strs(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn dispatch_table_covers_the_taxonomy() {
        assert_eq!(
            select_setter(true, ElementKind::Float, 4),
            Some(Setter::Matrix(MatrixOrder::Four))
        );
        assert_eq!(
            select_setter(false, ElementKind::Float, 3),
            Some(Setter::FloatVec(Components::Three))
        );
        assert_eq!(
            select_setter(false, ElementKind::Bool, 2),
            Some(Setter::IntVec(Components::Two))
        );
        assert_eq!(select_setter(true, ElementKind::Int, 2), None);
        assert_eq!(select_setter(false, ElementKind::Undefined, 1), None);

        for id in crate::taxonomy::SUPPORTED_TYPE_IDS {
            let d = desc("u", id, 1);
            match setter_for(&d) {
                Ok(s) => assert_eq!(s.value_count(), d.component_count()),
                Err(e) => assert!(matches!(e, PadError::UnsupportedUniformType { .. })),
            }
        }
    }

    #[test]
    fn mat4_writes_all_sixteen_values_in_input_order() {
        let mut mock = MockBackend::new();
        let d = desc("uModelViewMatrix", gl::FLOAT_MAT4, 7);
        let raw = strs(16);

        assert_eq!(
            apply(&mut mock, &d, &raw).unwrap(),
            Setter::Matrix(MatrixOrder::Four)
        );
        let writes = mock.uniform_writes();
        assert_eq!(writes.len(), 1);
        let expected: Vec<f32> = (0..16).map(|i| i as f32).collect();
        assert_eq!(
            writes[0],
            &Call::UniformMatrix {
                program: None,
                location: 7,
                order: MatrixOrder::Four,
                data: expected,
            }
        );
    }

    #[test]
    fn mat4_with_fifteen_values_is_a_shape_mismatch() {
        let mut mock = MockBackend::new();
        let d = desc("uModelViewMatrix", gl::FLOAT_MAT4, 7);

        let err = apply(&mut mock, &d, &strs(15)).unwrap_err();
        assert!(matches!(
            err,
            PadError::ShapeMismatch { expected: 16, actual: 15, .. }
        ));
        assert!(mock.uniform_writes().is_empty());
    }

    #[test]
    fn bad_int_component_means_no_write() {
        let mut mock = MockBackend::new();
        let d = desc("iv", gl::INT_VEC3, 3);

        let err = apply(&mut mock, &d, &["1", "2", "x"]).unwrap_err();
        assert!(matches!(err, PadError::InvalidNumericInput { ref raw_text } if raw_text == "x"));
        assert!(mock.uniform_writes().is_empty());
    }

    #[test]
    fn floats_are_not_accepted_for_int_uniforms() {
        let mut mock = MockBackend::new();
        let d = desc("i", gl::INT, 3);
        assert!(matches!(
            apply(&mut mock, &d, &["1.5"]),
            Err(PadError::InvalidNumericInput { .. })
        ));
        assert!(matches!(
            apply(&mut mock, &desc("f", gl::FLOAT, 4), &["NaN"]),
            Err(PadError::InvalidNumericInput { .. })
        ));
    }

    #[test]
    fn bool_uses_the_int_pathway() {
        let mut mock = MockBackend::new();
        let d = desc("flags", gl::BOOL_VEC2, 9);

        apply(&mut mock, &d, &["1", " 0 "]).unwrap();
        assert_eq!(
            mock.uniform_writes()[0],
            &Call::UniformI32 {
                program: None,
                location: 9,
                components: Components::Two,
                data: vec![1, 0],
            }
        );
    }

    #[test]
    fn samplers_are_unsupported() {
        let mut mock = MockBackend::new();
        let d = desc("uTex", gl::SAMPLER_2D, 1);
        assert!(matches!(
            apply(&mut mock, &d, &["0"]),
            Err(PadError::UnsupportedUniformType { .. })
        ));
        assert!(mock.uniform_writes().is_empty());
    }

    #[test]
    fn apply_parsed_converts_losslessly() {
        let mut mock = MockBackend::new();
        let f = desc("colOffset", gl::FLOAT_VEC4, 2);
        apply_parsed(&mut mock, &f, UniformValues::I32(vec![1, 0, 0, 1])).unwrap();

        let i = desc("count", gl::INT, 5);
        apply_parsed(&mut mock, &i, UniformValues::F32(vec![3.0])).unwrap();
        assert!(matches!(
            apply_parsed(&mut mock, &i, UniformValues::F32(vec![3.5])),
            Err(PadError::InvalidNumericInput { .. })
        ));

        let writes = mock.uniform_writes();
        assert_eq!(writes.len(), 2);
        assert!(matches!(writes[0], Call::UniformF32 { data, .. } if data == &vec![1.0, 0.0, 0.0, 1.0]));
        assert!(matches!(writes[1], Call::UniformI32 { data, .. } if data == &vec![3]));
    }

    #[test]
    fn float_to_int_rejects_values_outside_i32() {
        let mut mock = MockBackend::new();
        let i = desc("count", gl::INT, 5);

        // 2^31 is one past i32::MAX; it must not saturate.
        for out_of_range in [2_147_483_648.0f32, -2_147_483_904.0, f32::NAN] {
            assert!(
                matches!(
                    apply_parsed(&mut mock, &i, UniformValues::F32(vec![out_of_range])),
                    Err(PadError::InvalidNumericInput { .. })
                ),
                "{out_of_range} accepted"
            );
        }
        assert!(mock.uniform_writes().is_empty());

        apply_parsed(&mut mock, &i, UniformValues::F32(vec![-2_147_483_648.0])).unwrap();
        assert!(matches!(mock.uniform_writes()[..], [Call::UniformI32 { data, .. }] if *data == vec![i32::MIN]));
    }

    #[test]
    fn parse_values_follows_the_setter() {
        let floats = parse_values(Setter::Matrix(MatrixOrder::Two), &["1", "0", "0", "1"]).unwrap();
        assert_eq!(floats, UniformValues::F32(vec![1.0, 0.0, 0.0, 1.0]));

        let ints = parse_values(Setter::IntVec(Components::Two), &["1", " 0 "]).unwrap();
        assert_eq!(ints, UniformValues::I32(vec![1, 0]));

        assert!(matches!(
            parse_values(Setter::IntVec(Components::One), &["2.5"]),
            Err(PadError::InvalidNumericInput { .. })
        ));
    }
}
