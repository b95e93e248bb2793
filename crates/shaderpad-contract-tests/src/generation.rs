//! Load/reload/edit contracts, exercised end to end over the recording backend.

use shaderpad_core::mock::{Call, MockBackend};
use shaderpad_core::taxonomy::gl;
use shaderpad_core::{
    App, FrameQueue, LoopState, MatrixOrder, PadError, Setter, ShaderSources, ShaderStage,
    TickOutcome,
};

fn pump(app: &mut App<MockBackend>, q: &mut FrameQueue, now: f64) -> Vec<TickOutcome> {
    q.take_due().into_iter().map(|t| app.tick(t, now, q)).collect()
}

fn app_with(table: &[(&str, u32)]) -> App<MockBackend> {
    let mut backend = MockBackend::new();
    backend.set_uniforms(table);
    App::new(backend)
}

/// Exactly one ticket is ever outstanding for the live generation.
#[test]
fn one_outstanding_ticket_per_frame() {
    let mut app = App::new(MockBackend::with_default_uniforms());
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::builtin(), &mut q).expect("load");

    for i in 0..5 {
        assert_eq!(q.len(), 1, "frame {i}");
        pump(&mut app, &mut q, i as f64 * 0.016);
    }
    assert_eq!(app.backend().draw_count(), 5);
}

#[test]
fn reload_supersedes_and_stale_ticket_does_nothing() {
    let mut app = App::new(MockBackend::with_default_uniforms());
    let mut q = FrameQueue::new();
    let g1 = app.load(&ShaderSources::builtin(), &mut q).expect("load G1");
    pump(&mut app, &mut q, 0.0);

    let g2 = app.reload(&ShaderSources::builtin(), &mut q).expect("reload G2");
    assert!(g2 > g1);
    // G1's rescheduled ticket plus G2's first one.
    assert_eq!(q.len(), 2);

    let draws = app.backend().draw_count();
    let outcomes = pump(&mut app, &mut q, 0.016);
    assert!(matches!(outcomes[0], TickOutcome::Stale { ticket, current } if ticket == g1 && current == g2));
    assert!(matches!(outcomes[1], TickOutcome::Rendered(ctx) if ctx.generation == g2 && ctx.delta_secs == 0.0));
    assert_eq!(app.backend().draw_count(), draws + 1);

    // The stale ticket was not rescheduled.
    assert_eq!(q.len(), 1);
    assert_eq!(app.backend().live_programs().len(), 1);
}

#[test]
fn initial_compile_error_leaves_nothing_running() {
    let mut backend = MockBackend::with_default_uniforms();
    backend.fail_compile(ShaderStage::Vertex, "0:1: syntax error");
    let mut app = App::new(backend);
    let mut q = FrameQueue::new();

    let err = app.load(&ShaderSources::builtin(), &mut q).expect_err("must fail");
    match err {
        PadError::Compile { stage, log } => {
            assert_eq!(stage, ShaderStage::Vertex);
            assert!(log.contains("syntax error"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(app.state(), LoopState::Idle);
    assert!(q.is_empty());
    assert!(app.uniforms().is_empty());
    assert!(app.backend().live_shaders().is_empty());
    assert!(app.backend().live_programs().is_empty());
}

#[test]
fn link_error_on_reload_keeps_previous_generation() {
    let mut app = App::new(MockBackend::with_default_uniforms());
    let mut q = FrameQueue::new();
    let g1 = app.load(&ShaderSources::builtin(), &mut q).expect("load");
    let p1 = *app.session().expect("session").program();

    app.backend_mut().fail_link("varying mismatch");
    let err = app.reload(&ShaderSources::builtin(), &mut q).expect_err("link fails");
    assert!(matches!(err, PadError::Link { .. }));

    assert_eq!(app.state(), LoopState::Running(g1));
    assert_eq!(app.backend().live_programs(), vec![p1]);
    let outcomes = pump(&mut app, &mut q, 0.0);
    assert!(matches!(outcomes[..], [TickOutcome::Rendered(ctx)] if ctx.generation == g1));

    // Fixing the sources and reloading recovers.
    app.backend_mut().clear_failures();
    let g2 = app.reload(&ShaderSources::builtin(), &mut q).expect("recovered");
    assert!(g2 > g1);
}

#[test]
fn stop_halts_drawing() {
    let mut app = App::new(MockBackend::with_default_uniforms());
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::builtin(), &mut q).expect("load");
    pump(&mut app, &mut q, 0.0);

    app.stop();
    let draws = app.backend().draw_count();
    let outcomes = pump(&mut app, &mut q, 0.016);
    assert!(matches!(outcomes[..], [TickOutcome::Stale { .. }]));
    assert!(q.is_empty());
    assert_eq!(app.backend().draw_count(), draws);
    assert!(app.backend().live_programs().is_empty());
}

#[test]
fn reflection_keeps_backend_order_and_classifies() {
    let mut app = app_with(&[
        ("uTex", gl::SAMPLER_2D),
        ("uXform", gl::FLOAT_MAT4),
        ("uCount", gl::INT_VEC3),
        ("uFlags", gl::BOOL_VEC2),
    ]);
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::new("v", "f"), &mut q).expect("load");

    let names: Vec<_> = app.uniforms().iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["uTex", "uXform", "uCount", "uFlags"]);

    let tex = &app.uniforms()[0];
    assert_eq!(tex.type_name, "SAMPLER_2D");
    assert!(!tex.is_editable());
    assert_eq!(tex.initial_values(), None);

    let xform = &app.uniforms()[1];
    assert!(xform.is_matrix());
    assert_eq!(xform.initial_values().map(|g| (g.len(), g[0].len())), Some((4, 4)));
}

#[test]
fn mat4_edit_writes_sixteen_values_in_input_order() {
    let mut app = app_with(&[("uXform", gl::FLOAT_MAT4)]);
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::new("v", "f"), &mut q).expect("load");
    app.backend_mut().take_calls();

    let raw: Vec<String> = (0..16).map(|i| i.to_string()).collect();
    let setter = app.apply_uniform("uXform", &raw).expect("16 values");
    assert_eq!(setter, Setter::Matrix(MatrixOrder::Four));

    let expected: Vec<f32> = (0..16).map(|i| i as f32).collect();
    let writes = app.backend().uniform_writes();
    assert_eq!(writes.len(), 1);
    assert!(matches!(writes[0], Call::UniformMatrix { data, .. } if *data == expected));

    let err = app.apply_uniform("uXform", &raw[..15]).expect_err("15 values");
    assert!(matches!(
        err,
        PadError::ShapeMismatch { expected: 16, actual: 15, .. }
    ));
    assert_eq!(app.backend().uniform_writes().len(), 1);
}

#[test]
fn bad_int_input_writes_nothing() {
    let mut app = app_with(&[("uCount", gl::INT_VEC3)]);
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::new("v", "f"), &mut q).expect("load");

    let err = app.apply_uniform("uCount", &["1", "x", "3"]).expect_err("x is not a number");
    assert!(matches!(err, PadError::InvalidNumericInput { ref raw_text } if raw_text == "x"));
    assert!(app.backend().uniform_writes().is_empty());
}

#[test]
fn bool_vector_goes_through_int_path() {
    let mut app = app_with(&[("uFlags", gl::BOOL_VEC2)]);
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::new("v", "f"), &mut q).expect("load");

    app.apply_uniform("uFlags", &["1", "0"]).expect("bools as ints");
    let writes = app.backend().uniform_writes();
    assert!(matches!(writes[..], [Call::UniformI32 { data, .. }] if *data == vec![1, 0]));
}

#[test]
fn sampler_edit_is_unsupported() {
    let mut app = app_with(&[("uTex", gl::SAMPLER_2D)]);
    let mut q = FrameQueue::new();
    app.load(&ShaderSources::new("v", "f"), &mut q).expect("load");

    let err = app.apply_uniform("uTex", &["0"]).expect_err("samplers are not editable");
    assert!(matches!(err, PadError::UnsupportedUniformType { .. }));
    assert!(!err.aborts_load());
    assert_eq!(app.state(), LoopState::Running(app.generation()));
}
