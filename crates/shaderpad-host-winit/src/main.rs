//! `shaderpad`: renders a GLSL program onto a spinning quad and reloads it on demand.

mod cli;
mod gl_window;

use std::time::Instant;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};

use shaderpad_core::{App, FrameQueue, TickOutcome, Viewport};
use shaderpad_runtime_glow::GlowBackend;

use crate::cli::Cli;
use crate::gl_window::GlWindow;

fn initialise_tracing(config_filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config_filter.unwrap_or("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    if let Err(e) = run() {
        error!("{e:#}");
        eprintln!("[shaderpad] error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The filter can come from the config, so read it before installing the subscriber.
    let cfg = cli.resolve_config();
    initialise_tracing(cfg.as_ref().ok().and_then(|c| c.log_filter.as_deref()));
    let cfg = cfg?;

    let event_loop = EventLoop::new();
    let (gl_window, gl) = GlWindow::new(&event_loop, &cfg)?;
    let backend = unsafe { GlowBackend::new(gl)? };

    let mut app = App::new(backend);
    app.set_viewport(gl_window.viewport());
    app.set_presets(cfg.preset_values());

    let mut queue = FrameQueue::new();
    match shaderpad_core::ShaderSources::from_config(&cfg) {
        Ok(sources) => {
            if let Err(e) = app.load(&sources, &mut queue) {
                error!("initial load failed (fix the sources and press R): {e}");
            }
        }
        Err(e) => error!("reading shader sources: {e}"),
    }

    let mut app = Some(app);
    let start = Instant::now();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = if queue.is_empty() {
            ControlFlow::Wait
        } else {
            ControlFlow::Poll
        };

        let Some(pad) = app.as_mut() else {
            return;
        };

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,

                WindowEvent::Resized(size) => {
                    gl_window.resize(size.width, size.height);
                    pad.set_viewport(Viewport::new(size.width as i32, size.height as i32));
                    gl_window.window.request_redraw();
                }

                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => match key {
                    VirtualKeyCode::R | VirtualKeyCode::F5 => {
                        reload(&cli, pad, &mut queue);
                        gl_window.window.request_redraw();
                    }
                    VirtualKeyCode::P => {
                        refresh_presets(&cli, pad);
                        gl_window.window.request_redraw();
                    }
                    VirtualKeyCode::U => log_uniforms(pad),
                    VirtualKeyCode::S => {
                        if pad.is_running() {
                            pad.stop();
                            info!(generation = %pad.generation(), "rendering stopped");
                        } else {
                            info!("not running");
                        }
                    }
                    VirtualKeyCode::Escape => *control_flow = ControlFlow::Exit,
                    _ => {}
                },

                _ => {}
            },

            Event::MainEventsCleared => {
                if !queue.is_empty() {
                    gl_window.window.request_redraw();
                }
            }

            Event::RedrawRequested(_) => {
                let now = start.elapsed().as_secs_f64();
                let mut rendered = false;
                for ticket in queue.take_due() {
                    if let TickOutcome::Rendered(_) = pad.tick(ticket, now, &mut queue) {
                        rendered = true;
                    }
                }
                if rendered {
                    if let Err(e) = gl_window.swap_buffers() {
                        warn!("{e}");
                    }
                }
            }

            _ => {}
        }

        if *control_flow == ControlFlow::Exit {
            if let Some(pad) = app.take() {
                let backend = pad.teardown();
                unsafe { backend.destroy() };
                info!("bye");
            }
        }
    });
}

/// Re-reads config and sources from disk and swaps in the new program.
///
/// Any failure leaves the running generation untouched.
fn reload(cli: &Cli, app: &mut App<GlowBackend>, queue: &mut FrameQueue) {
    let (cfg, sources) = match cli.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("reload failed: {e:#}");
            return;
        }
    };
    app.set_presets(cfg.preset_values());
    match app.reload(&sources, queue) {
        Ok(generation) => info!(%generation, "reloaded"),
        Err(e) => error!(generation = %app.generation(), "reload failed, previous program kept: {e}"),
    }
}

/// Re-reads only the config's uniform values and writes them to the live program.
fn refresh_presets(cli: &Cli, app: &mut App<GlowBackend>) {
    match cli.resolve_config() {
        Ok(cfg) => {
            app.set_presets(cfg.preset_values());
            let applied = app.apply_presets();
            info!(applied, total = cfg.uniforms.len(), "presets applied");
        }
        Err(e) => error!("reading config: {e:#}"),
    }
}

fn log_uniforms(app: &App<GlowBackend>) {
    let uniforms = app.uniforms();
    if uniforms.is_empty() {
        info!("no program loaded");
        return;
    }
    for u in uniforms {
        info!(
            name = %u.name,
            ty = %u.type_name,
            shape = ?u.shape,
            array_len = u.array_len,
            editable = u.is_editable(),
            "uniform"
        );
    }
}
