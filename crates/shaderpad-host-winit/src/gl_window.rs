//! winit window + glutin context creation.

use std::ffi::CString;
use std::num::NonZeroU32;

use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use raw_window_handle::HasRawWindowHandle;
use tracing::info;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use shaderpad_core::{PadConfig, PadError, Viewport};

fn unavailable(what: &str, e: impl std::fmt::Display) -> PadError {
    PadError::BackendUnavailable(format!("{what}: {e}"))
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

/// A window with a current GL context.
pub struct GlWindow {
    pub window: Window,
    surface: glutin::surface::Surface<glutin::surface::WindowSurface>,
    context: glutin::context::PossiblyCurrentContext,
}

impl std::fmt::Debug for GlWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlWindow")
            .field("window", &self.window.id())
            .finish_non_exhaustive()
    }
}

impl GlWindow {
    /// Opens the window and makes a core-profile context current. Also returns the loaded
    /// function table.
    pub fn new(
        event_loop: &EventLoop<()>,
        cfg: &PadConfig,
    ) -> Result<(Self, glow::Context), PadError> {
        let window_builder = WindowBuilder::new()
            .with_title(cfg.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                cfg.width as f64,
                cfg.height as f64,
            ));

        let template = glutin::config::ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24)
            .with_transparency(false);

        let display_builder =
            glutin_winit::DisplayBuilder::new().with_window_builder(Some(window_builder));

        // glutin only calls the picker with at least one matching config.
        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("glutin offers at least one config")
            })
            .map_err(|e| unavailable("DisplayBuilder.build", e))?;

        let window = window.ok_or_else(|| {
            PadError::BackendUnavailable("DisplayBuilder did not create a window".into())
        })?;
        let gl_display = gl_config.display();
        let raw_window_handle = window.raw_window_handle();

        let context_attributes = glutin::context::ContextAttributesBuilder::new()
            .with_profile(glutin::context::GlProfile::Core)
            .build(Some(raw_window_handle));
        let fallback_context_attributes = glutin::context::ContextAttributesBuilder::new()
            .with_profile(glutin::context::GlProfile::Core)
            .build(None);

        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .or_else(|_| gl_display.create_context(&gl_config, &fallback_context_attributes))
                .map_err(|e| unavailable("create_context", e))?
        };

        let size = window.inner_size();
        let attrs =
            glutin::surface::SurfaceAttributesBuilder::<glutin::surface::WindowSurface>::new()
                .build(raw_window_handle, non_zero(size.width), non_zero(size.height));

        let surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .map_err(|e| unavailable("create_window_surface", e))?
        };

        let context = not_current
            .make_current(&surface)
            .map_err(|e| unavailable("make_current", e))?;

        let gl = unsafe {
            glow::Context::from_loader_function(|s| match CString::new(s) {
                Ok(name) => gl_display.get_proc_address(name.as_c_str()) as *const _,
                Err(_) => std::ptr::null(),
            })
        };

        info!(
            width = size.width,
            height = size.height,
            samples = gl_config.num_samples(),
            "gl window ready"
        );
        Ok((
            Self {
                window,
                surface,
                context,
            },
            gl,
        ))
    }

    pub fn viewport(&self) -> Viewport {
        let s = self.window.inner_size();
        Viewport::new(s.width as i32, s.height as i32)
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.surface
            .resize(&self.context, non_zero(width), non_zero(height));
    }

    pub fn swap_buffers(&self) -> Result<(), PadError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| unavailable("swap_buffers", e))
    }
}
