use std::fmt;

use tracing::{info, warn};

use crate::backend::Backend;
use crate::binding::{Setter, UniformValues};
use crate::config::ShaderSources;
use crate::error::PadError;
use crate::reflect::UniformDescriptor;
use crate::render_loop::{FrameScheduler, FrameTicket, Generation, LoopState, RenderLoop, TickOutcome};
use crate::session::{RenderSession, Viewport};

/// Orchestrates load/reload, uniform edits, and the frame loop over one backend.
///
/// The installed [`RenderSession`] belongs to exactly one generation. A reload builds the new
/// session first; only when that succeeds is the old generation superseded, its resources
/// released, and the new session installed and started. A failed build leaves the previous
/// generation installed and rendering.
pub struct App<B: Backend> {
    backend: B,
    render_loop: RenderLoop,
    session: Option<RenderSession<B>>,
    viewport: Viewport,
    presets: Vec<(String, Vec<String>)>,
}

impl<B: Backend> fmt::Debug for App<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("render_loop", &self.render_loop)
            .field("session", &self.session)
            .field("viewport", &self.viewport)
            .field("presets", &self.presets.len())
            .finish()
    }
}

impl<B: Backend> App<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            render_loop: RenderLoop::new(),
            session: None,
            viewport: Viewport::default(),
            presets: Vec::new(),
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.render_loop.generation()
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.render_loop.state()
    }

    /// Whether a generation is live and driving frames.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    #[inline]
    pub fn session(&self) -> Option<&RenderSession<B>> {
        self.session.as_ref()
    }

    /// Uniforms of the installed program, in backend order (empty when nothing is loaded).
    pub fn uniforms(&self) -> &[UniformDescriptor<B::Location>] {
        self.session.as_ref().map(|s| s.uniforms()).unwrap_or(&[])
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Preset values (uniform name, row-major text values) applied after each load.
    pub fn set_presets<I, N>(&mut self, presets: I)
    where
        I: IntoIterator<Item = (N, Vec<String>)>,
        N: Into<String>,
    {
        self.presets = presets.into_iter().map(|(n, v)| (n.into(), v)).collect();
    }

    /// Builds a program from `sources` and starts a new generation rendering it.
    pub fn load<S: FrameScheduler + ?Sized>(
        &mut self,
        sources: &ShaderSources,
        scheduler: &mut S,
    ) -> Result<Generation, PadError> {
        info!(origin = %sources.origin, "loading shaders");
        let session = RenderSession::build(&mut self.backend, &sources.vert, &sources.frag)?;

        // Supersede first so the old epoch's in-flight ticket cannot draw with freed handles.
        self.render_loop.invalidate();
        if let Some(old) = self.session.take() {
            old.destroy(&mut self.backend);
        }
        self.session = Some(session);
        self.apply_presets();

        Ok(self.render_loop.start(scheduler))
    }

    /// Same as [`App::load`]; the previous generation is replaced only on success.
    pub fn reload<S: FrameScheduler + ?Sized>(
        &mut self,
        sources: &ShaderSources,
        scheduler: &mut S,
    ) -> Result<Generation, PadError> {
        self.load(sources, scheduler)
    }

    /// Supersedes the live generation and releases its resources.
    pub fn stop(&mut self) {
        self.render_loop.invalidate();
        if let Some(old) = self.session.take() {
            old.destroy(&mut self.backend);
        }
    }

    /// Runs one scheduled frame callback.
    pub fn tick<S: FrameScheduler + ?Sized>(
        &mut self,
        ticket: FrameTicket,
        timestamp_secs: f64,
        scheduler: &mut S,
    ) -> TickOutcome {
        let Self {
            backend,
            render_loop,
            session,
            viewport,
            ..
        } = self;
        render_loop.tick(ticket, timestamp_secs, scheduler, |ctx| {
            if let Some(s) = session.as_mut() {
                s.draw(backend, ctx, *viewport);
            }
        })
    }

    /// Writes editable-control text to the named uniform of the installed program.
    pub fn apply_uniform<S: AsRef<str>>(&mut self, name: &str, raw: &[S]) -> Result<Setter, PadError> {
        let session = self.session.as_ref().ok_or(PadError::NoProgram)?;
        session.apply_uniform(&mut self.backend, name, raw)
    }

    pub fn apply_uniform_values(
        &mut self,
        name: &str,
        values: UniformValues,
    ) -> Result<Setter, PadError> {
        let session = self.session.as_ref().ok_or(PadError::NoProgram)?;
        session.apply_uniform_values(&mut self.backend, name, values)
    }

    /// Writes the preset values to the installed program without rebuilding it.
    ///
    /// Returns how many presets were applied; failing ones are logged and skipped.
    pub fn apply_presets(&mut self) -> usize {
        let Some(session) = self.session.as_ref() else {
            return 0;
        };
        let mut applied = 0;
        for (name, values) in &self.presets {
            match session.apply_uniform(&mut self.backend, name, values) {
                Ok(_) => applied += 1,
                Err(e) => warn!(uniform = %name, "preset skipped: {e}"),
            }
        }
        applied
    }

    /// Stops rendering, releases everything, and hands the backend back.
    pub fn teardown(mut self) -> B {
        self.stop();
        self.backend
    }
}
