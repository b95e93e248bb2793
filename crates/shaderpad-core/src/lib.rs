#![forbid(unsafe_code)]

//! Backend-agnostic core of the shader pad.
//!
//! This crate owns everything between "two shader source strings" and "a program that is
//! drawing every frame with user-edited uniforms":
//! - compile/link (`program`)
//! - active-uniform reflection and the type taxonomy behind it (`reflect`, `taxonomy`)
//! - typed uniform writes from editable text (`binding`)
//! - the generation-guarded frame loop (`render_loop`) and the owning session/app (`session`, `app`)
//!
//! It does NOT contain windowing or a GL binding. Hosts plug a [`Backend`] in.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod app;
pub mod backend;
pub mod binding;
pub mod config;
pub mod error;
pub mod program;
pub mod reflect;
pub mod render_loop;
pub mod session;
pub mod shaders;
pub mod taxonomy;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// ---- Stable re-exports ----
pub use app::App;
pub use backend::{ActiveUniform, Backend, Components, MatrixOrder};
pub use binding::{apply, apply_parsed, parse_values, select_setter, Setter, UniformValues};
pub use config::{load_config, PadConfig, ShaderSources};
pub use error::PadError;
pub use program::{build_program, compile, link, ShaderStage};
pub use reflect::{reflect, UniformDescriptor};
pub use render_loop::{
    FrameContext, FrameQueue, FrameScheduler, FrameTicket, Generation, LoopState, RenderLoop,
    TickOutcome,
};
pub use session::{RenderSession, Viewport};
pub use taxonomy::{classify, ElementKind, Shape, TypeInfo};
