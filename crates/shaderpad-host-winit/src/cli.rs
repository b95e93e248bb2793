use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use shaderpad_core::{load_config, PadConfig, ShaderSources};

/// Live GLSL pad.
///
/// Keys: R/F5 reload sources, P re-apply config uniform values, U list uniforms,
/// S stop rendering, Esc quit.
#[derive(Debug, Clone, Parser)]
#[command(name = "shaderpad", version, about)]
pub struct Cli {
    /// JSON config (shader paths, window size, uniform presets).
    pub config: Option<PathBuf>,

    /// Vertex shader path; overrides the config.
    #[arg(long, env = "SHADERPAD_VERTEX")]
    pub vertex: Option<PathBuf>,

    /// Fragment shader path; overrides the config.
    #[arg(long, env = "SHADERPAD_FRAGMENT")]
    pub fragment: Option<PathBuf>,
}

impl Cli {
    /// Reads the config file (or defaults) and applies the command-line overrides.
    ///
    /// Re-run on every reload so edits to the config's presets take effect too.
    pub fn resolve_config(&self) -> anyhow::Result<PadConfig> {
        let mut cfg = match &self.config {
            Some(path) => load_config(path)?,
            None => PadConfig::default(),
        };

        // Overrides are relative to the working directory, not the config file.
        let cwd = std::env::current_dir().context("reading current directory")?;
        if let Some(p) = &self.vertex {
            cfg.vertex = Some(cwd.join(p));
        }
        if let Some(p) = &self.fragment {
            cfg.fragment = Some(cwd.join(p));
        }
        Ok(cfg)
    }

    pub fn load(&self) -> anyhow::Result<(PadConfig, ShaderSources)> {
        let cfg = self.resolve_config()?;
        let sources = ShaderSources::from_config(&cfg)?;
        Ok((cfg, sources))
    }
}
