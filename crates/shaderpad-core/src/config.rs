use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PadError;
use crate::shaders::{DEFAULT_FRAG, DEFAULT_VERT};

/// One preset component as written in JSON: a number, a string, or a bool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(serde_json::Number),
    Text(String),
    Bool(bool),
}

impl RawValue {
    /// Text form as an editable control would hold it. Bools become `1`/`0`; integral
    /// floats drop their fraction (`1.0` becomes `1`) so int uniforms accept them.
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Number(n) => number_text(n),
            RawValue::Text(s) => s.clone(),
            RawValue::Bool(true) => "1".to_string(),
            RawValue::Bool(false) => "0".to_string(),
        }
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const F64_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < F64_EXACT_INT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Pad configuration (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadConfig {
    /// Vertex shader path; the built-in shader is used when absent.
    #[serde(default)]
    pub vertex: Option<PathBuf>,

    /// Fragment shader path; the built-in shader is used when absent.
    #[serde(default)]
    pub fragment: Option<PathBuf>,

    /// Initial window width (pixels).
    #[serde(default = "default_width")]
    pub width: u32,

    /// Initial window height (pixels).
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_title")]
    pub title: String,

    /// `tracing` filter directive, e.g. `"info,shaderpad_core=debug"`.
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Values applied to uniforms after every successful load, row-major.
    #[serde(default)]
    pub uniforms: BTreeMap<String, Vec<RawValue>>,

    /// Directory relative shader paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_width() -> u32 {
    960
}
fn default_height() -> u32 {
    540
}
fn default_title() -> String {
    "shaderpad".to_string()
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            vertex: None,
            fragment: None,
            width: default_width(),
            height: default_height(),
            title: default_title(),
            log_filter: None,
            uniforms: BTreeMap::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl PadConfig {
    fn validate(&self, path: &Path) -> Result<(), PadError> {
        if self.width == 0 || self.height == 0 {
            return Err(PadError::InvalidConfig {
                path: path.to_path_buf(),
                msg: "width/height must be > 0".into(),
            });
        }
        for (name, values) in &self.uniforms {
            if values.is_empty() {
                return Err(PadError::InvalidConfig {
                    path: path.to_path_buf(),
                    msg: format!("uniform '{name}' has no values"),
                });
            }
        }
        Ok(())
    }

    /// Resolves a configured path against `base_dir`.
    pub fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }

    /// Preset uniform values in text form, by uniform name.
    pub fn preset_values(&self) -> impl Iterator<Item = (&str, Vec<String>)> + '_ {
        self.uniforms
            .iter()
            .map(|(name, vals)| (name.as_str(), vals.iter().map(RawValue::to_text).collect()))
    }
}

/// Loads and validates a config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<PadConfig, PadError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg: PadConfig = serde_json::from_slice(&bytes).map_err(|source| PadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate(path)?;
    cfg.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(cfg)
}

/// The two shader sources of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vert: String,
    pub frag: String,
    /// Human-friendly origin (paths or "built-in") for logs.
    pub origin: String,
}

impl ShaderSources {
    pub fn new(vert: impl Into<String>, frag: impl Into<String>) -> Self {
        Self {
            vert: vert.into(),
            frag: frag.into(),
            origin: "inline".to_string(),
        }
    }

    pub fn builtin() -> Self {
        Self {
            vert: DEFAULT_VERT.to_string(),
            frag: DEFAULT_FRAG.to_string(),
            origin: "built-in".to_string(),
        }
    }

    /// Reads the configured sources from disk, falling back to the built-in stage.
    pub fn from_config(cfg: &PadConfig) -> Result<Self, PadError> {
        let read = |p: &Path| -> Result<String, PadError> {
            let path = cfg.resolve(p);
            fs::read_to_string(&path).map_err(|source| PadError::Io { path, source })
        };

        let vert = match &cfg.vertex {
            Some(p) => read(p)?,
            None => DEFAULT_VERT.to_string(),
        };
        let frag = match &cfg.fragment {
            Some(p) => read(p)?,
            None => DEFAULT_FRAG.to_string(),
        };
        let name = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| cfg.resolve(p).display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        };

        Ok(Self {
            vert,
            frag,
            origin: format!("{} + {}", name(&cfg.vertex), name(&cfg.fragment)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let cfg: PadConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.width, 960);
        assert_eq!(cfg.height, 540);
        assert_eq!(cfg.vertex, None);
        assert!(cfg.uniforms.is_empty());
    }

    #[test]
    fn preset_values_normalise_to_text() {
        let cfg: PadConfig = serde_json::from_str(
            r#"{ "uniforms": { "colOffset": ["0.1", 0, 0.5, true], "flag": [false] } }"#,
        )
        .unwrap();
        let presets: BTreeMap<_, _> = cfg.preset_values().collect();
        assert_eq!(presets["colOffset"], vec!["0.1", "0", "0.5", "1"]);
        assert_eq!(presets["flag"], vec!["0"]);
    }

    #[test]
    fn integral_float_presets_become_integers() {
        let cfg: PadConfig = serde_json::from_str(
            r#"{ "uniforms": { "count": [1.0, -3.0, 2.5, 1e300, 7] } }"#,
        )
        .unwrap();
        let presets: BTreeMap<_, _> = cfg.preset_values().collect();
        assert_eq!(presets["count"][..4], ["1", "-3", "2.5", "1e300"]);
        assert_eq!(presets["count"][4], "7");
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let cfg = PadConfig {
            base_dir: PathBuf::from("/tmp/pad"),
            ..PadConfig::default()
        };
        assert_eq!(cfg.resolve(Path::new("a.frag")), PathBuf::from("/tmp/pad/a.frag"));
        assert_eq!(cfg.resolve(Path::new("/abs.frag")), PathBuf::from("/abs.frag"));
    }

    #[test]
    fn builtin_sources_when_nothing_configured() {
        let s = ShaderSources::from_config(&PadConfig::default()).unwrap();
        assert_eq!(s, ShaderSources::builtin().with_origin("built-in + built-in"));
    }

    impl ShaderSources {
        fn with_origin(mut self, origin: &str) -> Self {
            self.origin = origin.to_string();
            self
        }
    }
}
