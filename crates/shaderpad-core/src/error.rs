use std::path::PathBuf;

use crate::program::ShaderStage;

/// Errors produced by the shader pad core.
///
/// Load-level failures (`Compile`, `Link`, `BackendUnavailable`, `BackendCreate`) abort the
/// whole load. Edit-level failures (`ShapeMismatch`, `UnsupportedUniformType`,
/// `InvalidNumericInput`, `UnknownUniform`, `NoProgram`) abort only the one uniform write.
#[derive(thiserror::Error, Debug)]
pub enum PadError {
    // ---- Program build ----
    #[error("{stage} shader compile error: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program link error: {log}")]
    Link { log: String },

    #[error("no graphics context available: {0}")]
    BackendUnavailable(String),

    #[error("backend object creation failed: {0}")]
    BackendCreate(String),

    // ---- Uniform edits ----
    #[error("uniform '{name}' expects {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("uniform '{name}' has unsupported type {type_name}")]
    UnsupportedUniformType { name: String, type_name: String },

    #[error("invalid numeric input '{raw_text}'")]
    InvalidNumericInput { raw_text: String },

    #[error("no active uniform named '{name}'")]
    UnknownUniform { name: String },

    #[error("no program is loaded")]
    NoProgram,

    // ---- Config / assets ----
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json parse error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config at {}: {msg}", path.display())]
    InvalidConfig { path: PathBuf, msg: String },
}

impl PadError {
    /// True for failures that abort a load/reload (as opposed to a single uniform edit).
    pub fn aborts_load(&self) -> bool {
        matches!(
            self,
            PadError::Compile { .. }
                | PadError::Link { .. }
                | PadError::BackendUnavailable(_)
                | PadError::BackendCreate(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_names_the_stage() {
        let e = PadError::Compile {
            stage: ShaderStage::Fragment,
            log: "0:3: syntax error".into(),
        };
        assert_eq!(e.to_string(), "fragment shader compile error: 0:3: syntax error");
        assert!(e.aborts_load());
    }

    #[test]
    fn edit_errors_do_not_abort_load() {
        let e = PadError::ShapeMismatch {
            name: "uModelViewMatrix".into(),
            expected: 16,
            actual: 15,
        };
        assert!(!e.aborts_load());
        assert!(e.to_string().contains("expects 16 values, got 15"));
    }
}
