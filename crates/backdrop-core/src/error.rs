use std::path::PathBuf;

use thiserror::Error;

/// Errors shared across the backdrop SDK crates.
///
/// Contract rule: this type lives in `backdrop-core` and is re-exported by the runtimes.
#[derive(Debug, Error)]
pub enum BackdropError {
    // ---- Config (SDK-level) ----
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json parse error at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config{}: {msg}", .path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    InvalidConfig { path: Option<PathBuf>, msg: String },

    // ---- Backend (program / geometry build) ----
    #[error("vertex shader compile error: {0}")]
    VertexCompile(String),

    #[error("fragment shader compile error: {0}")]
    FragmentCompile(String),

    #[error("program link error: {0}")]
    Link(String),

    #[error("backend object creation failed: {0}")]
    GlCreate(String),

    #[error("attribute '{0}' not found in linked program")]
    MissingAttribute(String),

    #[error("uniform '{0}' not found in linked program")]
    MissingUniform(String),

    #[error("texture unit {unit} unavailable (context exposes {max} combined units)")]
    TextureUnitUnavailable { unit: u32, max: u32 },

    // ---- Fallback ----
    #[error("{0}")]
    Other(String),
}

impl BackdropError {
    pub fn other<T: Into<String>>(s: T) -> Self {
        BackdropError::Other(s.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BackdropError::InvalidConfig {
            path: None,
            msg: msg.into(),
        }
    }

    /// Attach a path to an `InvalidConfig` raised before the source file was known.
    pub(crate) fn at_path(self, at: &std::path::Path) -> Self {
        match self {
            BackdropError::InvalidConfig { path: None, msg } => BackdropError::InvalidConfig {
                path: Some(at.to_path_buf()),
                msg,
            },
            other => other,
        }
    }

    /// True for failures raised while compiling, linking or introspecting the GPU program.
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            BackdropError::VertexCompile(_)
                | BackdropError::FragmentCompile(_)
                | BackdropError::Link(_)
                | BackdropError::GlCreate(_)
                | BackdropError::MissingAttribute(_)
                | BackdropError::MissingUniform(_)
                | BackdropError::TextureUnitUnavailable { .. }
        )
    }
}
