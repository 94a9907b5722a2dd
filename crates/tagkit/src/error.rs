//! CLI error types.

use std::path::PathBuf;

use tagkit_config::ConfigError;
use tagkit_renderer::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid model in {}: {source}", path.display())]
    Model {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Render {
        path: PathBuf,
        source: RenderError,
    },

    #[error("{0}")]
    Validation(String),
}
