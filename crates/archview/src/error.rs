//! CLI error types.

use archview_blueprint::{BlueprintError, DiagramError};
use archview_config::ConfigError;
use archview_graph::LoadError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Blueprint(#[from] BlueprintError),

    #[error("{0}")]
    Diagram(#[from] DiagramError),

    #[error("No node with id '{0}' in the model")]
    NodeNotFound(String),
}
