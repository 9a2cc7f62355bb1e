//! `archview diagram` command implementation.

use std::path::PathBuf;

use archview_blueprint::{DiagramRenderer, Palette};
use archview_config::Config;
use archview_plantuml::PlantUmlRenderer;
use clap::Args;

use super::{find_node, load_model};
use crate::error::CliError;
use crate::output::write_stdout;

/// Arguments for the diagram command.
#[derive(Args)]
pub(crate) struct DiagramArgs {
    /// Path to the JSON model.
    #[arg(short, long)]
    json: PathBuf,

    /// Id of the node to draw.
    #[arg(short, long)]
    id: String,

    /// Path to configuration file (default: auto-discover archview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl DiagramArgs {
    /// Execute the diagram command: print the node's `PlantUML` source.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded, the node does not
    /// exist, or no converter handles it.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let palette = config
            .diagrams
            .palette
            .and_then(Palette::new)
            .unwrap_or_default();

        let store = load_model(&self.json)?;
        let node = find_node(&store, &self.id)?;
        let uml = PlantUmlRenderer::new().render(node, &store, &palette)?;

        write_stdout(&uml)?;
        Ok(())
    }
}
