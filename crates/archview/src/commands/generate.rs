//! `archview generate` command implementation.

use std::path::{Path, PathBuf};

use archview_blueprint::{Interpreter, InterpreterConfig, Palette};
use archview_config::{CliSettings, Config, OutputFormat};
use archview_plantuml::PlantUmlRenderer;
use clap::{Args, ValueEnum};

use super::{find_node, load_model};
use crate::error::CliError;
use crate::html::markdown_to_html;
use crate::output::{Output, write_stdout};

/// Output format flag.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum FormatArg {
    /// Markdown.
    Md,
    /// HTML fragment.
    Html,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Md => Self::Markdown,
            FormatArg::Html => Self::Html,
        }
    }
}

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Path to the JSON model.
    #[arg(short, long)]
    json: PathBuf,

    /// Id of the node the root blueprint is run against.
    #[arg(short, long)]
    id: String,

    /// Root blueprint file; `@foreach` sub-blueprints are resolved next to it.
    #[arg(short, long)]
    blueprint: PathBuf,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output file (overrides config; default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum sub-view nesting (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Path to configuration file (default: auto-discover archview.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config, model or root blueprint cannot be
    /// loaded, the node does not exist, or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            max_depth: self.max_depth,
            format: self.format.map(OutputFormat::from),
            output: self.output,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let store = load_model(&self.json)?;
        let node = find_node(&store, &self.id)?;

        let renderer = PlantUmlRenderer::new();
        let interpreter = Interpreter::new(&store, &renderer)
            .with_config(interpreter_config(&config));
        let markdown = interpreter.run_file(node, &self.blueprint)?;

        let document = match config.generation.format {
            OutputFormat::Markdown => markdown,
            OutputFormat::Html => markdown_to_html(&markdown),
        };

        match &config.output_resolved.path {
            Some(path) => {
                write_document(path, &document)?;
                output.success(&format!(
                    "Generated {} ({})",
                    path.display(),
                    config.generation.format
                ));
            }
            None => write_stdout(&document)?,
        }

        Ok(())
    }
}

/// Interpreter settings from the loaded configuration.
fn interpreter_config(config: &Config) -> InterpreterConfig {
    let palette = config
        .diagrams
        .palette
        .clone()
        .and_then(Palette::new)
        .unwrap_or_default();
    InterpreterConfig::new()
        .with_max_depth(config.generation.max_depth)
        .with_palette(palette)
}

/// Write `document` to `path`, creating parent directories.
fn write_document(path: &Path, document: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, document)?;
    Ok(())
}
