//! archview CLI - generates Markdown views and `PlantUML` diagrams from a
//! JSON architecture model.
//!
//! Provides commands for:
//! - `generate`: Run a blueprint against a node and write the document
//! - `diagram`: Print the `PlantUML` source for a node
//! - `ids`: List the ids of nodes carrying a tag

mod commands;
mod error;
mod html;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DiagramArgs, GenerateArgs, IdsArgs};
use output::Output;

/// archview - Markdown views of JSON architecture models.
#[derive(Parser)]
#[command(name = "archview", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a document from a blueprint.
    Generate(GenerateArgs),
    /// Print the PlantUML diagram of a node.
    Diagram(DiagramArgs),
    /// List node ids by tag.
    Ids(IdsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => args.execute(),
        Commands::Diagram(args) => args.execute(),
        Commands::Ids(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
