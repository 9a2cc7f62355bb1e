//! `archview ids` command implementation.

use std::path::PathBuf;

use archview_graph::GraphStore;
use clap::Args;

use super::load_model;
use crate::error::CliError;
use crate::output::write_stdout;

/// Arguments for the ids command.
#[derive(Args)]
pub(crate) struct IdsArgs {
    /// Path to the JSON model.
    #[arg(short, long)]
    json: PathBuf,

    /// Tag to search for.
    #[arg(short, long)]
    tag: String,

    /// Only search inside the node with this id (the node itself included).
    #[arg(short, long)]
    parent: Option<String>,
}

impl IdsArgs {
    /// Execute the ids command: print matching ids, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let store = load_model(&self.json)?;
        let ids = tagged_ids(&store, &self.tag, self.parent.as_deref());
        tracing::info!(tag = %self.tag, count = ids.len(), "Tag search completed");

        let mut listing = ids.join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        write_stdout(&listing)?;
        Ok(())
    }
}

fn tagged_ids(store: &GraphStore, tag: &str, parent: Option<&str>) -> Vec<String> {
    match parent {
        Some(parent) => store.ids_by_tag_within_parent(tag, parent),
        None => store.ids_by_tag(tag),
    }
}
