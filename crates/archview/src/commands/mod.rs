//! CLI command implementations.

pub(crate) mod diagram;
pub(crate) mod generate;
pub(crate) mod ids;

use std::path::Path;

use archview_graph::GraphStore;
use serde_json::Value;

pub(crate) use diagram::DiagramArgs;
pub(crate) use generate::GenerateArgs;
pub(crate) use ids::IdsArgs;

use crate::error::CliError;

/// Load the JSON model.
fn load_model(path: &Path) -> Result<GraphStore, CliError> {
    let store = GraphStore::load(path)?;
    tracing::info!(path = %path.display(), "Loaded model");
    Ok(store)
}

/// Node with `id`, or a not-found error.
fn find_node<'s>(store: &'s GraphStore, id: &str) -> Result<&'s Value, CliError> {
    store
        .search_by_id(id)
        .map(|(node, _)| node)
        .ok_or_else(|| CliError::NodeNotFound(id.to_owned()))
}
