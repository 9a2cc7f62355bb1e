//! `PlantUML` converters for archview model nodes.
//!
//! [`PlantUmlRenderer`] implements the blueprint crate's
//! [`DiagramRenderer`](archview_blueprint::DiagramRenderer) contract. The
//! node's tags select a converter:
//!
//! - `requirement` / `reqs`, `interface`: stereotyped classifier box
//! - `layer`: package of components with their interface edges
//! - `component`: component with ports and wired sub-components
//! - `lib`: class with variables and function signatures
//! - `hsm`: nested states, guards and transitions, colored by depth
//!
//! Every reference token in the node is resolved to the referenced node's
//! label. A token that does not resolve fails the whole diagram.
//!
//! # Example
//!
//! ```
//! use archview_blueprint::{DiagramRenderer, Palette};
//! use archview_graph::GraphStore;
//! use archview_plantuml::PlantUmlRenderer;
//! use serde_json::json;
//!
//! let store = GraphStore::from_value(json!({
//!     "id": "r1",
//!     "tags": ["requirement"],
//!     "label": "REQ_1"
//! }));
//! let uml = PlantUmlRenderer::new()
//!     .render(store.root(), &store, &Palette::default())
//!     .unwrap();
//! assert!(uml.starts_with("@startuml r1\nclass REQ_1 <<requirement>>\n"));
//! ```

mod classifier;
mod hsm;
mod library;
mod node;
mod renderer;
mod structure;

pub use renderer::{DiagramKind, PlantUmlRenderer};
