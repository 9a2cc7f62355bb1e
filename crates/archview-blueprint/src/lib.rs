//! Blueprint interpreter for archview.
//!
//! A blueprint is a Markdown template made of literal lines and `{{...}}`
//! directive lines. Running it against a node of the model produces one
//! Markdown document; `@foreach` directives pull in sibling blueprints for
//! the node's tagged descendants.
//!
//! # Architecture
//!
//! - [`directive`]: line syntax (`parse_line`) and depth expressions (`evaluate`)
//! - [`Interpreter`]: line loop, sub-view recursion and `@loop` blocks
//! - [`DiagramRenderer`]: pluggable `@plantuml` backend, see `archview-plantuml`
//!
//! Per-directive failures never abort generation. They are logged with
//! `tracing` and replaced by an inline `{Error: ...}` marker.
//!
//! # Example
//!
//! ```
//! use archview_blueprint::{DiagramError, DiagramRenderer, Interpreter, Palette};
//! use archview_graph::GraphStore;
//! use serde_json::{Value, json};
//!
//! struct NoDiagrams;
//!
//! impl DiagramRenderer for NoDiagrams {
//!     fn render(&self, _: &Value, _: &GraphStore, _: &Palette) -> Result<String, DiagramError> {
//!         Ok(String::new())
//!     }
//! }
//!
//! let store = GraphStore::from_value(json!({
//!     "id": "1",
//!     "label": "Req A",
//!     "description": "The motor shall stop."
//! }));
//! let interpreter = Interpreter::new(&store, &NoDiagrams);
//!
//! let out = interpreter.run(store.root(), "{{title:label:i}}\n{{text:description}}", 2);
//! assert_eq!(out, "## Req A\n\nThe motor shall stop.\n\n");
//! ```

mod diagram;
pub mod directive;
mod error;
mod field;
mod interpreter;

pub use diagram::{DEFAULT_PALETTE, DiagramError, DiagramRenderer, Palette};
pub use error::{BlueprintError, ElementError, ExprError, ParseError};
pub use field::{MAX_HEADING_LEVEL, anchor};
pub use interpreter::{DEFAULT_MAX_DEPTH, Interpreter, InterpreterConfig, ReadFileFn};
