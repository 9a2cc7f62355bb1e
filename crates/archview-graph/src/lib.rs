//! Object-graph queries over a JSON model.
//!
//! The model is a JSON tree that is logically a graph: nodes carry an `id`
//! and a `tags` array, and edges are strings that embed another node's id
//! (reference tokens such as `${id:<uuid>}`).
//!
//! - [`GraphStore`]: loads the document and answers id, path and tag queries
//! - [`ReferenceResolver`]: resolves reference tokens, finds tagged
//!   ancestors, and scans for back-references
//! - [`JsonPath`]: immutable path from the root, the only way to navigate
//!   upward

mod error;
mod path;
mod reference;
mod store;

pub use error::LoadError;
pub use path::{JsonPath, Segment};
pub use reference::{
    FieldValue, ReferenceResolver, ResolvedField, dedup_by_label_description, extract_guid,
    reference_token,
};
pub use store::{GraphStore, has_tag, node_id, node_label};
