//! Diagram rendering contract used by `@plantuml`.
//!
//! The interpreter only needs "node in, `PlantUML` text out". Converters live
//! in a separate crate and plug in through [`DiagramRenderer`].

use archview_graph::GraphStore;
use serde_json::Value;

/// Default state colors, indexed by nesting depth.
pub const DEFAULT_PALETTE: [&str; 5] = [
    "lightblue",
    "lightcoral",
    "lightsalmon",
    "lightseagreen",
    "lightyellow",
];

/// Finite color palette for nested diagram elements.
///
/// Passed explicitly to every render call; colors cycle once the depth
/// exceeds the palette size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl Palette {
    /// Build a palette from colors. Returns `None` if `colors` is empty.
    #[must_use]
    pub fn new(colors: Vec<String>) -> Option<Self> {
        (!colors.is_empty()).then_some(Self { colors })
    }

    /// Color for nesting `depth`, cycling through the palette.
    #[must_use]
    pub fn color(&self, depth: usize) -> &str {
        &self.colors[depth % self.colors.len()]
    }

    /// Number of colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false: a palette has at least one color.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Diagram rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    /// No converter handles the node's tags.
    #[error("No diagram converter for node '{id}' (tags: {tags})")]
    Unsupported {
        /// Node id, or `?` when absent.
        id: String,
        /// Comma-separated tags.
        tags: String,
    },
    /// A field required by the converter is missing or has the wrong type.
    #[error("Field '{field}' missing or invalid in '{node}'")]
    MissingField {
        /// Field name.
        field: String,
        /// Label or id of the node being converted.
        node: String,
    },
    /// A reference token does not resolve to a labelled node.
    #[error("Unresolved reference '{token}' in field '{field}'")]
    UnresolvedReference {
        /// Field holding the token.
        field: String,
        /// Raw token.
        token: String,
    },
}

/// Converts a tagged node into `PlantUML` text.
///
/// Implementations must be deterministic and must resolve every reference
/// token to the referenced node's label before emitting it.
pub trait DiagramRenderer {
    /// Render `node` as a complete `@startuml` ... `@enduml` document.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError`] if the node's tags have no converter, a
    /// required field is missing, or a reference cannot be resolved.
    fn render(
        &self,
        node: &Value,
        store: &GraphStore,
        palette: &Palette,
    ) -> Result<String, DiagramError>;
}
