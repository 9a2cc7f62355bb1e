//! Tag-based converter dispatch.

use archview_blueprint::{DiagramError, DiagramRenderer, Palette};
use archview_graph::{GraphStore, has_tag, node_id};
use serde_json::Value;

use crate::classifier::classifier;
use crate::hsm::state_machine;
use crate::library::library;
use crate::node::{Node, Refs};
use crate::structure::{component, layer};

/// Diagram kinds, selected by the first matching node tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    /// `requirement` or `reqs`.
    Requirement,
    /// `interface`.
    Interface,
    /// `layer`.
    Layer,
    /// `component`.
    Component,
    /// `lib`.
    Library,
    /// `hsm`.
    StateMachine,
}

impl DiagramKind {
    const BY_TAG: [(&'static str, Self); 7] = [
        ("requirement", Self::Requirement),
        ("reqs", Self::Requirement),
        ("interface", Self::Interface),
        ("layer", Self::Layer),
        ("component", Self::Component),
        ("lib", Self::Library),
        ("hsm", Self::StateMachine),
    ];

    /// Kind for `node`, or `None` if no tag has a converter.
    #[must_use]
    pub fn detect(node: &Value) -> Option<Self> {
        Self::BY_TAG
            .iter()
            .find(|(tag, _)| has_tag(node, tag))
            .map(|(_, kind)| *kind)
    }
}

/// [`DiagramRenderer`] producing `PlantUML` for architecture model nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantUmlRenderer;

impl PlantUmlRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DiagramRenderer for PlantUmlRenderer {
    fn render(
        &self,
        node: &Value,
        store: &GraphStore,
        palette: &Palette,
    ) -> Result<String, DiagramError> {
        let reader = Node::new(node);
        let Some(kind) = DiagramKind::detect(node) else {
            return Err(DiagramError::Unsupported {
                id: node_id(node).unwrap_or("?").to_owned(),
                tags: tag_list(node),
            });
        };
        let id = node_id(node).ok_or_else(|| reader.missing("id"))?;
        tracing::debug!(id, ?kind, "Rendering PlantUML diagram");

        let refs = Refs::new(store);
        let body = match kind {
            DiagramKind::Requirement => classifier(reader, "requirement")?,
            DiagramKind::Interface => classifier(reader, "interface")?,
            DiagramKind::Layer => layer(reader, refs)?,
            DiagramKind::Component => component(reader, refs)?,
            DiagramKind::Library => library(reader, refs)?,
            DiagramKind::StateMachine => state_machine(reader, refs, palette)?,
        };
        Ok(format!("@startuml {id}\n{body}@enduml\n"))
    }
}

fn tag_list(node: &Value) -> String {
    node.get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn render(node: Value) -> Result<String, DiagramError> {
        let store = GraphStore::from_value(node);
        PlantUmlRenderer::new().render(store.root(), &store, &Palette::default())
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            DiagramKind::detect(&json!({"tags": ["reqs"]})),
            Some(DiagramKind::Requirement)
        );
        assert_eq!(
            DiagramKind::detect(&json!({"tags": ["x", "hsm"]})),
            Some(DiagramKind::StateMachine)
        );
        assert_eq!(DiagramKind::detect(&json!({"tags": ["package"]})), None);
        assert_eq!(DiagramKind::detect(&json!({"label": "untagged"})), None);
    }

    #[test]
    fn test_requirement_document() {
        let out = render(json!({"id": "r1", "tags": ["requirement"], "label": "REQ_1"})).unwrap();
        assert_eq!(
            out,
            "@startuml r1\n\
             class REQ_1 <<requirement>>\n\
             hide <<requirement>> methods\n\
             hide <<requirement>> circle\n\
             hide <<requirement>> attributes\n\
             @enduml\n"
        );
    }

    #[test]
    fn test_interface_document() {
        let out = render(json!({"id": "i1", "tags": ["interface"], "label": "CAN"})).unwrap();
        assert!(out.starts_with("@startuml i1\nclass CAN <<interface>>\n"));
        assert!(out.ends_with("@enduml\n"));
    }

    #[test]
    fn test_unsupported() {
        let err = render(json!({"id": "p", "tags": ["package", "core"]})).unwrap_err();
        assert_eq!(
            err,
            DiagramError::Unsupported {
                id: "p".to_owned(),
                tags: "package, core".to_owned(),
            }
        );
    }

    #[test]
    fn test_missing_id() {
        let err = render(json!({"tags": ["lib"], "label": "L"})).unwrap_err();
        assert_eq!(
            err,
            DiagramError::MissingField {
                field: "id".to_owned(),
                node: "L".to_owned(),
            }
        );
    }

    #[test]
    fn test_deterministic() {
        let node = json!({
            "id": "h", "tags": ["hsm"], "label": "M",
            "States": [{"label": "A", "isInit": true}]
        });
        assert_eq!(render(node.clone()).unwrap(), render(node).unwrap());
    }
}
