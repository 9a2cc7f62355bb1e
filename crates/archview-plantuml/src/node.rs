//! Typed field access for converter input.

use std::borrow::Cow;

use archview_blueprint::DiagramError;
use archview_graph::{GraphStore, ReferenceResolver, node_id, node_label};
use serde_json::Value;

/// A JSON object read by a converter.
///
/// Missing or mistyped required fields become [`DiagramError::MissingField`]
/// naming the node, so a broken model points at the offending element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node<'n> {
    value: &'n Value,
}

impl<'n> Node<'n> {
    pub(crate) fn new(value: &'n Value) -> Self {
        Self { value }
    }

    fn name(&self) -> String {
        node_label(self.value)
            .or_else(|| node_id(self.value))
            .unwrap_or("?")
            .to_owned()
    }

    pub(crate) fn missing(&self, field: &str) -> DiagramError {
        DiagramError::MissingField {
            field: field.to_owned(),
            node: self.name(),
        }
    }

    /// Required string field.
    pub(crate) fn str(&self, field: &str) -> Result<&'n str, DiagramError> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing(field))
    }

    pub(crate) fn label(&self) -> Result<&'n str, DiagramError> {
        self.str("label")
    }

    /// Optional string field; empty strings count as absent.
    pub(crate) fn opt_str(&self, field: &str) -> Option<&'n str> {
        self.value
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Required object field.
    pub(crate) fn child(&self, field: &str) -> Result<Node<'n>, DiagramError> {
        self.value
            .get(field)
            .filter(|v| v.is_object())
            .map(Node::new)
            .ok_or_else(|| self.missing(field))
    }

    /// Optional object field.
    pub(crate) fn opt_child(&self, field: &str) -> Option<Node<'n>> {
        self.value.get(field).filter(|v| v.is_object()).map(Node::new)
    }

    /// Elements of an array field. Absent or `null` is an empty list.
    pub(crate) fn children(&self, field: &str) -> Result<Vec<Node<'n>>, DiagramError> {
        match self.value.get(field) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.iter().map(Node::new).collect()),
            Some(_) => Err(self.missing(field)),
        }
    }

    /// First of `candidates` present on the node, or the first candidate.
    pub(crate) fn field_name<'f>(&self, candidates: &[&'f str]) -> &'f str {
        candidates
            .iter()
            .copied()
            .find(|field| self.value.get(*field).is_some())
            .unwrap_or(candidates[0])
    }

    /// Loose truthiness: `true`, non-empty strings and non-zero numbers.
    pub(crate) fn flag(&self, field: &str) -> bool {
        match self.value.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Null) | None => false,
        }
    }

    /// Scalar field as display text (strings unquoted).
    pub(crate) fn scalar(&self, field: &str) -> Option<String> {
        match self.value.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Resolves reference fields to labels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Refs<'s> {
    resolver: ReferenceResolver<'s>,
}

impl<'s> Refs<'s> {
    pub(crate) fn new(store: &'s GraphStore) -> Self {
        Self {
            resolver: ReferenceResolver::new(store),
        }
    }

    /// Label of the node referenced by `node[field]`.
    pub(crate) fn label(&self, node: Node<'_>, field: &str) -> Result<&'s str, DiagramError> {
        let token = node.str(field)?;
        self.resolver
            .resolve_label(token)
            .ok_or_else(|| DiagramError::UnresolvedReference {
                field: field.to_owned(),
                token: token.to_owned(),
            })
    }

    /// Required string field with embedded reference tokens replaced by labels.
    pub(crate) fn text<'n>(
        &self,
        node: Node<'n>,
        field: &str,
    ) -> Result<Cow<'n, str>, DiagramError> {
        self.embedded(node.str(field)?, field)
    }

    /// Optional string field with embedded reference tokens replaced by labels.
    pub(crate) fn opt_text<'n>(
        &self,
        node: Node<'n>,
        field: &str,
    ) -> Result<Option<Cow<'n, str>>, DiagramError> {
        node.opt_str(field)
            .map(|text| self.embedded(text, field))
            .transpose()
    }

    fn embedded<'n>(&self, text: &'n str, field: &str) -> Result<Cow<'n, str>, DiagramError> {
        self.resolver
            .replace_tokens(text)
            .map_err(|token| DiagramError::UnresolvedReference {
                field: field.to_owned(),
                token: token.to_owned(),
            })
    }
}
