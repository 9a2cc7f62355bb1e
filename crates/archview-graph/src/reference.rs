//! Reference tokens: graph edges stored as strings.
//!
//! A reference is a string that embeds the id of another node, usually in
//! the decorated form `${id:<uuid>}`. This module extracts those ids,
//! resolves them against a [`GraphStore`], and answers the structural
//! queries that need upward navigation (nearest tagged ancestor, and the
//! back-reference scan behind traceability views).

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::path::JsonPath;
use crate::store::{GraphStore, has_tag, node_id, node_label};

static GUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
    )
    .unwrap()
});

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{id:[^}]*\}").unwrap());

/// First UUID-shaped substring of `text`.
///
/// # Example
///
/// ```
/// use archview_graph::extract_guid;
///
/// assert_eq!(
///     extract_guid("${id:10d2712c-f021-4e9d-9300-cb3e95d2db37}"),
///     Some("10d2712c-f021-4e9d-9300-cb3e95d2db37")
/// );
/// assert_eq!(extract_guid("plain text"), None);
/// ```
#[must_use]
pub fn extract_guid(text: &str) -> Option<&str> {
    GUID_PATTERN.find(text).map(|m| m.as_str())
}

/// Canonical token form that points at `id`.
#[must_use]
pub fn reference_token(id: &str) -> String {
    format!("${{id:{id}}}")
}

/// Text value of a field: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A string field.
    Text(String),
    /// A list of strings.
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a JSON value, accepting strings and arrays of strings only.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            _ => None,
        }
    }
}

/// A field value after reference resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    /// Labels when `is_ref` is set, otherwise the raw text.
    pub value: FieldValue,
    /// True when every element was a reference to a labelled node.
    pub is_ref: bool,
}

/// Resolves reference tokens and ancestor relations over a [`GraphStore`].
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    store: &'a GraphStore,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a resolver over `store`.
    #[must_use]
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &'a GraphStore {
        self.store
    }

    /// Node referenced by `token`, with its path.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<(&'a Value, JsonPath)> {
        self.store.search_by_id(extract_guid(token)?)
    }

    /// Label of the node referenced by `token`.
    #[must_use]
    pub fn resolve_label(&self, token: &str) -> Option<&'a str> {
        self.resolve(token).and_then(|(node, _)| node_label(node))
    }

    /// Replace every `${id:...}` token embedded in `text` with its label.
    ///
    /// Text without tokens is returned borrowed.
    ///
    /// # Errors
    ///
    /// Returns the first token that does not resolve to a labelled node.
    pub fn replace_tokens<'t>(&self, text: &'t str) -> Result<Cow<'t, str>, &'t str> {
        if !TOKEN_PATTERN.is_match(text) {
            return Ok(Cow::Borrowed(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for token in TOKEN_PATTERN.find_iter(text) {
            let label = self.resolve_label(token.as_str()).ok_or(token.as_str())?;
            out.push_str(&text[last..token.start()]);
            out.push_str(label);
            last = token.end();
        }
        out.push_str(&text[last..]);
        Ok(Cow::Owned(out))
    }

    /// Replace reference tokens with labels.
    ///
    /// The value is treated as a set of references only if every element
    /// resolves to a labelled node; otherwise it is returned unchanged with
    /// `is_ref` cleared. An empty list is never a reference set.
    #[must_use]
    pub fn resolve_field(&self, value: FieldValue) -> ResolvedField {
        match value {
            FieldValue::Text(text) => match self.resolve_label(&text) {
                Some(label) => ResolvedField {
                    value: FieldValue::Text(label.to_owned()),
                    is_ref: true,
                },
                None => ResolvedField {
                    value: FieldValue::Text(text),
                    is_ref: false,
                },
            },
            FieldValue::List(items) => {
                let labels = if items.is_empty() {
                    None
                } else {
                    items
                        .iter()
                        .map(|item| self.resolve_label(item).map(str::to_owned))
                        .collect::<Option<Vec<_>>>()
                };
                match labels {
                    Some(labels) => ResolvedField {
                        value: FieldValue::List(labels),
                        is_ref: true,
                    },
                    None => ResolvedField {
                        value: FieldValue::List(items),
                        is_ref: false,
                    },
                }
            }
        }
    }

    /// Nearest strict ancestor of the node `id` that has an id and `tag`.
    ///
    /// The document root is never returned.
    #[must_use]
    pub fn ancestor_with_tag(&self, id: &str, tag: &str) -> Option<(&'a Value, JsonPath)> {
        let (_, path) = self.store.search_by_id(id)?;
        self.ancestor_of_path(&path.parent()?, tag)
    }

    /// Node at `path` or its nearest ancestor that has an id and `tag`.
    ///
    /// Each step up is a new, shorter path; `path` itself is not modified.
    /// The document root is never returned.
    #[must_use]
    pub fn ancestor_of_path(&self, path: &JsonPath, tag: &str) -> Option<(&'a Value, JsonPath)> {
        for candidate in path.lineage() {
            let node = self.store.search_by_path(&candidate)?;
            if node_id(node).is_some() && has_tag(node, tag) {
                return Some((node, candidate));
            }
        }
        None
    }

    /// Every `tag`-carrying node that holds a reference to `target_id`.
    ///
    /// Scans the whole document for scalars equal to the token form of
    /// `target_id`. For each hit, the nearest `tag` ancestor of the
    /// containing object or array is collected. Results are unique by node
    /// and ordered by first discovery.
    #[must_use]
    pub fn all_references_to(&self, target_id: &str, tag: &str) -> Vec<(&'a Value, JsonPath)> {
        let mut scan = BackReferenceScan {
            resolver: *self,
            token: reference_token(target_id),
            tag,
            seen: HashSet::new(),
            found: Vec::new(),
        };
        scan.visit(self.store.root(), &JsonPath::root());
        tracing::debug!(
            target_id,
            tag,
            count = scan.found.len(),
            "Back-reference scan completed"
        );
        scan.found
    }
}

struct BackReferenceScan<'a, 't> {
    resolver: ReferenceResolver<'a>,
    token: String,
    tag: &'t str,
    seen: HashSet<JsonPath>,
    found: Vec<(&'a Value, JsonPath)>,
}

impl<'a> BackReferenceScan<'a, '_> {
    fn visit(&mut self, value: &'a Value, path: &JsonPath) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if self.is_token(child) {
                        self.record(path);
                    } else {
                        self.visit(child, &path.child_key(key));
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    if self.is_token(child) {
                        self.record(path);
                    } else {
                        self.visit(child, &path.child_index(index));
                    }
                }
            }
            _ => {}
        }
    }

    fn is_token(&self, value: &Value) -> bool {
        value.as_str() == Some(self.token.as_str())
    }

    fn record(&mut self, container: &JsonPath) {
        let Some((node, path)) = self.resolver.ancestor_of_path(container, self.tag) else {
            tracing::debug!(path = %container, tag = self.tag, "Reference without tagged ancestor");
            return;
        };
        if self.seen.insert(path.clone()) {
            self.found.push((node, path));
        }
    }
}

/// Drop entries whose `(label, description)` pair was already seen.
#[must_use]
pub fn dedup_by_label_description<'a>(
    nodes: Vec<(&'a Value, JsonPath)>,
) -> Vec<(&'a Value, JsonPath)> {
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|(node, _)| {
            let node: &'a Value = *node;
            let description = node.get("description").and_then(Value::as_str);
            seen.insert((node_label(node), description))
        })
        .collect()
}
