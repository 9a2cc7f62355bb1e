//! In-memory JSON model with id, path and tag queries.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::LoadError;
use crate::path::{JsonPath, Segment};

/// Read-only JSON model loaded for one generation run.
///
/// The tree is never mutated after construction. Object member order
/// follows the source document, which makes every pre-order query
/// deterministic.
///
/// # Example
///
/// ```
/// use archview_graph::GraphStore;
///
/// let store = GraphStore::from_json(
///     r#"{"id": "root", "items": [{"id": "a", "tags": ["requirement"]}]}"#,
/// )
/// .unwrap();
///
/// let (node, path) = store.search_by_id("a").unwrap();
/// assert_eq!(path.to_string(), "/items/0");
/// assert_eq!(store.search_by_path(&path), Some(node));
/// assert_eq!(store.ids_by_tag("requirement"), vec!["a".to_owned()]);
/// ```
#[derive(Debug)]
pub struct GraphStore {
    root: Value,
    source: Option<PathBuf>,
}

impl GraphStore {
    /// Load and parse a JSON model file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Read`] if the file cannot be read and
    /// [`LoadError::Parse`] if it is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Loaded model");
        Ok(Self {
            root,
            source: Some(path.to_path_buf()),
        })
    }

    /// Parse a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] if the text is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let root = serde_json::from_str(text).map_err(|source| LoadError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        Ok(Self::from_value(root))
    }

    /// Wrap an already parsed document.
    #[must_use]
    pub fn from_value(root: Value) -> Self {
        Self { root, source: None }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// File the model was loaded from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Find the first node whose `id` equals `id`, in document pre-order.
    ///
    /// An object's own `id` is checked before its members are searched.
    /// Returns `None` if no node carries the id.
    #[must_use]
    pub fn search_by_id(&self, id: &str) -> Option<(&Value, JsonPath)> {
        find_by_id(&self.root, id, &JsonPath::root())
    }

    /// Node at an exact path.
    ///
    /// Returns `None` if any segment no longer resolves.
    #[must_use]
    pub fn search_by_path(&self, path: &JsonPath) -> Option<&Value> {
        let mut current = &self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            let next = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key),
                (Segment::Index(index), Value::Array(items)) => items.get(*index),
                _ => None,
            };
            let Some(next) = next else {
                tracing::debug!(
                    path = %path,
                    segment = %segment,
                    depth,
                    "Path segment does not resolve"
                );
                return None;
            };
            current = next;
        }
        Some(current)
    }

    /// Ids of all nodes whose `tags` contain `tag`, in pre-order.
    #[must_use]
    pub fn ids_by_tag(&self, tag: &str) -> Vec<String> {
        let mut ids = Vec::new();
        collect_tagged(&self.root, tag, &mut ids);
        ids
    }

    /// Ids of tagged nodes inside the subtree of the node with `parent_id`.
    ///
    /// The parent itself is included when it carries the tag. Returns an
    /// empty list if the parent does not exist.
    #[must_use]
    pub fn ids_by_tag_within_parent(&self, tag: &str, parent_id: &str) -> Vec<String> {
        let Some((parent, _)) = self.search_by_id(parent_id) else {
            tracing::debug!(parent_id, tag, "Parent not found for tag search");
            return Vec::new();
        };
        let mut ids = Vec::new();
        collect_tagged(parent, tag, &mut ids);
        ids
    }
}

/// The `id` of a node, when it is a string.
#[must_use]
pub fn node_id(node: &Value) -> Option<&str> {
    node.get("id").and_then(Value::as_str)
}

/// The `label` of a node, when it is a string.
#[must_use]
pub fn node_label(node: &Value) -> Option<&str> {
    node.get("label").and_then(Value::as_str)
}

/// True if the node has a `tags` array containing `tag`.
#[must_use]
pub fn has_tag(node: &Value, tag: &str) -> bool {
    node.get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
}

fn find_by_id<'a>(value: &'a Value, id: &str, path: &JsonPath) -> Option<(&'a Value, JsonPath)> {
    match value {
        Value::Object(map) => {
            if node_id(value) == Some(id) {
                return Some((value, path.clone()));
            }
            map.iter()
                .find_map(|(key, child)| find_by_id(child, id, &path.child_key(key)))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, child)| find_by_id(child, id, &path.child_index(index))),
        _ => None,
    }
}

fn collect_tagged(value: &Value, tag: &str, ids: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if has_tag(value, tag) {
                match node_id(value) {
                    Some(id) => ids.push(id.to_owned()),
                    None => tracing::debug!(tag, "Tagged node has no string id"),
                }
            }
            for child in map.values() {
                collect_tagged(child, tag, ids);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_tagged(child, tag, ids);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample_store() -> GraphStore {
        GraphStore::from_value(json!({
            "id": "project",
            "tags": ["project"],
            "label": "Project",
            "packages": [
                {
                    "id": "pkg-a",
                    "tags": ["package"],
                    "label": "Package A",
                    "requirements": [
                        {"id": "req-1", "tags": ["requirement"], "label": "Req 1"},
                        {"id": "req-2", "tags": ["requirement"], "label": "Req 2"}
                    ]
                },
                {
                    "id": "pkg-b",
                    "tags": ["package"],
                    "label": "Package B",
                    "requirements": [
                        {"id": "req-3", "tags": ["requirement", "safety"], "label": "Req 3"}
                    ]
                }
            ],
            "orphan": {"tags": ["requirement"]}
        }))
    }

    #[test]
    fn test_search_by_id_returns_node_and_path() {
        let store = sample_store();
        let (node, path) = store.search_by_id("req-2").unwrap();
        assert_eq!(node_label(node), Some("Req 2"));
        assert_eq!(path.to_string(), "/packages/0/requirements/1");
    }

    #[test]
    fn test_search_by_id_root() {
        let store = sample_store();
        let (node, path) = store.search_by_id("project").unwrap();
        assert!(path.is_root());
        assert_eq!(node_label(node), Some("Project"));
    }

    #[test]
    fn test_search_by_id_missing() {
        let store = sample_store();
        assert!(store.search_by_id("nope").is_none());
    }

    #[test]
    fn test_search_by_id_round_trips_through_path() {
        let store = sample_store();
        for id in ["project", "pkg-a", "pkg-b", "req-1", "req-2", "req-3"] {
            let (node, path) = store.search_by_id(id).unwrap();
            assert_eq!(store.search_by_path(&path), Some(node), "id {id}");
        }
    }

    #[test]
    fn test_search_by_path_stale_segment() {
        let store = sample_store();
        let path = JsonPath::root().child_key("packages").child_index(7);
        assert!(store.search_by_path(&path).is_none());

        let wrong_kind = JsonPath::root().child_index(0);
        assert!(store.search_by_path(&wrong_kind).is_none());
    }

    #[test]
    fn test_search_by_path_root() {
        let store = sample_store();
        assert_eq!(store.search_by_path(&JsonPath::root()), Some(store.root()));
    }

    #[test]
    fn test_ids_by_tag_pre_order() {
        let store = sample_store();
        assert_eq!(
            store.ids_by_tag("requirement"),
            vec!["req-1".to_owned(), "req-2".to_owned(), "req-3".to_owned()]
        );
        assert_eq!(
            store.ids_by_tag("package"),
            vec!["pkg-a".to_owned(), "pkg-b".to_owned()]
        );
    }

    #[test]
    fn test_ids_by_tag_is_stable() {
        let store = sample_store();
        assert_eq!(store.ids_by_tag("requirement"), store.ids_by_tag("requirement"));
    }

    #[test]
    fn test_ids_by_tag_unknown_tag() {
        let store = sample_store();
        assert!(store.ids_by_tag("hsm").is_empty());
    }

    #[test]
    fn test_ids_by_tag_within_parent() {
        let store = sample_store();
        assert_eq!(
            store.ids_by_tag_within_parent("requirement", "pkg-b"),
            vec!["req-3".to_owned()]
        );
        assert_eq!(
            store.ids_by_tag_within_parent("requirement", "pkg-a"),
            vec!["req-1".to_owned(), "req-2".to_owned()]
        );
    }

    #[test]
    fn test_ids_by_tag_within_parent_includes_parent() {
        let store = sample_store();
        assert_eq!(
            store.ids_by_tag_within_parent("package", "pkg-a"),
            vec!["pkg-a".to_owned()]
        );
    }

    #[test]
    fn test_ids_by_tag_within_missing_parent() {
        let store = sample_store();
        assert!(store.ids_by_tag_within_parent("requirement", "missing").is_empty());
    }

    #[test]
    fn test_document_order_is_preserved() {
        let store =
            GraphStore::from_json(r#"{"z": {"id": "z", "tags": ["t"]}, "a": {"id": "a", "tags": ["t"]}}"#)
                .unwrap();
        assert_eq!(store.ids_by_tag("t"), vec!["z".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn test_has_tag_ignores_non_array_tags() {
        assert!(!has_tag(&json!({"tags": "requirement"}), "requirement"));
        assert!(has_tag(&json!({"tags": ["requirement"]}), "requirement"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": "x", "label": "X"}}"#).unwrap();

        let store = GraphStore::load(file.path()).unwrap();
        assert_eq!(store.source(), Some(file.path()));
        assert!(store.search_by_id("x").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GraphStore::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains("model.json"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = GraphStore::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
