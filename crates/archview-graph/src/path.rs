//! Immutable paths into a JSON document.
//!
//! Nodes carry no parent pointer, so a [`JsonPath`] is the only way to walk
//! upward. Paths are never modified in place: [`JsonPath::parent`] and
//! [`JsonPath::child_key`] return new values and leave the receiver untouched.

use std::fmt;
use std::sync::Arc;

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object member name.
    Key(String),
    /// Array position.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(&key.replace('~', "~0").replace('/', "~1")),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Ordered sequence of segments from the document root to a node.
///
/// Cloning is cheap: segments are shared behind an [`Arc`].
///
/// # Example
///
/// ```
/// use archview_graph::JsonPath;
///
/// let path = JsonPath::root().child_key("layers").child_index(2);
/// assert_eq!(path.to_string(), "/layers/2");
///
/// let parent = path.parent().unwrap();
/// assert_eq!(parent.to_string(), "/layers");
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Arc<[Segment]>,
}

impl JsonPath {
    /// Path of the document root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from segments.
    #[must_use]
    pub fn from_segments(segments: impl Into<Vec<Segment>>) -> Self {
        Self {
            segments: segments.into().into(),
        }
    }

    /// Segments from the root downward.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the document root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True for the document root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Extend the path with an object member name.
    #[must_use]
    pub fn child_key(&self, key: &str) -> Self {
        self.child(Segment::Key(key.to_owned()))
    }

    /// Extend the path with an array position.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self::from_segments(segments)
    }

    /// Path one level up, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self::from_segments(rest.to_vec()))
    }

    /// This path followed by each shorter prefix, stopping before the root.
    pub fn lineage(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self.clone()), Self::parent).take_while(|p| !p.is_root())
    }

    /// True if `self` is a strict prefix of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.len() < other.len() && other.segments.starts_with(&self.segments)
    }
}

/// Formats as a JSON Pointer (RFC 6901); the root is the empty string.
impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments.iter() {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
