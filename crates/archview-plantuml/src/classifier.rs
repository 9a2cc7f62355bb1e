//! Stereotyped classifier boxes for requirements and interfaces.

use archview_blueprint::DiagramError;

use crate::node::Node;

/// A bare `class LABEL <<stereotype>>` with methods, circle and attributes hidden.
pub(crate) fn classifier(node: Node<'_>, stereotype: &str) -> Result<String, DiagramError> {
    let label = node.label()?;
    Ok(format!(
        "class {label} <<{stereotype}>>\n\
         hide <<{stereotype}>> methods\n\
         hide <<{stereotype}>> circle\n\
         hide <<{stereotype}>> attributes\n"
    ))
}
