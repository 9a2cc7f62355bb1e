//! Blueprint error types.

use std::path::PathBuf;

use crate::diagram::DiagramError;

/// A directive line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The directive type is not one of the known field or control types.
    #[error("Unknown directive type '{0}'")]
    UnknownType(String),
    /// A required argument is absent or empty.
    #[error("Directive '{directive}' requires {argument}")]
    MissingArgument {
        /// Directive type as written.
        directive: String,
        /// Human-readable argument description.
        argument: &'static str,
    },
    /// A `@foreach` target is not of the form `tag.blueprint`.
    #[error("Invalid @foreach target '{0}', expected <tag>.<blueprint>")]
    MalformedTarget(String),
}

/// A heading-level or depth expression that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The expression is not an integer or a single binary operation.
    #[error("Invalid expression '{0}'")]
    Invalid(String),
    /// Right operand of `/` is zero.
    #[error("Division by zero in '{0}'")]
    DivisionByZero(String),
    /// The result does not fit or is negative.
    #[error("Expression '{0}' is out of range")]
    OutOfRange(String),
}

/// Failure while rendering a single directive.
///
/// Always recoverable: the interpreter replaces the directive output with
/// an inline `{Error: ...}` marker.
#[derive(Debug, thiserror::Error)]
pub enum ElementError {
    /// The field holds a value the directive cannot render.
    #[error("Invalid element type for {directive}: expected {expected}")]
    InvalidValue {
        /// Directive type.
        directive: &'static str,
        /// Expected value shape.
        expected: &'static str,
    },
    /// `title` without a heading-level argument.
    #[error("Missing heading level")]
    MissingLevel,
    /// Heading level or view depth outside `1..=MAX_HEADING_LEVEL`.
    #[error("Heading level must be between 1 and 6, got {0}")]
    HeadingLevel(usize),
    /// Level or depth expression failed.
    #[error(transparent)]
    Expr(#[from] ExprError),
    /// Diagram rendering failed.
    #[error(transparent)]
    Diagram(#[from] DiagramError),
    /// The context node lacks a field the directive needs.
    #[error("Node has no '{0}' field")]
    MissingNodeField(&'static str),
    /// A directive appears where it is not allowed.
    #[error("{0}")]
    Validation(String),
    /// A sub-view could not be generated.
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),
}

/// Failure to run a blueprint file.
///
/// Fatal for the root blueprint; recoverable for `@foreach` sub-views.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    /// The blueprint file could not be read.
    #[error("Failed to read blueprint {}: {source}", path.display())]
    Read {
        /// Blueprint path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Sub-view nesting exceeded the configured limit.
    #[error("Sub-view nesting exceeds maximum of {max_depth} at {}", path.display())]
    DepthExceeded {
        /// Blueprint that would have been entered.
        path: PathBuf,
        /// Configured limit.
        max_depth: usize,
    },
    /// The same node and blueprint are already being generated.
    #[error("Recursive sub-view: {} for node '{id}' is already being generated", path.display())]
    Cycle {
        /// Blueprint path.
        path: PathBuf,
        /// Node id.
        id: String,
    },
}
