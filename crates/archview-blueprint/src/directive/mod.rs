//! Blueprint directive syntax.
//!
//! Every directive line is parsed once into the closed [`Directive`] enum;
//! the interpreter dispatches on the variant and never compares type
//! strings itself.
//!
//! # Example
//!
//! ```
//! use archview_blueprint::directive::{Directive, FieldKind, parse_line};
//!
//! let Some(Ok(Directive::Field(field))) = parse_line("{{ title : label : 1 }}") else {
//!     panic!("expected a field directive");
//! };
//! assert_eq!(field.kind, FieldKind::Title);
//! assert_eq!(field.modifiers, vec!["1".to_owned()]);
//!
//! assert!(parse_line("plain text").is_none());
//! ```

mod expr;
mod parser;

pub use expr::evaluate;
pub use parser::{Directive, FieldDirective, FieldKind, FieldSource, ForeachTarget, parse_line};
