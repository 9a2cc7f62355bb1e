//! Blueprint directive syntax parsing.
//!
//! A directive line contains `{{ type : arg1 : arg2 : ... }}`. The body is the
//! text between the first `{{` and the first `}}` after it. Arguments are
//! colon-separated and trimmed; the first one selects the directive type.

use crate::error::ParseError;

/// Where a field directive takes its text from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// A double-quoted constant, quotes removed.
    Literal(String),
    /// A member of the context node.
    Key(String),
}

/// Field directive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Markdown heading.
    Title,
    /// Plain text.
    Text,
    /// Bullet list.
    List,
    /// HTML image tag.
    Image,
    /// HTML hyperlink.
    Link,
}

impl FieldKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "text" => Some(Self::Text),
            "list" => Some(Self::List),
            "image" => Some(Self::Image),
            "link" => Some(Self::Link),
            _ => None,
        }
    }

    /// Directive name as written in blueprints.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Text => "text",
            Self::List => "list",
            Self::Image => "image",
            Self::Link => "link",
        }
    }
}

/// A field directive: reads one value and renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDirective {
    /// Directive type.
    pub kind: FieldKind,
    /// Value source.
    pub source: FieldSource,
    /// Remaining non-empty arguments (heading level, `backtick`, alt text, ...).
    pub modifiers: Vec<String>,
}

/// One `<tag>.<blueprint>` pair of a `@foreach` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeachTarget {
    /// Tag to search for below the context node.
    pub tag: String,
    /// Sub-blueprint base name, resolved as `<name>.md`.
    pub blueprint: String,
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `title`, `text`, `list`, `image`, `link`.
    Field(FieldDirective),
    /// `@plantuml`: embed the context node's diagram.
    PlantUml,
    /// `@ref:<tag>`: list nodes tagged `tag` that reference the context node.
    Ref {
        /// Tag of the referencing ancestors.
        tag: String,
    },
    /// `@foreach:<tag>.<bp>[,...][:<depth>]`: generate sub-views.
    Foreach {
        /// Targets in order.
        targets: Vec<ForeachTarget>,
        /// Optional new depth expression.
        depth: Option<String>,
    },
    /// `@loop:<key>`: open a legacy loop block.
    Loop {
        /// Array member of the context node.
        key: String,
    },
    /// `@endloop:<key>`: close a legacy loop block.
    EndLoop {
        /// Key of the block being closed.
        key: String,
    },
}

/// Extract the directive body from a line.
///
/// Returns `None` if the line has no `{{` followed by `}}`.
fn directive_body(line: &str) -> Option<&str> {
    let start = line.find("{{")? + 2;
    let len = line[start..].find("}}")?;
    Some(&line[start..start + len])
}

/// Parse a blueprint line.
///
/// Returns `None` for literal text lines.
pub fn parse_line(line: &str) -> Option<Result<Directive, ParseError>> {
    directive_body(line).map(parse_body)
}

fn parse_body(body: &str) -> Result<Directive, ParseError> {
    let args: Vec<&str> = body.split(':').map(str::trim).collect();
    let name = args.first().copied().unwrap_or_default();

    let required = |argument: &'static str| {
        args.get(1)
            .copied()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ParseError::MissingArgument {
                directive: name.to_owned(),
                argument,
            })
    };

    match name {
        "@plantuml" => Ok(Directive::PlantUml),
        "@ref" => Ok(Directive::Ref {
            tag: required("a tag")?.to_owned(),
        }),
        "@loop" => Ok(Directive::Loop {
            key: required("a field key")?.to_owned(),
        }),
        "@endloop" => Ok(Directive::EndLoop {
            key: required("a field key")?.to_owned(),
        }),
        "@foreach" => {
            let targets = required("<tag>.<blueprint> targets")?
                .split(',')
                .map(parse_target)
                .collect::<Result<Vec<_>, _>>()?;
            let depth = args
                .get(2)
                .filter(|d| !d.is_empty())
                .map(|d| (*d).to_owned());
            Ok(Directive::Foreach { targets, depth })
        }
        _ => {
            let kind = FieldKind::parse(name).ok_or_else(|| ParseError::UnknownType(name.to_owned()))?;
            let source = parse_source(required("a field key or quoted text")?);
            let modifiers = args
                .iter()
                .skip(2)
                .filter(|a| !a.is_empty())
                .map(|a| (*a).to_owned())
                .collect();
            Ok(Directive::Field(FieldDirective {
                kind,
                source,
                modifiers,
            }))
        }
    }
}

fn parse_source(arg: &str) -> FieldSource {
    match arg
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(text) => FieldSource::Literal(text.to_owned()),
        None => FieldSource::Key(arg.to_owned()),
    }
}

fn parse_target(pair: &str) -> Result<ForeachTarget, ParseError> {
    let malformed = || ParseError::MalformedTarget(pair.trim().to_owned());
    let (tag, blueprint) = pair.split_once('.').ok_or_else(malformed)?;
    let (tag, blueprint) = (tag.trim(), blueprint.trim());
    if tag.is_empty() || blueprint.is_empty() {
        return Err(malformed());
    }
    Ok(ForeachTarget {
        tag: tag.to_owned(),
        blueprint: blueprint.to_owned(),
    })
}
