//! Field directive renderers.

use archview_graph::{FieldValue, ResolvedField};

use crate::directive::{FieldKind, evaluate};
use crate::error::ElementError;

/// Deepest Markdown heading.
pub const MAX_HEADING_LEVEL: usize = 6;

/// Markdown anchor for a heading text: lower-cased, spaces as hyphens.
///
/// # Example
///
/// ```
/// assert_eq!(archview_blueprint::anchor("Req A"), "req-a");
/// ```
#[must_use]
pub fn anchor(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

/// Render one resolved field value.
pub(crate) fn render(
    kind: FieldKind,
    field: &ResolvedField,
    modifiers: &[String],
    depth: usize,
) -> Result<String, ElementError> {
    match kind {
        FieldKind::Title => render_title(&field.value, modifiers, depth),
        FieldKind::Text => Ok(render_text(&field.value)),
        FieldKind::List => render_list(&field.value, field.is_ref),
        FieldKind::Image => {
            let src = single(&field.value, "image")?;
            let alt = modifiers.first().map_or("Image", String::as_str);
            Ok(format!("<img src='{src}' alt='{alt}'/>"))
        }
        FieldKind::Link => {
            let href = single(&field.value, "link")?;
            let text = modifiers.first().map_or("Link", String::as_str);
            Ok(format!("<a href=\"{href}\">{text}</a>"))
        }
    }
}

fn render_title(
    value: &FieldValue,
    modifiers: &[String],
    depth: usize,
) -> Result<String, ElementError> {
    let level_expr = modifiers.first().ok_or(ElementError::MissingLevel)?;
    let level = evaluate(level_expr, depth)?;
    if !(1..=MAX_HEADING_LEVEL).contains(&level) {
        return Err(ElementError::HeadingLevel(level));
    }

    let text = match value {
        FieldValue::Text(text) => text.replace('\n', " "),
        FieldValue::List(items) => items.join(" "),
    };
    let hashes = "#".repeat(level);

    if modifiers.iter().any(|m| m == "backtick") {
        Ok(format!("{hashes} `{text}`"))
    } else {
        Ok(format!("{hashes} {text}"))
    }
}

fn render_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => items.join("\n"),
    }
}

fn render_list(value: &FieldValue, is_ref: bool) -> Result<String, ElementError> {
    let FieldValue::List(items) = value else {
        return Err(ElementError::InvalidValue {
            directive: "list",
            expected: "a list",
        });
    };
    let bullets: Vec<String> = items
        .iter()
        .map(|item| {
            if is_ref {
                format!("- [{item}](#{})", anchor(item))
            } else {
                format!("- {item}")
            }
        })
        .collect();
    Ok(bullets.join("\n"))
}

fn single<'v>(value: &'v FieldValue, directive: &'static str) -> Result<&'v str, ElementError> {
    match value {
        FieldValue::Text(text) => Ok(text),
        FieldValue::List(_) => Err(ElementError::InvalidValue {
            directive,
            expected: "a string",
        }),
    }
}
