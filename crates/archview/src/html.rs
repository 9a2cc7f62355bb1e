//! Markdown to HTML conversion for `--format html`.

use pulldown_cmark::{Options, Parser, html};

/// Render a generated Markdown document as an HTML fragment.
///
/// Embedded `<!-- @startuml ... -->` diagram sources and inline tags pass
/// through unchanged as raw HTML.
pub(crate) fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
