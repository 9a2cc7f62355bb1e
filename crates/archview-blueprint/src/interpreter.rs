//! Blueprint interpreter.
//!
//! Runs a blueprint line by line against a context node. Literal lines are
//! copied through, directives are rendered, and `@foreach` recurses into
//! sibling blueprint files. A failing directive never aborts the document:
//! it is logged and replaced with an inline `{Error: ...}` marker.

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use archview_graph::{
    FieldValue, GraphStore, ReferenceResolver, dedup_by_label_description, node_id, node_label,
};
use serde_json::Value;

use crate::diagram::{DiagramRenderer, Palette};
use crate::directive::{
    Directive, FieldDirective, FieldSource, ForeachTarget, evaluate, parse_line,
};
use crate::error::{BlueprintError, ElementError, ParseError};
use crate::field::{self, MAX_HEADING_LEVEL, anchor};

/// Default limit on nested sub-views, including the root view.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Type alias for the blueprint reading callback.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send;

/// Configuration for the blueprint interpreter.
pub struct InterpreterConfig {
    /// Maximum number of nested views (root included).
    ///
    /// Default: 32
    pub max_depth: usize,
    /// Colors handed to the diagram renderer.
    pub palette: Palette,
    /// Callback to read blueprint files.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            palette: Palette::default(),
            read_file: None,
        }
    }

    /// Set the maximum view nesting.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the diagram palette.
    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        match &self.read_file {
            Some(read_file) => read_file(path),
            None => std::fs::read_to_string(path),
        }
    }
}

/// One active `(node, blueprint)` pair on the current generation chain.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    id: Option<String>,
    /// `None` for blueprint text run without a file.
    blueprint: Option<PathBuf>,
}

/// A line that renders in place, without look-ahead or recursion.
enum Step {
    Literal,
    Invalid(ParseError),
    Field(FieldDirective),
    PlantUml,
    Ref { tag: String },
    EndLoop { key: String },
}

/// A parsed blueprint line.
enum Line {
    Step(Step),
    Foreach {
        targets: Vec<ForeachTarget>,
        depth: Option<String>,
    },
    Loop {
        key: String,
    },
}

impl Line {
    fn parse(text: &str) -> Self {
        let directive = match parse_line(text) {
            None => return Self::Step(Step::Literal),
            Some(Err(err)) => return Self::Step(Step::Invalid(err)),
            Some(Ok(directive)) => directive,
        };
        match directive {
            Directive::Field(field) => Self::Step(Step::Field(field)),
            Directive::PlantUml => Self::Step(Step::PlantUml),
            Directive::Ref { tag } => Self::Step(Step::Ref { tag }),
            Directive::EndLoop { key } => Self::Step(Step::EndLoop { key }),
            Directive::Foreach { targets, depth } => Self::Foreach { targets, depth },
            Directive::Loop { key } => Self::Loop { key },
        }
    }
}

/// Location of the blueprint being run and the chain of views above it.
struct View<'v> {
    blueprint: Option<&'v Path>,
    frames: &'v [Frame],
}

impl View<'_> {
    /// Directory sub-blueprints are resolved against.
    fn base_dir(&self) -> &Path {
        self.blueprint
            .and_then(Path::parent)
            .unwrap_or(Path::new("."))
    }
}

/// Interprets blueprints against nodes of a [`GraphStore`].
///
/// # Example
///
/// ```
/// use archview_blueprint::{DiagramError, DiagramRenderer, Interpreter, Palette};
/// use archview_graph::GraphStore;
/// use serde_json::{Value, json};
///
/// struct NoDiagrams;
///
/// impl DiagramRenderer for NoDiagrams {
///     fn render(&self, _: &Value, _: &GraphStore, _: &Palette) -> Result<String, DiagramError> {
///         Ok(String::new())
///     }
/// }
///
/// let store = GraphStore::from_value(json!({"id": "1", "label": "Req A"}));
/// let interpreter = Interpreter::new(&store, &NoDiagrams);
///
/// let out = interpreter.run(store.root(), "{{title:label:1}}", 1);
/// assert_eq!(out, "# Req A\n\n");
/// ```
pub struct Interpreter<'a> {
    store: &'a GraphStore,
    resolver: ReferenceResolver<'a>,
    diagrams: &'a dyn DiagramRenderer,
    config: InterpreterConfig,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with the default configuration.
    #[must_use]
    pub fn new(store: &'a GraphStore, diagrams: &'a dyn DiagramRenderer) -> Self {
        Self {
            store,
            resolver: ReferenceResolver::new(store),
            diagrams,
            config: InterpreterConfig::default(),
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the blueprint file at `path` against `item` at depth 1.
    ///
    /// `@foreach` sub-blueprints are resolved relative to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Read`] if the blueprint cannot be read.
    pub fn run_file(&self, item: &Value, path: &Path) -> Result<String, BlueprintError> {
        let text = self.read_blueprint(path)?;
        let frames = [Frame {
            id: node_id(item).map(str::to_owned),
            blueprint: Some(path.to_path_buf()),
        }];
        let view = View {
            blueprint: Some(path),
            frames: &frames,
        };
        Ok(self.run_view(item, &text, 1, &view))
    }

    /// Run blueprint text against `item` starting at `depth`.
    ///
    /// Sub-blueprints are resolved relative to the current directory. The
    /// text counts as the root view for `max_depth`, but as it has no path
    /// it never matches a sub-view frame in the recursion check.
    #[must_use]
    pub fn run(&self, item: &Value, text: &str, depth: usize) -> String {
        let frames = [Frame {
            id: node_id(item).map(str::to_owned),
            blueprint: None,
        }];
        let view = View {
            blueprint: None,
            frames: &frames,
        };
        self.run_view(item, text, depth, &view)
    }

    fn run_view(&self, item: &Value, text: &str, depth: usize, view: &View<'_>) -> String {
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let mut out = String::new();
        let mut depth = depth;
        let mut idx = 0;

        while idx < lines.len() {
            let line = lines[idx];
            match Line::parse(line) {
                Line::Foreach {
                    targets,
                    depth: depth_expr,
                } => {
                    self.expand_foreach(
                        item,
                        &targets,
                        depth_expr.as_deref(),
                        &mut depth,
                        view,
                        &mut out,
                    );
                }
                Line::Loop { key } => match find_loop_end(&lines, idx, &key) {
                    Some(end) => {
                        self.expand_loop(item, &key, &lines[idx + 1..end], depth, &mut out);
                        idx = end;
                    }
                    None => {
                        tracing::warn!(key, "Missing @endloop, skipping @loop");
                        push_marker(
                            &mut out,
                            &ElementError::Validation(format!("Missing @endloop:{key}")),
                        );
                    }
                },
                Line::Step(step) => self.render_line(item, line, &step, depth, &mut out),
            }
            idx += 1;
        }

        out
    }

    /// Render a line that needs no look-ahead or recursion.
    fn render_line(&self, item: &Value, line: &str, step: &Step, depth: usize, out: &mut String) {
        match step {
            Step::Literal => push_block(out, line),
            Step::Invalid(ParseError::UnknownType(name)) => {
                tracing::warn!(directive = %name, "Unknown directive type, skipping line");
            }
            Step::Invalid(err) => {
                tracing::warn!(line, error = %err, "Invalid directive");
                push_marker(out, err);
            }
            Step::Field(field) => self.render_field(item, field, depth, out),
            Step::PlantUml => self.render_plantuml(item, out),
            Step::Ref { tag } => self.render_refs(item, tag, out),
            Step::EndLoop { key } => {
                tracing::warn!(key, "@endloop without matching @loop, skipping line");
            }
        }
    }

    fn render_field(&self, item: &Value, field: &FieldDirective, depth: usize, out: &mut String) {
        let raw = match &field.source {
            FieldSource::Literal(text) => FieldValue::Text(text.clone()),
            FieldSource::Key(key) => {
                let Some(value) = item.get(key) else {
                    tracing::warn!(field = %key, "Data not found, skipping line");
                    return;
                };
                let Some(value) = FieldValue::from_json(value) else {
                    tracing::warn!(field = %key, "Field is neither text nor a list of text, skipping line");
                    return;
                };
                value
            }
        };

        let resolved = self.resolver.resolve_field(raw);
        match field::render(field.kind, &resolved, &field.modifiers, depth) {
            Ok(text) => push_block(out, &text),
            Err(err) => {
                tracing::warn!(directive = field.kind.name(), error = %err, "Failed to render field");
                push_marker(out, &err);
            }
        }
    }

    fn render_plantuml(&self, item: &Value, out: &mut String) {
        let Some(id) = node_id(item) else {
            push_marker(out, &ElementError::MissingNodeField("id"));
            return;
        };
        match self.diagrams.render(item, self.store, &self.config.palette) {
            Ok(uml) => push_block(out, &format!("<!--\n{uml}\n-->\n![]({id}.svg)\n")),
            Err(err) => {
                tracing::warn!(id, error = %err, "Failed to render diagram");
                push_marker(out, &ElementError::from(err));
            }
        }
    }

    fn render_refs(&self, item: &Value, tag: &str, out: &mut String) {
        let Some(id) = node_id(item) else {
            push_marker(out, &ElementError::MissingNodeField("id"));
            return;
        };
        let refs = dedup_by_label_description(self.resolver.all_references_to(id, tag));

        if refs.is_empty() {
            let label = node_label(item).unwrap_or("No label");
            push_block(out, &format!("`No references found for '{label}'`"));
            return;
        }
        for (node, _) in refs {
            let label = node_label(node).unwrap_or("No label");
            push_block(out, &format!("- **[{label}](#{})**", anchor(label)));
        }
    }

    fn expand_foreach(
        &self,
        item: &Value,
        targets: &[ForeachTarget],
        depth_expr: Option<&str>,
        depth: &mut usize,
        view: &View<'_>,
        out: &mut String,
    ) {
        if let Some(expr) = depth_expr {
            match evaluate(expr, *depth) {
                Ok(new_depth) if new_depth <= MAX_HEADING_LEVEL => *depth = new_depth,
                Ok(new_depth) => {
                    tracing::warn!(expr, new_depth, "@foreach depth out of range");
                    push_marker(out, &ElementError::HeadingLevel(new_depth));
                    return;
                }
                Err(err) => {
                    tracing::warn!(expr, error = %err, "Invalid @foreach depth");
                    push_marker(out, &ElementError::from(err));
                    return;
                }
            }
        }
        let Some(parent_id) = node_id(item) else {
            push_marker(out, &ElementError::MissingNodeField("id"));
            return;
        };

        let base_dir = view.base_dir();
        for target in targets {
            let path = base_dir.join(format!("{}.md", target.blueprint));
            for id in self.store.ids_by_tag_within_parent(&target.tag, parent_id) {
                let Some((node, _)) = self.store.search_by_id(&id) else {
                    continue;
                };
                match self.run_sub_view(node, &id, &path, depth.saturating_add(1), view) {
                    Ok(text) => out.push_str(&text),
                    Err(err) => {
                        tracing::warn!(id, error = %err, "Sub-view skipped");
                        push_marker(out, &ElementError::from(err));
                    }
                }
            }
        }
    }

    fn run_sub_view(
        &self,
        node: &Value,
        id: &str,
        path: &Path,
        depth: usize,
        view: &View<'_>,
    ) -> Result<String, BlueprintError> {
        if view.frames.len() >= self.config.max_depth {
            return Err(BlueprintError::DepthExceeded {
                path: path.to_path_buf(),
                max_depth: self.config.max_depth,
            });
        }
        let frame = Frame {
            id: Some(id.to_owned()),
            blueprint: Some(path.to_path_buf()),
        };
        if view.frames.contains(&frame) {
            return Err(BlueprintError::Cycle {
                path: path.to_path_buf(),
                id: id.to_owned(),
            });
        }

        let text = self.read_blueprint(path)?;
        let mut frames = view.frames.to_vec();
        frames.push(frame);
        tracing::debug!(id, blueprint = %path.display(), depth, "Generating sub-view");

        let sub_view = View {
            blueprint: Some(path),
            frames: &frames,
        };
        Ok(self.run_view(node, &text, depth, &sub_view))
    }

    fn expand_loop(&self, item: &Value, key: &str, block: &[&str], depth: usize, out: &mut String) {
        let mut steps = Vec::with_capacity(block.len());
        for line in block {
            match Line::parse(line) {
                Line::Step(step) => steps.push((*line, step)),
                Line::Foreach { .. } | Line::Loop { .. } => {
                    let err = ElementError::Validation(format!(
                        "@loop:{key} block cannot contain '{}'",
                        line.trim()
                    ));
                    tracing::warn!(key, error = %err, "Invalid @loop block");
                    push_marker(out, &err);
                    return;
                }
            }
        }

        let Some(elements) = item.get(key).and_then(Value::as_array) else {
            tracing::warn!(key, "Loop field missing or not a list, skipping block");
            return;
        };
        for element in elements {
            let context = self.loop_context(element);
            for (line, step) in &steps {
                self.render_line(context, line, step, depth, out);
            }
        }
    }

    /// Loop elements that are reference tokens stand for the referenced node.
    fn loop_context<'v>(&self, element: &'v Value) -> &'v Value
    where
        'a: 'v,
    {
        element
            .as_str()
            .and_then(|token| self.resolver.resolve(token))
            .map_or(element, |(node, _)| node)
    }

    fn read_blueprint(&self, path: &Path) -> Result<String, BlueprintError> {
        self.config
            .read(path)
            .map_err(|source| BlueprintError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Index of the `@endloop:<key>` line closing the block opened at `start`.
fn find_loop_end(lines: &[&str], start: usize, key: &str) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| {
            matches!(parse_line(line), Some(Ok(Directive::EndLoop { key: end_key })) if end_key == key)
        })
        .map(|(idx, _)| idx)
}

/// Append text followed by a blank line.
fn push_block(out: &mut String, text: &str) {
    out.push_str(text);
    out.push_str("\n\n");
}

fn push_marker(out: &mut String, err: &dyn Display) {
    push_block(out, &format!("{{Error: {err}}}"));
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use archview_graph::reference_token;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::diagram::DiagramError;

    const REQ_1: &str = "aaaaaaaa-0000-4000-8000-000000000001";
    const REQ_2: &str = "aaaaaaaa-0000-4000-8000-000000000002";
    const LIB: &str = "bbbbbbbb-0000-4000-8000-000000000001";

    struct StubDiagrams;

    impl DiagramRenderer for StubDiagrams {
        fn render(
            &self,
            node: &Value,
            _store: &GraphStore,
            palette: &Palette,
        ) -> Result<String, DiagramError> {
            let label = node_label(node).ok_or_else(|| DiagramError::Unsupported {
                id: node_id(node).unwrap_or("?").to_owned(),
                tags: String::new(),
            })?;
            Ok(format!("@startuml\nclass {label} #{}\n@enduml\n", palette.color(0)))
        }
    }

    fn model() -> GraphStore {
        GraphStore::from_value(json!({
            "id": "project",
            "label": "Project",
            "packages": [{
                "id": "pkg",
                "tags": ["package"],
                "label": "Core",
                "description": "core package",
                "requirements": [
                    {"id": REQ_1, "tags": ["requirement"], "label": "Req 1", "description": "first"},
                    {"id": REQ_2, "tags": ["requirement"], "label": "Req 2", "description": "second"}
                ],
                "libs": [{
                    "id": LIB,
                    "tags": ["lib"],
                    "label": "Motor Lib",
                    "satisfies": [reference_token(REQ_1), reference_token(REQ_2)],
                    "ports": [
                        {"label": "P1", "direction": "in"},
                        {"label": "P2", "direction": "out"}
                    ],
                    "refs": [reference_token(REQ_2)],
                    "image": "motor.png"
                }]
            }]
        }))
    }

    fn files(entries: &[(&str, &str)]) -> InterpreterConfig {
        let map: HashMap<PathBuf, String> = entries
            .iter()
            .map(|(path, text)| (PathBuf::from(path), (*text).to_owned()))
            .collect();
        InterpreterConfig::new().with_read_file(move |path| {
            map.get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such blueprint"))
        })
    }

    fn node<'s>(store: &'s GraphStore, id: &str) -> &'s Value {
        store.search_by_id(id).unwrap().0
    }

    #[test]
    fn test_title_literal_ignores_depth() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        assert_eq!(
            interpreter.run(store.root(), r#"{{title:"Hello":2}}"#, 5),
            "## Hello\n\n"
        );
    }

    #[test]
    fn test_title_depth_expression_backtick() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        assert_eq!(
            interpreter.run(store.root(), r#"{{title:"Hello":i+1:backtick}}"#, 2),
            "### `Hello`\n\n"
        );
    }

    #[test]
    fn test_title_from_field() {
        let store = GraphStore::from_value(json!(
            {"id": "1", "tags": ["requirement"], "label": "Req A", "description": "d"}
        ));
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        assert_eq!(
            interpreter.run(store.root(), "{{title:label:1}}", 1),
            "# Req A\n\n"
        );
    }

    #[test]
    fn test_literal_lines_get_paragraph_breaks() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, "pkg"), "Intro\r\n{{text:description}}\n", 1);
        assert_eq!(out, "Intro\n\ncore package\n\n\n\n");
    }

    #[test]
    fn test_missing_field_and_unknown_type_are_skipped() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, "pkg"),
            "{{text:missing}}\n{{table:rows}}\n{{text:tags}}\nafter",
            1,
        );
        assert_eq!(out, "package\n\nafter\n\n");
    }

    #[test]
    fn test_non_text_field_is_skipped() {
        let store = GraphStore::from_value(json!({"id": "x", "count": 3}));
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        assert_eq!(interpreter.run(store.root(), "{{text:count}}\nok", 1), "ok\n\n");
    }

    #[test]
    fn test_errors_are_inline_and_generation_continues() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, "pkg"),
            "{{title}}\n{{list:label}}\n{{title:label:x*}}\nEnd",
            1,
        );
        assert_eq!(
            out,
            "{Error: Directive 'title' requires a field key or quoted text}\n\n\
             {Error: Invalid element type for list: expected a list}\n\n\
             {Error: Invalid expression 'x*'}\n\n\
             End\n\n"
        );
    }

    #[test]
    fn test_reference_list_becomes_links() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, LIB), "{{list:satisfies}}", 1);
        assert_eq!(out, "- [Req 1](#req-1)\n- [Req 2](#req-2)\n\n");
    }

    #[test]
    fn test_reference_text_becomes_label() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, LIB), "{{text:satisfies}}", 1);
        assert_eq!(out, "Req 1\nReq 2\n\n");
    }

    #[test]
    fn test_image_and_link() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "{{image:image:Motor}}\n{{link:image:Picture}}",
            1,
        );
        assert_eq!(
            out,
            "<img src='motor.png' alt='Motor'/>\n\n<a href=\"motor.png\">Picture</a>\n\n"
        );
    }

    #[test]
    fn test_plantuml_embeds_comment_and_image() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, LIB), "{{@plantuml}}", 1);
        assert_eq!(
            out,
            format!(
                "<!--\n@startuml\nclass Motor Lib #lightblue\n@enduml\n\n-->\n![]({LIB}.svg)\n\n\n"
            )
        );
    }

    #[test]
    fn test_plantuml_uses_configured_palette() {
        let store = model();
        let palette = Palette::new(vec!["pink".to_owned()]).unwrap();
        let interpreter = Interpreter::new(&store, &StubDiagrams)
            .with_config(InterpreterConfig::new().with_palette(palette));
        let out = interpreter.run(node(&store, LIB), "{{@plantuml}}", 1);
        assert!(out.contains("#pink"));
    }

    #[test]
    fn test_plantuml_failure_is_inline() {
        let store = GraphStore::from_value(json!({"id": "x"}));
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(store.root(), "{{@plantuml}}\nnext", 1);
        assert!(out.starts_with("{Error: No diagram converter for node 'x'"));
        assert!(out.ends_with("next\n\n"));
    }

    #[test]
    fn test_ref_lists_referencing_nodes() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, REQ_2), "{{@ref:lib}}", 1);
        assert_eq!(out, "- **[Motor Lib](#motor-lib)**\n\n");
    }

    #[test]
    fn test_ref_without_matches_is_explicit() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, REQ_1), "{{@ref:package}}", 1);
        assert_eq!(out, "- **[Core](#core)**\n\n");

        let out = interpreter.run(node(&store, "pkg"), "{{@ref:lib}}", 1);
        assert_eq!(out, "`No references found for 'Core'`\n\n");
    }

    #[test]
    fn test_foreach_generates_sub_views_in_order() {
        let store = model();
        let config = files(&[
            ("bp/root.md", "{{title:label:i}}\n{{@foreach:requirement.req}}"),
            ("bp/req.md", "{{title:label:i}}"),
        ]);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter
            .run_file(node(&store, "pkg"), Path::new("bp/root.md"))
            .unwrap();
        assert_eq!(out, "# Core\n\n## Req 1\n\n## Req 2\n\n");
    }

    #[test]
    fn test_foreach_depth_override_persists() {
        let store = model();
        let config = files(&[
            (
                "bp/root.md",
                "{{@foreach:requirement.req,lib.lib:3}}\n{{title:label:i}}",
            ),
            ("bp/req.md", "{{title:label:i}}"),
            ("bp/lib.md", "{{title:label:i:backtick}}"),
        ]);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter
            .run_file(node(&store, "pkg"), Path::new("bp/root.md"))
            .unwrap();
        assert_eq!(
            out,
            "#### Req 1\n\n#### Req 2\n\n#### `Motor Lib`\n\n### Core\n\n"
        );
    }

    #[test]
    fn test_missing_sub_blueprint_is_recoverable() {
        let store = model();
        let config = files(&[("bp/root.md", "{{@foreach:lib.missing}}\nDone")]);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter
            .run_file(node(&store, "pkg"), Path::new("bp/root.md"))
            .unwrap();
        assert!(out.starts_with("{Error: Failed to read blueprint bp/missing.md"));
        assert!(out.ends_with("Done\n\n"));
    }

    #[test]
    fn test_missing_root_blueprint_is_fatal() {
        let store = model();
        let interpreter =
            Interpreter::new(&store, &StubDiagrams).with_config(files(&[]));
        let err = interpreter
            .run_file(store.root(), Path::new("bp/root.md"))
            .unwrap_err();
        assert!(matches!(err, BlueprintError::Read { .. }));
    }

    #[test]
    fn test_self_referential_foreach_terminates() {
        let store = model();
        let config = files(&[
            ("bp/root.md", "{{@foreach:requirement.req}}"),
            ("bp/req.md", "{{title:label:i}}\n{{@foreach:requirement.req}}"),
        ]);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter
            .run_file(node(&store, "pkg"), Path::new("bp/root.md"))
            .unwrap();
        assert!(out.starts_with("## Req 1\n\n{Error: Recursive sub-view"));
        assert!(out.contains("## Req 2\n\n"));
    }

    #[test]
    fn test_max_depth_cuts_off_nesting() {
        let store = GraphStore::from_value(json!({
            "id": "top",
            "children": [{
                "id": "c1", "tags": ["node"], "label": "C1",
                "children": [{
                    "id": "c2", "tags": ["node"], "label": "C2",
                    "children": [{"id": "c3", "tags": ["node"], "label": "C3"}]
                }]
            }]
        }));
        let config = files(&[
            ("root.md", "{{@foreach:node.a}}"),
            ("a.md", "{{title:label:i}}\n{{@foreach:node.b}}"),
            ("b.md", "{{title:label:i}}\n{{@foreach:node.a}}"),
        ])
        .with_max_depth(2);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter.run_file(store.root(), Path::new("root.md")).unwrap();
        assert!(out.starts_with("## C1\n\n"));
        assert!(out.contains("Sub-view nesting exceeds maximum of 2"));
    }

    #[test]
    fn test_oversized_title_level_is_a_marker() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            store.root(),
            "{{title:\"x\":9223372036854775807}}\n{{title:\"y\":i+6}}\nafter",
            1,
        );
        assert!(out.starts_with("{Error: Heading level must be between 1 and 6, got "));
        assert!(out.contains("\n\n{Error: Heading level must be between 1 and 6, got 7}\n\n"));
        assert!(out.ends_with("after\n\n"));
    }

    #[test]
    fn test_oversized_foreach_depth_is_a_marker() {
        let store = model();
        let config = files(&[
            (
                "bp/root.md",
                "{{@foreach:requirement.req:99999999}}\n{{title:label:i}}",
            ),
            ("bp/req.md", "{{title:label:i}}"),
        ]);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter
            .run_file(node(&store, "pkg"), Path::new("bp/root.md"))
            .unwrap();
        assert_eq!(
            out,
            "{Error: Heading level must be between 1 and 6, got 99999999}\n\n# Core\n\n"
        );
    }

    #[test]
    fn test_run_counts_text_as_root_view() {
        let store = GraphStore::from_value(json!({
            "id": "top",
            "children": [{
                "id": "c1", "tags": ["node"], "label": "C1",
                "children": [{"id": "c2", "tags": ["leaf"], "label": "C2"}]
            }]
        }));
        let config = files(&[
            ("./a.md", "{{title:label:i}}\n{{@foreach:leaf.b}}"),
            ("./b.md", "{{title:label:i}}"),
        ])
        .with_max_depth(2);
        let interpreter = Interpreter::new(&store, &StubDiagrams).with_config(config);
        let out = interpreter.run(store.root(), "{{@foreach:node.a}}", 1);
        assert!(out.starts_with("## C1\n\n{Error: Sub-view nesting exceeds maximum of 2"));
        assert!(!out.contains("C2"));
    }

    #[test]
    fn test_loop_renders_block_per_element() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "Before\n{{@loop:ports}}\n{{title:label:3}}\n{{text:direction}}\n{{@endloop:ports}}\nAfter",
            1,
        );
        assert_eq!(out, "Before\n\n### P1\n\nin\n\n### P2\n\nout\n\nAfter\n\n");
    }

    #[test]
    fn test_loop_resolves_reference_elements() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "{{@loop:refs}}\n{{text:description}}\n{{@endloop:refs}}",
            1,
        );
        assert_eq!(out, "second\n\n");
    }

    #[test]
    fn test_unterminated_loop_only_affects_its_line() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "Before\n{{@loop:ports}}\n{{text:label}}\nAfter",
            1,
        );
        assert_eq!(
            out,
            "Before\n\n{Error: Missing @endloop:ports}\n\nMotor Lib\n\nAfter\n\n"
        );
    }

    #[test]
    fn test_loop_with_foreach_is_rejected() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "{{@loop:ports}}\n{{@foreach:requirement.req}}\n{{@endloop:ports}}\nAfter",
            1,
        );
        assert_eq!(
            out,
            "{Error: @loop:ports block cannot contain '{{@foreach:requirement.req}}'}\n\nAfter\n\n"
        );
    }

    #[test]
    fn test_loop_over_missing_field_skips_block() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(
            node(&store, LIB),
            "{{@loop:nothing}}\n{{text:label}}\n{{@endloop:nothing}}\nAfter",
            1,
        );
        assert_eq!(out, "After\n\n");
    }

    #[test]
    fn test_stray_endloop_is_skipped() {
        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter.run(node(&store, LIB), "{{@endloop:ports}}\nAfter", 1);
        assert_eq!(out, "After\n\n");
    }

    #[test]
    fn test_run_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("view.md"),
            "{{title:label:1}}\n{{@foreach:requirement.item}}",
        )
        .unwrap();
        std::fs::write(dir.path().join("item.md"), "- {{text:label}}").unwrap();

        let store = model();
        let interpreter = Interpreter::new(&store, &StubDiagrams);
        let out = interpreter
            .run_file(node(&store, "pkg"), &dir.path().join("view.md"))
            .unwrap();
        assert_eq!(out, "# Core\n\nReq 1\n\nReq 2\n\n");
    }
}
