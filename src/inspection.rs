//! Inspection node trees.
//!
//! An [`InspectionTree`] is the display form of a value or of a diff. Every
//! node renders in two modes:
//!
//! - inline, as a single string (`{ a: 1, b: 2 }`), and
//! - as lines, each carrying its own indent level and change marker.
//!
//! Indentation is never stored in the nodes. It is threaded through the
//! render calls in a [`RenderContext`] and grows by one level inside
//! [`InspectionNode::Nested`].
//!
//! # Examples
//!
//! ```
//! use valdiff::inspection::{inspect, RenderContext};
//! use valdiff::Value;
//!
//! let value = Value::hash([("a", Value::from(1)), ("b", Value::from(2))]);
//! let tree = inspect(&value);
//!
//! assert_eq!(tree.render_to_string(), "{ a: 1, b: 2 }");
//!
//! let lines: Vec<String> = tree
//!     .render_to_lines(RenderContext::root())
//!     .unwrap()
//!     .iter()
//!     .map(|line| line.render(2))
//!     .collect();
//! assert_eq!(lines, vec!["{", "  a: 1", "  b: 2", "}"]);
//! ```

use crate::error::DiffError;
use crate::value::{FacetKey, Value};
use serde::Serialize;

/// The one-character change marker in front of a rendered line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    #[default]
    Blank,
    Added,
    Deleted,
    Changed,
}

impl Marker {
    pub const fn as_char(self) -> char {
        match self {
            Marker::Blank => ' ',
            Marker::Added => '+',
            Marker::Deleted => '-',
            Marker::Changed => '~',
        }
    }
}

/// Where the next line is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub indent_level: usize,
    pub marker: Marker,
}

impl RenderContext {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn at(indent_level: usize) -> Self {
        Self {
            indent_level,
            marker: Marker::Blank,
        }
    }

    /// One level deeper, with the marker reset.
    pub fn nested(self) -> Self {
        Self {
            indent_level: self.indent_level + 1,
            marker: Marker::Blank,
        }
    }

    pub fn with_marker(self, marker: Marker) -> Self {
        Self { marker, ..self }
    }
}

/// A rendered line, not yet indented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub indent_level: usize,
    pub marker: Marker,
    pub text: String,
}

impl Line {
    /// Renders the line with `indent_width` spaces per level.
    ///
    /// The marker takes the first column of the innermost indent unit, so an
    /// unmarked line at depth `d` starts with exactly `d * indent_width`
    /// spaces. Lines at depth zero carry no marker column.
    pub fn render(&self, indent_width: usize) -> String {
        if self.indent_level == 0 {
            return self.text.clone();
        }
        let width = indent_width.max(1);
        format!(
            "{}{}{}{}",
            " ".repeat(width * (self.indent_level - 1)),
            self.marker.as_char(),
            " ".repeat(width - 1),
            self.text
        )
    }
}

/// A string that prefixes the next rendered line instead of taking its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreludeForNextNode(String);

impl PreludeForNextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Output of rendering a single node to lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedPiece {
    Line(Line),
    Prelude(PreludeForNextNode),
}

/// Content of a prelude node.
#[derive(Debug, Clone, PartialEq)]
pub enum PreludeSource {
    Immediate(String),
    Subtree(InspectionTree),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InspectionNode {
    /// An immediate value, one line on its own.
    Primitive(String),
    /// Collapsed to one string and glued onto the next line in line mode.
    Prelude(PreludeSource),
    /// Opening of a collection, rendered with the current marker.
    CollectionOpen(String),
    /// Closing of a collection, always rendered unmarked.
    CollectionClose(String),
    /// Inline-only separator; produces no lines.
    Delimiter(String),
    /// Children rendered one level deeper.
    Nested(InspectionTree),
    /// Children rendered with the given marker.
    Marked { marker: Marker, tree: InspectionTree },
}

impl InspectionNode {
    pub fn prelude(text: impl Into<String>) -> Self {
        InspectionNode::Prelude(PreludeSource::Immediate(text.into()))
    }

    pub fn render_to_string(&self) -> String {
        match self {
            InspectionNode::Primitive(text)
            | InspectionNode::CollectionOpen(text)
            | InspectionNode::CollectionClose(text)
            | InspectionNode::Delimiter(text) => text.clone(),
            InspectionNode::Prelude(PreludeSource::Immediate(text)) => text.clone(),
            InspectionNode::Prelude(PreludeSource::Subtree(tree))
            | InspectionNode::Nested(tree)
            | InspectionNode::Marked { tree, .. } => tree.render_to_string(),
        }
    }

    pub fn render_to_lines(&self, ctx: RenderContext) -> Result<Vec<RenderedPiece>, DiffError> {
        let pieces = match self {
            InspectionNode::Primitive(text) | InspectionNode::CollectionOpen(text) => {
                vec![RenderedPiece::Line(Line {
                    indent_level: ctx.indent_level,
                    marker: ctx.marker,
                    text: text.clone(),
                })]
            }
            InspectionNode::CollectionClose(text) => vec![RenderedPiece::Line(Line {
                indent_level: ctx.indent_level,
                marker: Marker::Blank,
                text: text.clone(),
            })],
            InspectionNode::Delimiter(_) => Vec::new(),
            InspectionNode::Prelude(_) => vec![RenderedPiece::Prelude(PreludeForNextNode::new(
                self.render_to_string(),
            ))],
            InspectionNode::Nested(tree) => into_pieces(tree.render_to_lines(ctx.nested())?),
            InspectionNode::Marked { marker, tree } => {
                into_pieces(tree.render_to_lines(ctx.with_marker(*marker))?)
            }
        };
        Ok(pieces)
    }
}

fn into_pieces(lines: Vec<Line>) -> Vec<RenderedPiece> {
    lines.into_iter().map(RenderedPiece::Line).collect()
}

/// An ordered list of exclusively owned nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionTree {
    nodes: Vec<InspectionNode>,
}

impl InspectionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node: InspectionNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn push(&mut self, node: InspectionNode) {
        self.nodes.push(node);
    }

    /// Moves all nodes of `other` to the end of this tree.
    pub fn append(&mut self, other: InspectionTree) {
        self.nodes.extend(other.nodes);
    }

    pub fn nodes(&self) -> &[InspectionNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn render_to_string(&self) -> String {
        self.nodes
            .iter()
            .map(InspectionNode::render_to_string)
            .collect()
    }

    /// Renders every node to lines, gluing preludes onto the line that
    /// follows them.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MalformedNodeTree`] if the tree ends with a
    /// prelude that has no line to attach to.
    pub fn render_to_lines(&self, ctx: RenderContext) -> Result<Vec<Line>, DiffError> {
        let mut lines = Vec::new();
        let mut pending: Option<String> = None;

        for node in &self.nodes {
            for piece in node.render_to_lines(ctx)? {
                match piece {
                    RenderedPiece::Prelude(prelude) => {
                        pending.get_or_insert_with(String::new).push_str(prelude.as_str());
                    }
                    RenderedPiece::Line(mut line) => {
                        if let Some(prefix) = pending.take() {
                            line.text.insert_str(0, &prefix);
                        }
                        lines.push(line);
                    }
                }
            }
        }

        match pending {
            Some(prefix) => Err(DiffError::malformed_node_tree(format!(
                "prelude {:?} has no following line",
                prefix
            ))),
            None => Ok(lines),
        }
    }
}

/// Collections nested deeper than this are elided as `[...]`, `{...}` or
/// `#<Class ...>`.
pub const MAX_INSPECT_DEPTH: usize = 64;

/// Builds the display tree of a value.
pub fn inspect(value: &Value) -> InspectionTree {
    inspect_within(value, MAX_INSPECT_DEPTH)
}

fn inspect_within(value: &Value, depth: usize) -> InspectionTree {
    if depth == 0 {
        match value {
            Value::Array(items) if !items.is_empty() => return primitive("[...]"),
            Value::Hash(map) if !map.is_empty() => return primitive("{...}"),
            Value::Object(object) if !object.fields.is_empty() => {
                return primitive(format!("#<{} ...>", object.class_name))
            }
            _ => {}
        }
    }
    let inner = |value: &Value| inspect_within(value, depth.saturating_sub(1));
    match value {
        Value::Nil => primitive("nil"),
        Value::Bool(b) => primitive(b.to_string()),
        Value::Integer(n) => primitive(n.to_string()),
        Value::Float(n) => primitive(format!("{:?}", n)),
        Value::String(s) => primitive(format!("{:?}", s)),
        Value::Symbol(s) => primitive(format!(":{}", s)),
        Value::Array(items) if items.is_empty() => primitive("[]"),
        Value::Array(items) => {
            let entries = items.iter().map(|item| (None, inner(item)));
            InspectionTree::new()
                .with(InspectionNode::CollectionOpen("[".into()))
                .with(InspectionNode::Nested(entry_list(entries)))
                .with(InspectionNode::CollectionClose("]".into()))
        }
        Value::Hash(map) if map.is_empty() => primitive("{}"),
        Value::Hash(map) => {
            let entries = map.iter().map(|(key, value)| {
                let key_tree = primitive(key_label(key)).with(InspectionNode::Primitive(": ".into()));
                (
                    Some(InspectionNode::Prelude(PreludeSource::Subtree(key_tree))),
                    inner(value),
                )
            });
            InspectionTree::new()
                .with(InspectionNode::CollectionOpen("{".into()))
                .with(InspectionNode::Delimiter(" ".into()))
                .with(InspectionNode::Nested(entry_list(entries)))
                .with(InspectionNode::Delimiter(" ".into()))
                .with(InspectionNode::CollectionClose("}".into()))
        }
        Value::Object(object) if object.fields.is_empty() => {
            primitive(format!("#<{}>", object.class_name))
        }
        Value::Object(object) => {
            let entries = object.fields.iter().map(|(field, value)| {
                (
                    Some(InspectionNode::prelude(format!("{}: ", field))),
                    inner(value),
                )
            });
            InspectionTree::new()
                .with(InspectionNode::CollectionOpen(format!(
                    "#<{}",
                    object.class_name
                )))
                .with(InspectionNode::Delimiter(" ".into()))
                .with(InspectionNode::Nested(entry_list(entries)))
                .with(InspectionNode::CollectionClose(">".into()))
        }
    }
}

fn primitive(text: impl Into<String>) -> InspectionTree {
    InspectionTree::new().with(InspectionNode::Primitive(text.into()))
}

/// Unmarked entries separated by inline-only commas.
fn entry_list<I>(entries: I) -> InspectionTree
where
    I: IntoIterator<Item = (Option<InspectionNode>, InspectionTree)>,
{
    let mut list = InspectionTree::new();
    for (i, (prelude, value_tree)) in entries.into_iter().enumerate() {
        if i > 0 {
            list.push(InspectionNode::Delimiter(", ".into()));
        }
        let mut entry = InspectionTree::new();
        if let Some(prelude) = prelude {
            entry.push(prelude);
        }
        entry.append(value_tree);
        list.push(InspectionNode::Marked {
            marker: Marker::Blank,
            tree: entry,
        });
    }
    list
}

/// Hash keys that look like identifiers are shown bare, the rest quoted.
pub fn key_label(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_');
    if is_identifier {
        key.to_string()
    } else {
        format!("{:?}", key)
    }
}

/// Label shown in front of a facet's value, e.g. `name: `. Array positions
/// carry no label.
pub fn facet_label(key: &FacetKey) -> Option<String> {
    match key {
        FacetKey::Field(name) => Some(format!("{}: ", name)),
        FacetKey::Key(name) => Some(format!("{}: ", key_label(name))),
        FacetKey::Index(_) | FacetKey::Whole => None,
    }
}
