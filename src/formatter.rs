//! Diff formatters.
//!
//! A formatter turns an [`OperationSequence`] into an [`InspectionTree`]:
//!
//! ```text
//! #<Person                  <- opening, carries the entry marker when nested
//! ~ name: "x" => "y"        <- one marked entry per operation
//!   age: 1
//! ~ address: #<Address      <- nested change: label prelude + child tree
//!   ~ city: "a" => "b"
//!   >
//! >                         <- closing, always unmarked
//! ```
//!
//! Entries sit one level deeper than their collection. Nested formatters
//! never see an indent level; depth comes from the tree structure alone.

use crate::diff::{DiffOperation, OperationKind, OperationSequence, ValueClass};
use crate::error::DiffError;
use crate::inspection::{facet_label, inspect, InspectionNode, InspectionTree, Marker};
use crate::registry::Registry;
use crate::value::Value;

/// A strategy rendering operation sequences.
pub trait DiffFormatter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn applies_to(&self, sequence: &OperationSequence) -> bool;

    /// Builds the display tree. `formatters` is used for nested changes.
    fn call(
        &self,
        sequence: &OperationSequence,
        formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError>;
}

/// `#<ClassName` … `>`
pub struct ObjectFormatter;

impl DiffFormatter for ObjectFormatter {
    fn name(&self) -> &'static str {
        "object"
    }

    fn applies_to(&self, sequence: &OperationSequence) -> bool {
        matches!(sequence.value_class, ValueClass::Object(_))
    }

    fn call(
        &self,
        sequence: &OperationSequence,
        formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError> {
        let class_name = match &sequence.value_class {
            ValueClass::Object(name) => name.as_str(),
            _ => "Object",
        };
        format_collection(&format!("#<{}", class_name), ">", sequence, formatters)
    }
}

/// `{` … `}`
pub struct HashFormatter;

impl DiffFormatter for HashFormatter {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn applies_to(&self, sequence: &OperationSequence) -> bool {
        sequence.value_class == ValueClass::Hash
    }

    fn call(
        &self,
        sequence: &OperationSequence,
        formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError> {
        format_collection("{", "}", sequence, formatters)
    }
}

/// `[` … `]`, entries without keys.
pub struct ArrayFormatter;

impl DiffFormatter for ArrayFormatter {
    fn name(&self) -> &'static str {
        "array"
    }

    fn applies_to(&self, sequence: &OperationSequence) -> bool {
        sequence.value_class == ValueClass::Array
    }

    fn call(
        &self,
        sequence: &OperationSequence,
        formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError> {
        format_collection("[", "]", sequence, formatters)
    }
}

/// Whole-value comparisons: the marked entries alone, one level deep so
/// their markers show.
pub struct ValueFormatter;

impl DiffFormatter for ValueFormatter {
    fn name(&self) -> &'static str {
        "value"
    }

    fn applies_to(&self, sequence: &OperationSequence) -> bool {
        matches!(sequence.value_class, ValueClass::Value(_))
    }

    fn call(
        &self,
        sequence: &OperationSequence,
        formatters: &Registry<dyn DiffFormatter>,
    ) -> Result<InspectionTree, DiffError> {
        let entries = format_entries(sequence, formatters)?;
        Ok(InspectionTree::new().with(InspectionNode::Nested(entries)))
    }
}

fn format_collection(
    open: &str,
    close: &str,
    sequence: &OperationSequence,
    formatters: &Registry<dyn DiffFormatter>,
) -> Result<InspectionTree, DiffError> {
    Ok(InspectionTree::new()
        .with(InspectionNode::CollectionOpen(open.to_string()))
        .with(InspectionNode::Delimiter(" ".into()))
        .with(InspectionNode::Nested(format_entries(sequence, formatters)?))
        .with(InspectionNode::CollectionClose(close.to_string())))
}

fn format_entries(
    sequence: &OperationSequence,
    formatters: &Registry<dyn DiffFormatter>,
) -> Result<InspectionTree, DiffError> {
    let mut entries = InspectionTree::new();
    for (i, operation) in sequence.operations.iter().enumerate() {
        if i > 0 {
            entries.push(InspectionNode::Delimiter(", ".into()));
        }
        entries.push(InspectionNode::Marked {
            marker: marker_for(operation.kind()),
            tree: format_entry(operation, formatters)?,
        });
    }
    Ok(entries)
}

pub fn marker_for(kind: OperationKind) -> Marker {
    match kind {
        OperationKind::NoChange => Marker::Blank,
        OperationKind::Add => Marker::Added,
        OperationKind::Delete => Marker::Deleted,
        OperationKind::Change => Marker::Changed,
    }
}

fn format_entry(
    operation: &DiffOperation,
    formatters: &Registry<dyn DiffFormatter>,
) -> Result<InspectionTree, DiffError> {
    let mut entry = InspectionTree::new();
    if let Some(label) = facet_label(operation.key()) {
        entry.push(InspectionNode::prelude(label));
    }

    if let Some(children) = operation.children() {
        let formatter = formatters.select(children)?;
        entry.append(formatter.call(children, formatters)?);
        return Ok(entry);
    }

    let text = match (operation.kind(), operation.expected(), operation.actual()) {
        (OperationKind::Change, Some(expected), Some(actual)) => {
            format!("{} => {}", inline(expected), inline(actual))
        }
        (OperationKind::Delete, Some(expected), _) => inline(expected),
        (_, _, Some(actual)) => inline(actual),
        (_, Some(expected), None) => inline(expected),
        (_, None, None) => {
            return Err(DiffError::malformed_node_tree(format!(
                "operation on {} carries no value",
                operation.key()
            )))
        }
    };
    entry.push(InspectionNode::Primitive(text));
    Ok(entry)
}

fn inline(value: &Value) -> String {
    inspect(value).render_to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::RenderContext;
    use crate::value::FacetKey;

    fn render(sequence: &OperationSequence) -> Vec<String> {
        let formatters = Registry::built_in_formatters();
        formatters
            .select(sequence)
            .unwrap()
            .call(sequence, &formatters)
            .unwrap()
            .render_to_lines(RenderContext::root())
            .unwrap()
            .iter()
            .map(|line| line.render(2))
            .collect()
    }

    fn field(name: &str) -> FacetKey {
        FacetKey::Field(name.to_string())
    }

    #[test]
    fn test_object_block() {
        let sequence = OperationSequence::new(
            ValueClass::Object("B".into()),
            vec![
                DiffOperation::change(field("name"), Value::from("x"), Value::from("y")),
                DiffOperation::no_change(field("age"), Value::from(1), Value::from(1)),
                DiffOperation::add(field("email"), Value::from("a@b")),
                DiffOperation::delete(field("phone"), Value::Nil),
            ],
        );
        assert_eq!(
            render(&sequence),
            vec![
                "#<B",
                "~ name: \"x\" => \"y\"",
                "  age: 1",
                "+ email: \"a@b\"",
                "- phone: nil",
                ">",
            ]
        );
    }

    #[test]
    fn test_nested_change_splices_child_block() {
        let inner = OperationSequence::new(
            ValueClass::Object("Address".into()),
            vec![
                DiffOperation::change(field("city"), Value::from("a"), Value::from("b")),
                DiffOperation::no_change(field("zip"), Value::from(1), Value::from(1)),
            ],
        );
        let sequence = OperationSequence::new(
            ValueClass::Object("Person".into()),
            vec![
                DiffOperation::nested_change(field("address"), Value::Nil, Value::Nil, inner),
                DiffOperation::no_change(field("name"), Value::from("x"), Value::from("x")),
            ],
        );
        assert_eq!(
            render(&sequence),
            vec![
                "#<Person",
                "~ address: #<Address",
                "  ~ city: \"a\" => \"b\"",
                "    zip: 1",
                "  >",
                "  name: \"x\"",
                ">",
            ]
        );
    }

    #[test]
    fn test_hash_and_array_blocks() {
        let items = OperationSequence::new(
            ValueClass::Array,
            vec![
                DiffOperation::no_change(FacetKey::Index(0), Value::from(1), Value::from(1)),
                DiffOperation::add(FacetKey::Index(1), Value::from(2)),
            ],
        );
        let sequence = OperationSequence::new(
            ValueClass::Hash,
            vec![DiffOperation::nested_change(
                FacetKey::Key("list items".into()),
                Value::Nil,
                Value::Nil,
                items,
            )],
        );
        assert_eq!(
            render(&sequence),
            vec!["{", "~ \"list items\": [", "    1", "  + 2", "  ]", "}"]
        );
    }

    #[test]
    fn test_composite_values_render_inline_in_entries() {
        let sequence = OperationSequence::new(
            ValueClass::Hash,
            vec![DiffOperation::add(
                FacetKey::Key("point".into()),
                Value::object("Point", [("x", Value::from(1)), ("y", Value::from(2))]),
            )],
        );
        assert_eq!(
            render(&sequence),
            vec!["{", "+ point: #<Point x: 1, y: 2>", "}"]
        );
    }

    #[test]
    fn test_whole_value_entry() {
        let changed = OperationSequence::new(
            ValueClass::Value("integer".into()),
            vec![DiffOperation::change(
                FacetKey::Whole,
                Value::from(1),
                Value::from(2),
            )],
        );
        assert_eq!(render(&changed), vec!["~ 1 => 2"]);

        let unchanged = OperationSequence::new(
            ValueClass::Value("hash".into()),
            vec![DiffOperation::no_change(
                FacetKey::Whole,
                Value::hash([("a", Value::from(1))]),
                Value::hash([("a", Value::from(1))]),
            )],
        );
        assert_eq!(render(&unchanged), vec!["  { a: 1 }"]);
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = OperationSequence::new(ValueClass::Object("Unit".into()), vec![]);
        assert_eq!(render(&sequence), vec!["#<Unit", ">"]);
    }

    #[test]
    fn test_marker_for() {
        assert_eq!(marker_for(OperationKind::Add).as_char(), '+');
        assert_eq!(marker_for(OperationKind::Delete).as_char(), '-');
        assert_eq!(marker_for(OperationKind::Change).as_char(), '~');
        assert_eq!(marker_for(OperationKind::NoChange).as_char(), ' ');
    }
}
