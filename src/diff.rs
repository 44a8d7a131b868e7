//! Diff operations and configuration.
//!
//! A diff is an [`OperationSequence`]: one [`DiffOperation`] per facet of the
//! compared values, in the actual value's enumeration order followed by the
//! facets only the expected value has. Changed composite facets carry a
//! nested sequence of their own.
//!
//! # Examples
//!
//! ```
//! use valdiff::{Differ, OperationKind, Value};
//!
//! let expected = Value::hash([("a", Value::from(1))]);
//! let actual = Value::hash([("a", Value::from(1)), ("b", Value::from(2))]);
//!
//! let sequence = Differ::new().operations(&expected, &actual).unwrap();
//! let kinds: Vec<OperationKind> = sequence.operations.iter().map(|op| op.kind()).collect();
//!
//! assert_eq!(kinds, vec![OperationKind::NoChange, OperationKind::Add]);
//! assert_eq!(sequence.stats().added, 1);
//! ```

use crate::value::{FacetKey, Value};
use serde::Serialize;

/// The type of change that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Facet exists on both sides with equal values
    NoChange,
    /// Facet exists in actual but not expected
    Add,
    /// Facet exists in expected but not actual
    Delete,
    /// Facet exists on both sides with different values
    Change,
}

/// A single diff entry.
///
/// `Add` never carries an expected value and `Delete` never carries an
/// actual value; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffOperation {
    kind: OperationKind,
    key: FacetKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<OperationSequence>,
}

impl DiffOperation {
    pub fn no_change(key: FacetKey, expected: Value, actual: Value) -> Self {
        Self {
            kind: OperationKind::NoChange,
            key,
            expected: Some(expected),
            actual: Some(actual),
            children: None,
        }
    }

    pub fn add(key: FacetKey, actual: Value) -> Self {
        Self {
            kind: OperationKind::Add,
            key,
            expected: None,
            actual: Some(actual),
            children: None,
        }
    }

    pub fn delete(key: FacetKey, expected: Value) -> Self {
        Self {
            kind: OperationKind::Delete,
            key,
            expected: Some(expected),
            actual: None,
            children: None,
        }
    }

    pub fn change(key: FacetKey, expected: Value, actual: Value) -> Self {
        Self {
            kind: OperationKind::Change,
            key,
            expected: Some(expected),
            actual: Some(actual),
            children: None,
        }
    }

    /// A change whose sub-values were diffed recursively.
    pub fn nested_change(
        key: FacetKey,
        expected: Value,
        actual: Value,
        children: OperationSequence,
    ) -> Self {
        Self {
            children: Some(children),
            ..Self::change(key, expected, actual)
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn key(&self) -> &FacetKey {
        &self.key
    }

    pub fn expected(&self) -> Option<&Value> {
        self.expected.as_ref()
    }

    pub fn actual(&self) -> Option<&Value> {
        self.actual.as_ref()
    }

    pub fn children(&self) -> Option<&OperationSequence> {
        self.children.as_ref()
    }
}

/// The kind of composite a sequence was produced from; formatters are
/// selected on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum ValueClass {
    Object(String),
    Hash,
    Array,
    /// A pair compared as a whole, named after the actual value's type.
    Value(String),
}

impl ValueClass {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(ValueClass::Object(object.class_name.clone())),
            Value::Hash(_) => Some(ValueClass::Hash),
            Value::Array(_) => Some(ValueClass::Array),
            _ => None,
        }
    }
}

/// Ordered operations for one pair of composite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationSequence {
    pub value_class: ValueClass,
    pub operations: Vec<DiffOperation>,
}

impl OperationSequence {
    pub fn new(value_class: ValueClass, operations: Vec<DiffOperation>) -> Self {
        Self {
            value_class,
            operations,
        }
    }

    /// Counts leaf operations, descending into nested changes.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::new();
        self.collect_stats(&mut stats);
        stats
    }

    fn collect_stats(&self, stats: &mut DiffStats) {
        for operation in &self.operations {
            match (operation.kind, &operation.children) {
                (OperationKind::Change, Some(children)) => children.collect_stats(stats),
                (OperationKind::Change, None) => stats.changed += 1,
                (OperationKind::Add, _) => stats.added += 1,
                (OperationKind::Delete, _) => stats.deleted += 1,
                (OperationKind::NoChange, _) => stats.unchanged += 1,
            }
        }
    }

    /// True when every operation, at every depth, is `NoChange`.
    pub fn is_unchanged(&self) -> bool {
        self.stats().is_empty()
    }
}

/// Statistics about the diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub deleted: usize,
    pub changed: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of changes (excluding unchanged).
    pub fn total_changes(&self) -> usize {
        self.added + self.deleted + self.changed
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Configuration for the diff algorithm and its rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffConfig {
    /// Deepest nesting the sequencers may recurse into
    pub max_depth: usize,
    /// Spaces per indent level in rendered lines
    pub indent_width: usize,
    /// Normalize whitespace in strings (trim and collapse multiple spaces)
    pub ignore_whitespace: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            indent_width: 2,
            ignore_whitespace: false,
        }
    }
}

/// Equality of two values under `config`, at every depth.
pub(crate) fn values_equal(expected: &Value, actual: &Value, config: &DiffConfig) -> bool {
    if config.ignore_whitespace {
        expected.equals_by(actual, |e, a| normalize_whitespace(e) == normalize_whitespace(a))
    } else {
        expected.semantic_equals(actual)
    }
}

/// Normalizes whitespace in a string.
///
/// Trims leading/trailing whitespace and collapses multiple consecutive
/// whitespace characters into a single space.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
