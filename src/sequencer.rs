//! Operational sequencers.
//!
//! A sequencer walks two composite values in parallel and produces an
//! [`OperationSequence`]. The built-in sequencers all share the same facet
//! walk:
//!
//! 1. Facets of `actual`, in its order, are matched against `expected`.
//!    Unmatched ones become `Add` operations.
//! 2. Facets only `expected` has follow, in its order, as `Delete`s.
//! 3. Facets on both sides are `NoChange` when equal. Otherwise they are a
//!    `Change`, nested when some registered sequencer applies to the pair.
//!
//! A `nil` facet facing a non-nil one counts as absent.
//!
//! [`ValueSequencer`] accepts any pair and compares it as one whole value.
//! It only ever runs at the top level, as the registry's last resort.

use crate::diff::{values_equal, DiffConfig, DiffOperation, OperationSequence, ValueClass};
use crate::error::DiffError;
use crate::registry::Strategies;
use crate::value::{FacetKey, Value};
use indexmap::IndexMap;
use tracing::trace;

/// A strategy producing diff operations for a pair of values.
pub trait OperationalSequencer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this sequencer can compare `expected` with `actual`.
    fn applies_to(&self, expected: &Value, actual: &Value) -> bool;

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError>;
}

/// Everything a sequencer needs to recurse: the strategy tables, the
/// configuration and the current depth.
#[derive(Clone, Copy)]
pub struct DiffContext<'a> {
    strategies: &'a Strategies,
    config: &'a DiffConfig,
    depth: usize,
}

impl<'a> DiffContext<'a> {
    pub fn new(strategies: &'a Strategies, config: &'a DiffConfig) -> Self {
        Self {
            strategies,
            config,
            depth: 0,
        }
    }

    pub fn strategies(&self) -> &'a Strategies {
        self.strategies
    }

    pub fn config(&self) -> &'a DiffConfig {
        self.config
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Context for one level of nesting deeper.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MaxDepthExceeded`] past `config.max_depth`.
    pub fn descend(&self) -> Result<Self, DiffError> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(DiffError::max_depth_exceeded(self.config.max_depth));
        }
        Ok(Self { depth, ..*self })
    }
}

/// Both values are hashes.
pub struct HashSequencer;

impl OperationalSequencer for HashSequencer {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn applies_to(&self, expected: &Value, actual: &Value) -> bool {
        matches!((expected, actual), (Value::Hash(_), Value::Hash(_)))
    }

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError> {
        sequence_composites(self, ValueClass::Hash, expected, actual, ctx)
    }
}

/// Both values are arrays, compared position by position.
pub struct ArraySequencer;

impl OperationalSequencer for ArraySequencer {
    fn name(&self) -> &'static str {
        "array"
    }

    fn applies_to(&self, expected: &Value, actual: &Value) -> bool {
        matches!((expected, actual), (Value::Array(_), Value::Array(_)))
    }

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError> {
        sequence_composites(self, ValueClass::Array, expected, actual, ctx)
    }
}

/// Both values are structured objects; the generic fallback.
///
/// The class names may differ. The sequence is labelled with the actual
/// value's class.
pub struct ObjectSequencer;

impl OperationalSequencer for ObjectSequencer {
    fn name(&self) -> &'static str {
        "object"
    }

    fn applies_to(&self, expected: &Value, actual: &Value) -> bool {
        matches!((expected, actual), (Value::Object(_), Value::Object(_)))
    }

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError> {
        let Value::Object(object) = actual else {
            return Err(DiffError::no_applicable_differ(
                expected.type_name(),
                actual.type_name(),
            ));
        };
        let value_class = ValueClass::Object(object.class_name.clone());
        sequence_composites(self, value_class, expected, actual, ctx)
    }
}

/// Any pair, compared as a single whole value.
pub struct ValueSequencer;

impl OperationalSequencer for ValueSequencer {
    fn name(&self) -> &'static str {
        "value"
    }

    fn applies_to(&self, _expected: &Value, _actual: &Value) -> bool {
        true
    }

    fn call(
        &self,
        expected: &Value,
        actual: &Value,
        ctx: &DiffContext<'_>,
    ) -> Result<OperationSequence, DiffError> {
        let (expected_value, actual_value) = (expected.clone(), actual.clone());
        let operation =
            if std::ptr::eq(expected, actual) || values_equal(expected, actual, ctx.config()) {
                DiffOperation::no_change(FacetKey::Whole, expected_value, actual_value)
            } else {
                DiffOperation::change(FacetKey::Whole, expected_value, actual_value)
            };
        let value_class = ValueClass::Value(actual.type_name().to_string());
        Ok(OperationSequence::new(value_class, vec![operation]))
    }
}

fn sequence_composites(
    sequencer: &dyn OperationalSequencer,
    value_class: ValueClass,
    expected: &Value,
    actual: &Value,
    ctx: &DiffContext<'_>,
) -> Result<OperationSequence, DiffError> {
    let (Some(expected_facets), Some(actual_facets)) = (expected.facets(), actual.facets()) else {
        return Err(DiffError::no_applicable_differ(
            expected.type_name(),
            actual.type_name(),
        ));
    };
    if !sequencer.applies_to(expected, actual) {
        return Err(DiffError::no_applicable_differ(
            expected.type_name(),
            actual.type_name(),
        ));
    }

    trace!(
        sequencer = sequencer.name(),
        depth = ctx.depth(),
        "sequencing facets"
    );
    let operations = sequence_facets(expected_facets, actual_facets, ctx)?;
    Ok(OperationSequence::new(value_class, operations))
}

/// Produces one operation per facet in the union of both facet lists.
pub fn sequence_facets(
    expected_facets: Vec<(FacetKey, &Value)>,
    actual_facets: Vec<(FacetKey, &Value)>,
    ctx: &DiffContext<'_>,
) -> Result<Vec<DiffOperation>, DiffError> {
    let mut remaining: IndexMap<FacetKey, &Value> = expected_facets.into_iter().collect();
    let mut operations = Vec::with_capacity(remaining.len().max(actual_facets.len()));

    for (key, actual_value) in actual_facets {
        let operation = match remaining.shift_remove(&key) {
            Some(expected_value) => compare_facet(key, expected_value, actual_value, ctx)?,
            None => DiffOperation::add(key, actual_value.clone()),
        };
        operations.push(operation);
    }

    for (key, expected_value) in remaining {
        operations.push(DiffOperation::delete(key, expected_value.clone()));
    }

    Ok(operations)
}

fn compare_facet(
    key: FacetKey,
    expected: &Value,
    actual: &Value,
    ctx: &DiffContext<'_>,
) -> Result<DiffOperation, DiffError> {
    match (expected.is_nil(), actual.is_nil()) {
        (true, false) => return Ok(DiffOperation::add(key, actual.clone())),
        (false, true) => return Ok(DiffOperation::delete(key, expected.clone())),
        _ => {}
    }

    if std::ptr::eq(expected, actual) || values_equal(expected, actual, ctx.config()) {
        return Ok(DiffOperation::no_change(key, expected.clone(), actual.clone()));
    }

    match ctx.strategies().sequencers.find_for(expected, actual) {
        Some(sequencer) => {
            let nested = ctx.descend()?;
            let children = sequencer.call(expected, actual, &nested)?;
            if children.is_unchanged() && ValueClass::of(expected) == ValueClass::of(actual) {
                return Ok(DiffOperation::no_change(key, expected.clone(), actual.clone()));
            }
            Ok(DiffOperation::nested_change(
                key,
                expected.clone(),
                actual.clone(),
                children,
            ))
        }
        None => Ok(DiffOperation::change(key, expected.clone(), actual.clone())),
    }
}
