//! The top-level differ.
//!
//! [`Differ`] is the composition root: it owns the strategy tables and the
//! configuration, and runs the pipeline
//! `sequencer → operations → formatter → inspection tree → lines`.
//!
//! # Examples
//!
//! ```
//! use valdiff::{Differ, Value};
//!
//! let expected = Value::object("A", [("name", Value::from("x")), ("age", Value::from(1))]);
//! let actual = Value::object("B", [("name", Value::from("y")), ("age", Value::from(1))]);
//!
//! let lines = Differ::new().call(&expected, &actual).unwrap();
//! assert_eq!(lines, vec!["#<B", "~ name: \"x\" => \"y\"", "  age: 1", ">"]);
//! ```

use crate::diff::{values_equal, DiffConfig, OperationSequence};
use crate::error::DiffError;
use crate::formatter::DiffFormatter;
use crate::inspection::{inspect, InspectionTree, Line, RenderContext};
use crate::registry::Strategies;
use crate::sequencer::{DiffContext, OperationalSequencer};
use crate::value::Value;
use tracing::{debug, warn};

pub struct Differ {
    strategies: Strategies,
    config: DiffConfig,
}

impl Differ {
    /// A differ with the built-in strategies and default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DifferBuilder {
        DifferBuilder::default()
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    /// Computes the operation sequence for `expected` → `actual`.
    ///
    /// # Errors
    ///
    /// [`DiffError::MaxDepthExceeded`] if the values nest too deeply. An extra
    /// sequencer may fail with any [`DiffError`] of its own.
    pub fn operations(
        &self,
        expected: &Value,
        actual: &Value,
    ) -> Result<OperationSequence, DiffError> {
        let ctx = DiffContext::new(&self.strategies, &self.config);
        let sequencer = self.strategies.sequencers.select(expected, actual)?;
        debug!(
            sequencer = sequencer.name(),
            expected = expected.type_name(),
            actual = actual.type_name(),
            "computing diff"
        );
        let sequence = sequencer.call(expected, actual, &ctx)?;
        let stats = sequence.stats();
        debug!(
            added = stats.added,
            deleted = stats.deleted,
            changed = stats.changed,
            unchanged = stats.unchanged,
            "diff computed"
        );
        Ok(sequence)
    }

    /// Equality of two values under this differ's configuration.
    pub fn values_equal(&self, expected: &Value, actual: &Value) -> bool {
        values_equal(expected, actual, &self.config)
    }

    /// Formats an operation sequence into its display tree.
    pub fn format(&self, sequence: &OperationSequence) -> Result<InspectionTree, DiffError> {
        let formatters = &self.strategies.formatters;
        formatters.select(sequence)?.call(sequence, formatters)
    }

    /// Diffs and renders to un-indented [`Line`]s, starting at `indent_level`.
    pub fn lines(
        &self,
        expected: &Value,
        actual: &Value,
        indent_level: usize,
    ) -> Result<Vec<Line>, DiffError> {
        let sequence = self.operations(expected, actual)?;
        self.format(&sequence)?
            .render_to_lines(RenderContext::at(indent_level))
    }

    /// Diffs and renders to ready-to-print strings.
    pub fn call(&self, expected: &Value, actual: &Value) -> Result<Vec<String>, DiffError> {
        self.call_at(expected, actual, 0)
    }

    pub fn call_at(
        &self,
        expected: &Value,
        actual: &Value,
        indent_level: usize,
    ) -> Result<Vec<String>, DiffError> {
        let lines = self.lines(expected, actual, indent_level)?;
        Ok(lines
            .iter()
            .map(|line| line.render(self.config.indent_width))
            .collect())
    }

    /// Like [`Differ::call`], falling back to inspecting both values when
    /// the structural diff fails.
    pub fn diff_or_inspect(&self, expected: &Value, actual: &Value) -> Vec<String> {
        match self.call(expected, actual) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(error = %err, "structural diff failed, inspecting values instead");
                inspect_pair(expected, actual)
            }
        }
    }
}

impl Default for Differ {
    fn default() -> Self {
        Self::new()
    }
}

/// Diffs with a default [`Differ`], falling back to plain inspection.
pub fn diff_or_inspect(expected: &Value, actual: &Value) -> Vec<String> {
    Differ::new().diff_or_inspect(expected, actual)
}

/// Both values inspected inline, one per line.
pub fn inspect_pair(expected: &Value, actual: &Value) -> Vec<String> {
    vec![
        format!("Expected: {}", inspect(expected).render_to_string()),
        format!("  Actual: {}", inspect(actual).render_to_string()),
    ]
}

/// Assembles a [`Differ`] from extra strategies and configuration.
///
/// Extra strategies are consulted before the built-ins, in the order they
/// were added.
#[derive(Default)]
pub struct DifferBuilder {
    extra_sequencers: Vec<Box<dyn OperationalSequencer>>,
    extra_formatters: Vec<Box<dyn DiffFormatter>>,
    config: DiffConfig,
}

impl DifferBuilder {
    pub fn sequencer(mut self, sequencer: impl OperationalSequencer + 'static) -> Self {
        self.extra_sequencers.push(Box::new(sequencer));
        self
    }

    pub fn formatter(mut self, formatter: impl DiffFormatter + 'static) -> Self {
        self.extra_formatters.push(Box::new(formatter));
        self
    }

    pub fn config(mut self, config: DiffConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Differ {
        let mut strategies = Strategies::built_in();
        for sequencer in self.extra_sequencers {
            strategies.sequencers.register_extra(sequencer);
        }
        for formatter in self.extra_formatters {
            strategies.formatters.register_extra(formatter);
        }
        Differ {
            strategies,
            config: self.config,
        }
    }
}
