//! Priority-ordered strategy tables.
//!
//! A [`Registry`] holds caller-supplied extra strategies and the built-in
//! ones. Lookups walk the extras first, then the built-ins, each in
//! registration order, and return the first strategy whose `applies_to`
//! predicate holds. Built-ins are registered most specific first.
//!
//! A registry may also hold a last-resort strategy that accepts every input.
//! Top-level selection falls back to it, so the built-in tables never fail
//! with [`DiffError::NoApplicableDiffer`]. Lookups for nested sub-values skip
//! it, which keeps unequal scalars inside a collection as flat changes.

use crate::diff::OperationSequence;
use crate::error::DiffError;
use crate::formatter::{
    ArrayFormatter, DiffFormatter, HashFormatter, ObjectFormatter, ValueFormatter,
};
use crate::sequencer::{
    ArraySequencer, HashSequencer, ObjectSequencer, OperationalSequencer, ValueSequencer,
};
use crate::value::Value;
use tracing::trace;

pub struct Registry<S: ?Sized> {
    extras: Vec<Box<S>>,
    built_ins: Vec<Box<S>>,
    last_resort: Option<Box<S>>,
}

impl<S: ?Sized> Registry<S> {
    pub fn new(built_ins: Vec<Box<S>>) -> Self {
        Self {
            extras: Vec::new(),
            built_ins,
            last_resort: None,
        }
    }

    /// Sets the strategy consulted after every other one.
    pub fn with_last_resort(mut self, strategy: Box<S>) -> Self {
        self.last_resort = Some(strategy);
        self
    }

    /// Registers a strategy that is consulted before every built-in.
    ///
    /// Extras keep their registration order among themselves.
    pub fn register_extra(&mut self, strategy: Box<S>) {
        self.extras.push(strategy);
    }

    /// All strategies in lookup order, the last resort included.
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.specific().chain(self.last_resort.as_deref())
    }

    /// Extras, then built-ins.
    fn specific(&self) -> impl Iterator<Item = &S> {
        self.extras
            .iter()
            .chain(self.built_ins.iter())
            .map(|strategy| strategy.as_ref())
    }

    pub fn len(&self) -> usize {
        self.extras.len() + self.built_ins.len() + usize::from(self.last_resort.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Registry<dyn OperationalSequencer> {
    /// The built-in sequencers: hash, array, the generic object case, and
    /// whole-value comparison as the last resort.
    pub fn built_in_sequencers() -> Self {
        Self::new(vec![
            Box::new(HashSequencer),
            Box::new(ArraySequencer),
            Box::new(ObjectSequencer),
        ])
        .with_last_resort(Box::new(ValueSequencer))
    }

    /// Sequencer for a nested pair of sub-values. The last resort is not
    /// consulted.
    pub fn find_for(&self, expected: &Value, actual: &Value) -> Option<&dyn OperationalSequencer> {
        let found = self
            .specific()
            .find(|sequencer| sequencer.applies_to(expected, actual));
        if let Some(sequencer) = found {
            trace!(
                sequencer = sequencer.name(),
                expected = expected.type_name(),
                actual = actual.type_name(),
                "selected sequencer"
            );
        }
        found
    }

    /// Sequencer for a top-level pair, falling back to the last resort.
    ///
    /// # Errors
    ///
    /// [`DiffError::NoApplicableDiffer`] when nothing, the last resort
    /// included, applies.
    pub fn select(
        &self,
        expected: &Value,
        actual: &Value,
    ) -> Result<&dyn OperationalSequencer, DiffError> {
        self.find_for(expected, actual)
            .or_else(|| {
                self.last_resort
                    .as_deref()
                    .filter(|sequencer| sequencer.applies_to(expected, actual))
            })
            .ok_or_else(|| {
                DiffError::no_applicable_differ(expected.type_name(), actual.type_name())
            })
    }
}

impl Registry<dyn DiffFormatter> {
    pub fn built_in_formatters() -> Self {
        Self::new(vec![
            Box::new(HashFormatter),
            Box::new(ArrayFormatter),
            Box::new(ObjectFormatter),
        ])
        .with_last_resort(Box::new(ValueFormatter))
    }

    pub fn select(&self, sequence: &OperationSequence) -> Result<&dyn DiffFormatter, DiffError> {
        let found = self.iter().find(|formatter| formatter.applies_to(sequence));
        match found {
            Some(formatter) => {
                trace!(formatter = formatter.name(), "selected formatter");
                Ok(formatter)
            }
            None => {
                let label = format!("{:?}", sequence.value_class);
                Err(DiffError::no_applicable_differ(label.clone(), label))
            }
        }
    }
}

/// The sequencer and formatter tables used for one [`crate::Differ`].
pub struct Strategies {
    pub sequencers: Registry<dyn OperationalSequencer>,
    pub formatters: Registry<dyn DiffFormatter>,
}

impl Strategies {
    pub fn built_in() -> Self {
        Self {
            sequencers: Registry::built_in_sequencers(),
            formatters: Registry::built_in_formatters(),
        }
    }
}

impl Default for Strategies {
    fn default() -> Self {
        Self::built_in()
    }
}
