//! valdiff - structural value diffing for test-failure output.
//!
//! This library compares two values field by field and renders the
//! difference as indented, marker-prefixed lines. It ignores formatting and
//! does not try to minimize edits, so every facet of both values is
//! reported as added, deleted, changed or unchanged.
//!
//! # Example
//!
//! ```
//! use serde::Serialize;
//! use valdiff::{to_value, Differ};
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let expected = to_value(&Person { name: "Alice".into(), age: 30 })?;
//! let actual = to_value(&Person { name: "Alice".into(), age: 31 })?;
//!
//! let lines = Differ::new().call(&expected, &actual)?;
//! assert_eq!(lines, vec!["#<Person", "  name: \"Alice\"", "~ age: 30 => 31", ">"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod diff;
pub mod differ;
pub mod error;
pub mod formatter;
pub mod inspection;
pub mod output;
pub mod parser;
pub mod registry;
pub mod sequencer;
pub mod ser;
pub mod value;

// Re-export commonly used types for convenience
pub use diff::{DiffConfig, DiffOperation, DiffStats, OperationKind, OperationSequence, ValueClass};
pub use differ::{diff_or_inspect, inspect_pair, Differ, DifferBuilder};
pub use error::{DiffError, OutputError, ParseError, SyntaxError, ValdiffError, ValueError};
pub use formatter::DiffFormatter;
pub use inspection::{inspect, InspectionNode, InspectionTree, Line, Marker};
pub use output::{format_diff, format_fallback, OutputFormat, OutputOptions};
pub use parser::{parse_file, parse_json, parse_toml, parse_yaml, DocumentFormat};
pub use registry::{Registry, Strategies};
pub use sequencer::{DiffContext, OperationalSequencer};
pub use ser::to_value;
pub use value::{FacetKey, Object, Value};
