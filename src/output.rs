//! Output formatting for diff results.
//!
//! This module turns an operation sequence into printable text: the
//! indented diff block (optionally colored for a terminal) followed by a
//! summary, or a JSON document of the raw operations.
//!
//! # Examples
//!
//! ```
//! use valdiff::{format_diff, Differ, OutputFormat, OutputOptions, Value};
//!
//! let differ = Differ::new();
//! let old = Value::hash([("age", Value::from(30))]);
//! let new = Value::hash([("age", Value::from(31))]);
//! let sequence = differ.operations(&old, &new).unwrap();
//!
//! let output = format_diff(&differ, &sequence, OutputFormat::Plain, &OutputOptions::default()).unwrap();
//! assert!(output.contains("~ age: 30 => 31"));
//! ```

use crate::diff::{DiffStats, OperationSequence};
use crate::differ::{inspect_pair, Differ};
use crate::error::{DiffError, OutputError, ValdiffError};
use crate::inspection::{inspect, Line, Marker, RenderContext};
use crate::value::Value;
use colored::*;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Colored terminal output with ANSI escape codes
    Terminal,
    /// JSON representation of the operations
    Json,
    /// Plain text, no colors (suitable for piping)
    Plain,
}

/// Options for controlling output formatting.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Append a summary line after the diff block
    pub summary: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self { summary: true }
    }
}

/// Formats a diff according to the specified format and options.
///
/// # Errors
///
/// Fails if the sequence cannot be rendered (see [`crate::DiffError`]) or,
/// for [`OutputFormat::Json`], serialized.
pub fn format_diff(
    differ: &Differ,
    sequence: &OperationSequence,
    format: OutputFormat,
    options: &OutputOptions,
) -> Result<String, ValdiffError> {
    match format {
        OutputFormat::Json => Ok(format_json(sequence)?),
        OutputFormat::Terminal => format_text(differ, sequence, options, colorize),
        OutputFormat::Plain => format_text(differ, sequence, options, |_, text| text),
    }
}

/// Formats what is shown instead of a diff when the structural diff fails.
///
/// Text formats print both values inspected inline, or the no-changes notice
/// when they are equal under the differ's configuration. JSON carries the
/// error and the two inspections.
pub fn format_fallback(
    differ: &Differ,
    expected: &Value,
    actual: &Value,
    error: &DiffError,
    format: OutputFormat,
) -> Result<String, OutputError> {
    let equal = differ.values_equal(expected, actual);
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "error": error.to_string(),
                "equal": equal,
                "expected": inspect(expected).render_to_string(),
                "actual": inspect(actual).render_to_string(),
            });
            serde_json::to_string_pretty(&output)
                .map_err(|e| OutputError::JsonSerializationError { source: e })
        }
        OutputFormat::Terminal | OutputFormat::Plain if equal => {
            Ok("No changes detected.".to_string())
        }
        OutputFormat::Terminal | OutputFormat::Plain => {
            Ok(inspect_pair(expected, actual).join("\n"))
        }
    }
}

fn format_text(
    differ: &Differ,
    sequence: &OperationSequence,
    options: &OutputOptions,
    paint: fn(&Line, String) -> String,
) -> Result<String, ValdiffError> {
    let stats = sequence.stats();
    if stats.is_empty() {
        return Ok("No changes detected.".to_string());
    }

    let lines = differ
        .format(sequence)?
        .render_to_lines(RenderContext::root())?;

    let mut output = String::new();
    for line in &lines {
        let text = line.render(differ.config().indent_width);
        output.push_str(&paint(line, text));
        output.push('\n');
    }

    if options.summary {
        output.push('\n');
        output.push_str(&format_summary(&stats));
    }

    Ok(output)
}

/// Color scheme:
/// - Added: green
/// - Deleted: red
/// - Changed: yellow
/// - Unchanged: dimmed, except the collection headers at depth zero
fn colorize(line: &Line, text: String) -> String {
    match line.marker {
        Marker::Added => text.green().to_string(),
        Marker::Deleted => text.red().to_string(),
        Marker::Changed => text.yellow().to_string(),
        Marker::Blank if line.indent_level == 0 => text,
        Marker::Blank => text.dimmed().to_string(),
    }
}

/// Formats the operations and their statistics as pretty JSON.
fn format_json(sequence: &OperationSequence) -> Result<String, OutputError> {
    use serde_json::json;

    let output = json!({
        "diff": sequence,
        "stats": sequence.stats(),
    });

    serde_json::to_string_pretty(&output)
        .map_err(|e| OutputError::JsonSerializationError { source: e })
}

/// Formats summary statistics.
fn format_summary(stats: &DiffStats) -> String {
    if stats.is_empty() {
        return "Summary: No changes".to_string();
    }

    let mut parts = Vec::new();
    if stats.added > 0 {
        parts.push(format!("{} added", stats.added));
    }
    if stats.deleted > 0 {
        parts.push(format!("{} deleted", stats.deleted));
    }
    if stats.changed > 0 {
        parts.push(format!("{} changed", stats.changed));
    }
    if stats.unchanged > 0 {
        parts.push(format!("{} unchanged", stats.unchanged));
    }

    format!("Summary: {}", parts.join(", "))
}
