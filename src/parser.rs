//! File parsing for JSON, YAML and TOML documents.
//!
//! Documents are loaded into the [`Value`] model so that two data files can
//! be diffed like any other pair of values. Mappings become hashes that keep
//! the document's key order. The format is detected by file extension, and
//! unknown extensions fall back to trying JSON, then YAML, then TOML.
//!
//! # Examples
//!
//! ```no_run
//! use valdiff::parser::parse_file;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let value = parse_file(Path::new("config.yaml"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::{ParseError, SyntaxError};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A supported document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Order in which formats are tried for unknown extensions.
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Json,
        DocumentFormat::Yaml,
        DocumentFormat::Toml,
    ];

    /// Format implied by the file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    pub fn parse(self, content: &str) -> Result<Value, SyntaxError> {
        Ok(match self {
            DocumentFormat::Json => parse_json(content)?,
            DocumentFormat::Yaml => parse_yaml(content)?,
            DocumentFormat::Toml => parse_toml(content)?,
        })
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Yaml => "YAML",
            DocumentFormat::Toml => "TOML",
        })
    }
}

/// Parses a file into a [`Value`].
///
/// Files without a recognized extension are tried as each of
/// [`DocumentFormat::ALL`] in turn.
///
/// # Errors
///
/// [`ParseError::Missing`] or [`ParseError::Unreadable`] when the file cannot
/// be read, [`ParseError::Syntax`] when it is malformed for its extension,
/// and [`ParseError::Unrecognized`] when no format accepts it.
pub fn parse_file(path: &Path) -> Result<Value, ParseError> {
    if !path.exists() {
        return Err(ParseError::Missing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let format = DocumentFormat::from_path(path);
    debug!(path = %path.display(), format = ?format, "parsing file");

    match format {
        Some(format) => format
            .parse(&content)
            .map_err(|source| ParseError::Syntax {
                path: path.to_path_buf(),
                format,
                source,
            }),
        None => DocumentFormat::ALL
            .iter()
            .find_map(|format| format.parse(&content).ok())
            .ok_or_else(|| ParseError::Unrecognized {
                path: path.to_path_buf(),
            }),
    }
}

/// Parses a JSON string into a [`Value`].
///
/// # Examples
///
/// ```
/// use valdiff::parser::parse_json;
/// use valdiff::Value;
///
/// let value = parse_json(r#"{"name": "Alice", "age": 30}"#).unwrap();
/// assert_eq!(value, Value::hash([("name", Value::from("Alice")), ("age", Value::from(30))]));
/// ```
pub fn parse_json(content: &str) -> Result<Value, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(json_to_value(value))
}

/// Parses a YAML string into a [`Value`].
pub fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_value(value))
}

/// Parses a TOML document into a [`Value`].
pub fn parse_toml(content: &str) -> Result<Value, toml::de::Error> {
    let table: toml::Table = toml::from_str(content)?;
    Ok(toml_to_value(toml::Value::Table(table)))
}

fn json_to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(obj) => Value::Hash(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

/// Converts YAML, evaluating tags and stringifying non-string keys.
fn yaml_to_value(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Float(f64::NAN)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_value).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let entries: IndexMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| {
                    let key = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Null => "null".to_string(),
                        other => format!("{:?}", other),
                    };
                    (key, yaml_to_value(v))
                })
                .collect();
            Value::Hash(entries)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(tagged.value),
    }
}

/// Converts TOML; datetimes become their string form.
fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_value).collect()),
        toml::Value::Table(table) => Value::Hash(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_value(v)))
                .collect(),
        ),
    }
}
