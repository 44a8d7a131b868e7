//! Custom error types for valdiff.

use crate::parser::DocumentFormat;
use std::fmt::Display;
use std::path::PathBuf;

/// Failures of a single diff/render cycle.
///
/// All of these abort the structural diff; callers are expected to fall back
/// to plain inspection of both values (see [`crate::diff_or_inspect`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("No differ applies to {expected} vs {actual}")]
    NoApplicableDiffer { expected: String, actual: String },

    #[error("Maximum diff depth of {limit} exceeded")]
    MaxDepthExceeded { limit: usize },

    #[error("Malformed inspection tree: {message}")]
    MalformedNodeTree { message: String },
}

impl DiffError {
    pub fn no_applicable_differ(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::NoApplicableDiffer {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn max_depth_exceeded(limit: usize) -> Self {
        Self::MaxDepthExceeded { limit }
    }

    pub fn malformed_node_tree(message: impl Into<String>) -> Self {
        Self::MalformedNodeTree {
            message: message.into(),
        }
    }
}

/// Errors raised while converting a `Serialize` type into a [`crate::Value`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("Map key must be a string, number, boolean or unit variant, got {found}")]
    KeyMustBeScalar { found: String },

    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for ValueError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Why a document could not be loaded into a [`crate::Value`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File not found: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {format} in {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        format: DocumentFormat,
        #[source]
        source: SyntaxError,
    },

    #[error("{} is not valid JSON, YAML or TOML", .path.display())]
    Unrecognized { path: PathBuf },
}

/// The deserializer failure behind [`ParseError::Syntax`].
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ValdiffError {
    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Output(#[from] OutputError),
}
