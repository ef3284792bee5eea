//! Error types for control file loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading, validating, or querying a run config.
///
/// Load-time variants carry `source_label`, which names the document the
/// problem was found in (a file path, `<inline>`, or `command-line`).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a control file failed.
    #[error("failed to read control file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not well-formed after comment stripping.
    #[error("failed to parse {source_label} at line {line}, column {column}: {message}")]
    ParseError {
        source_label: String,
        line: usize,
        column: usize,
        message: String,
    },
    /// A required top-level section is absent.
    #[error("invalid config at {source_label}: missing required section \"{section}\"")]
    MissingSection {
        source_label: String,
        section: String,
    },
    /// A field holds a value of the wrong type.
    #[error("invalid config at {source_label}:{path}: expected {expected}, found {actual}")]
    TypeMismatch {
        source_label: String,
        path: String,
        expected: String,
        actual: String,
    },
    /// An enumerated field holds a value outside its allowed set.
    #[error("invalid config at {source_label}:{path}: {actual} is not one of {allowed}")]
    InvalidEnumValue {
        source_label: String,
        path: String,
        allowed: String,
        actual: String,
    },
    /// A string field that must carry content is empty.
    #[error("invalid config at {source_label}:{path}: value must not be empty")]
    EmptyValue { source_label: String, path: String },
    /// A key not known to the schema.
    #[error("invalid config at {source_label}:{path}: unknown key")]
    UnknownKey { source_label: String, path: String },
    /// A dotted lookup named a section or field that is not present.
    #[error("config field not found: {key}")]
    FieldNotFound { key: String },
    /// Converting validated JSON into the typed model failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
}

impl ConfigError {
    /// Dotted field path the error refers to, when it has one.
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::InvalidEnumValue { path, .. }
            | Self::EmptyValue { path, .. }
            | Self::UnknownKey { path, .. } => Some(path),
            Self::MissingSection { section, .. } => Some(section),
            Self::FieldNotFound { key } => Some(key),
            _ => None,
        }
    }
}
