//! IO helpers for reading control file layers from disk.

use super::{ConfigLayer, ConfigLayerSource, LoadedLayer, SchemaMode, comments, schema};
use crate::ConfigError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read, strip, parse, and partially validate a layer from disk.
pub(super) fn load_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: err,
    })?;
    let label = path.display().to_string();
    let value = parse_document(&contents, &label)?;
    schema::validate_document(&value, SchemaMode::Partial, &label)?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: Some(path.to_path_buf()),
        },
        value,
    })
}

/// Parse comment-tolerant contents into a JSON value.
pub(super) fn parse_document(contents: &str, label: &str) -> Result<Value, ConfigError> {
    let stripped = comments::strip_comments(contents, label)?;
    serde_json::from_str(&stripped).map_err(|err| {
        let message = err.to_string();
        // serde_json appends its own position; it is carried in line/column instead.
        let message = match message.split_once(" at line ") {
            Some((head, _)) => head.to_string(),
            None => message,
        };
        ConfigError::ParseError {
            source_label: label.to_string(),
            line: err.line(),
            column: err.column(),
            message,
        }
    })
}
