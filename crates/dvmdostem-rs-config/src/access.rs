//! Dotted-path lookups into a loaded run config.

use crate::{ConfigError, RunConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;

impl RunConfig {
    /// Look up a value by dotted path, e.g. `stage_settings.tr_yrs` or
    /// `calibration-IO.yearly-json-folder`.
    ///
    /// Returns `FieldNotFound` when the section or field is absent.
    pub fn get(&self, key: &str) -> Result<Value, ConfigError> {
        let segments: Vec<&str> = key.split('.').collect();
        self.get_path(&segments)
    }

    /// Look up a value by pre-split path segments.
    pub fn get_path(&self, segments: &[&str]) -> Result<Value, ConfigError> {
        let root = serde_json::to_value(self)?;
        let mut current = &root;
        for segment in segments {
            current = current
                .get(*segment)
                .ok_or_else(|| ConfigError::FieldNotFound {
                    key: segments.join("."),
                })?;
        }
        Ok(current.clone())
    }

    /// Look up a value by dotted path and decode it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.get(key)?;
        Ok(serde_json::from_value(value)?)
    }
}
