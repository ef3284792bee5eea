//! Schema validation for dvmdostem control files.

use super::SchemaMode;
use crate::ConfigError;
use crate::model::{
    CALIBRATION_IO_SECTION, GENERAL_SECTION, IO_SECTION, MODEL_SETTINGS_SECTION,
    OUTPUT_SWITCHES_SECTION, STAGE_SETTINGS_SECTION,
};
use serde_json::{Map, Value};

/// Sections that must exist in the effective config.
pub(super) const REQUIRED_SECTIONS: &[&str] = &[GENERAL_SECTION, IO_SECTION];

/// Path-valued keys of the `IO` section.
const IO_PATH_KEYS: &[&str] = &[
    "parameter_dir",
    "hist_climate_file",
    "proj_climate_file",
    "veg_class_file",
    "fire_file",
    "drainage_file",
    "soil_texture_file",
    "co2_file",
    "runmask_file",
    "output_dir",
];

const CALIBRATION_KEYS: &[&str] = &[
    "yearly-json-folder",
    "monthly-json-folder",
    "daily-json-folder",
];

const MODEL_SWITCH_KEYS: &[&str] = &[
    "dynamic_climate",
    "varied_co2",
    "dynamic_lai",
    "fire_severity_as_input",
];

const OUTPUT_SWITCH_KEYS: &[&str] = &[
    "daily_output",
    "monthly_output",
    "yearly_output",
    "summarized_output",
    "soil_climate_output",
];

/// Validate a control file document (or an override layer) against the schema.
pub(super) fn validate_document(
    value: &Value,
    mode: SchemaMode,
    source: &str,
) -> Result<(), ConfigError> {
    let map = expect_object(value, source, "")?;
    let allowed = [
        GENERAL_SECTION,
        IO_SECTION,
        CALIBRATION_IO_SECTION,
        STAGE_SETTINGS_SECTION,
        MODEL_SETTINGS_SECTION,
        OUTPUT_SWITCHES_SECTION,
    ];
    ensure_allowed_keys(map, &allowed, source, "")?;

    if matches!(mode, SchemaMode::Full) {
        for section in REQUIRED_SECTIONS {
            if !map.contains_key(*section) {
                return Err(ConfigError::MissingSection {
                    source_label: source.to_string(),
                    section: section.to_string(),
                });
            }
        }
    }

    if let Some(value) = map.get(GENERAL_SECTION) {
        validate_general(value, source, GENERAL_SECTION)?;
    }
    if let Some(value) = map.get(IO_SECTION) {
        validate_io(value, source, IO_SECTION)?;
    }
    if let Some(value) = map.get(CALIBRATION_IO_SECTION) {
        validate_calibration_io(value, source, CALIBRATION_IO_SECTION)?;
    }
    if let Some(value) = map.get(STAGE_SETTINGS_SECTION) {
        validate_stage_settings(value, source, STAGE_SETTINGS_SECTION)?;
    }
    if let Some(value) = map.get(MODEL_SETTINGS_SECTION) {
        validate_model_settings(value, source, MODEL_SETTINGS_SECTION)?;
    }
    if let Some(value) = map.get(OUTPUT_SWITCHES_SECTION) {
        validate_output_switches(value, source, OUTPUT_SWITCHES_SECTION)?;
    }

    Ok(())
}

/// Validate the "general" block.
fn validate_general(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    ensure_allowed_keys(map, &["run_name"], source, path)?;

    if let Some(value) = map.get("run_name") {
        expect_non_empty_string(value, source, &join_path(path, "run_name"))?;
    }
    Ok(())
}

/// Validate the "IO" block.
fn validate_io(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    let mut allowed = IO_PATH_KEYS.to_vec();
    allowed.push("output_monthly");
    ensure_allowed_keys(map, &allowed, source, path)?;

    for key in IO_PATH_KEYS {
        if let Some(value) = map.get(*key) {
            expect_non_empty_string(value, source, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("output_monthly") {
        expect_switch(value, source, &join_path(path, "output_monthly"))?;
    }
    Ok(())
}

/// Validate the "calibration-IO" block.
fn validate_calibration_io(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    ensure_allowed_keys(map, CALIBRATION_KEYS, source, path)?;

    for key in CALIBRATION_KEYS {
        if let Some(value) = map.get(*key) {
            expect_non_empty_string(value, source, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Validate the "stage_settings" block.
fn validate_stage_settings(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    let allowed = [
        "restart_mode",
        "run_stage",
        "inter_stage_pause",
        "tr_yrs",
        "sc_yrs",
        "restartfile_dir",
    ];
    ensure_allowed_keys(map, &allowed, source, path)?;

    // Open enumerations: only emptiness is rejected here.
    if let Some(value) = map.get("restart_mode") {
        expect_non_empty_string(value, source, &join_path(path, "restart_mode"))?;
    }
    if let Some(value) = map.get("run_stage") {
        expect_non_empty_string(value, source, &join_path(path, "run_stage"))?;
    }
    if let Some(value) = map.get("inter_stage_pause") {
        expect_bool(value, source, &join_path(path, "inter_stage_pause"))?;
    }
    if let Some(value) = map.get("tr_yrs") {
        expect_year_count(value, source, &join_path(path, "tr_yrs"))?;
    }
    if let Some(value) = map.get("sc_yrs") {
        expect_year_count(value, source, &join_path(path, "sc_yrs"))?;
    }
    if let Some(value) = map.get("restartfile_dir") {
        expect_non_empty_string(value, source, &join_path(path, "restartfile_dir"))?;
    }
    Ok(())
}

/// Validate the "model_settings" block.
fn validate_model_settings(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    let mut allowed = MODEL_SWITCH_KEYS.to_vec();
    allowed.push("output_starting_year");
    ensure_allowed_keys(map, &allowed, source, path)?;

    for key in MODEL_SWITCH_KEYS {
        if let Some(value) = map.get(*key) {
            expect_switch(value, source, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("output_starting_year") {
        expect_i64(value, source, &join_path(path, "output_starting_year"))?;
    }
    Ok(())
}

/// Validate the "output_switches" block.
fn validate_output_switches(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, source, path)?;
    ensure_allowed_keys(map, OUTPUT_SWITCH_KEYS, source, path)?;

    for key in OUTPUT_SWITCH_KEYS {
        if let Some(value) = map.get(*key) {
            expect_switch(value, source, &join_path(path, key))?;
        }
    }
    Ok(())
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    source: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(type_mismatch(source, path, "object", value)),
    }
}

/// Expect a string with at least one character.
fn expect_non_empty_string(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    match value.as_str() {
        Some("") => Err(ConfigError::EmptyValue {
            source_label: source.to_string(),
            path: path.to_string(),
        }),
        Some(_) => Ok(()),
        None => Err(type_mismatch(source, path, "string", value)),
    }
}

/// Expect a JSON boolean or return a typed error.
fn expect_bool(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(type_mismatch(source, path, "boolean", value))
    }
}

/// Expect an integer switch restricted to 0 or 1.
fn expect_switch(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    if !(value.is_u64() || value.is_i64()) {
        return Err(type_mismatch(source, path, "integer", value));
    }
    match value.as_u64() {
        Some(0 | 1) => Ok(()),
        _ => Err(ConfigError::InvalidEnumValue {
            source_label: source.to_string(),
            path: path.to_string(),
            allowed: "0, 1".to_string(),
            actual: value.to_string(),
        }),
    }
}

/// Expect a non-negative integer that fits a year count.
fn expect_year_count(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    match value.as_u64() {
        Some(years) if years <= u64::from(u32::MAX) => Ok(()),
        _ => Err(type_mismatch(source, path, "non-negative integer", value)),
    }
}

/// Expect a signed integer.
fn expect_i64(value: &Value, source: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_i64() {
        Ok(())
    } else {
        Err(type_mismatch(source, path, "integer", value))
    }
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    source: &str,
    path: &str,
) -> Result<(), ConfigError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ConfigError::UnknownKey {
                source_label: source.to_string(),
                path: join_path(path, key),
            });
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
pub(super) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Build a structured type mismatch error.
fn type_mismatch(source: &str, path: &str, expected: &str, actual: &Value) -> ConfigError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ConfigError::TypeMismatch {
        source_label: source.to_string(),
        path: normalized_path.to_string(),
        expected: expected.to_string(),
        actual: describe(actual),
    }
}

/// Short description of a JSON value for error messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => format!("boolean {flag}"),
        Value::Number(number) => format!("number {number}"),
        Value::String(text) => format!("string {text:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_mode_skips_required_sections() {
        let value = json!({ "stage_settings": { "tr_yrs": 5 } });
        validate_document(&value, SchemaMode::Partial, "override").expect("partial");
        let err = validate_document(&value, SchemaMode::Full, "effective").unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingSection { ref section, .. } if section == "general")
        );
    }

    #[test]
    fn negative_year_count_is_type_mismatch() {
        let value = json!({ "stage_settings": { "sc_yrs": -1 } });
        let err = validate_document(&value, SchemaMode::Partial, "<inline>").unwrap_err();
        match err {
            ConfigError::TypeMismatch {
                path,
                expected,
                actual,
                ..
            } => {
                assert_eq!(path, "stage_settings.sc_yrs");
                assert_eq!(expected, "non-negative integer");
                assert_eq!(actual, "number -1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn switch_rejects_boolean() {
        let value = json!({ "output_switches": { "yearly_output": true } });
        let err = validate_document(&value, SchemaMode::Partial, "<inline>").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TypeMismatch { ref path, .. } if path == "output_switches.yearly_output"
        ));
    }

    #[test]
    fn negative_switch_is_out_of_range() {
        let value = json!({ "model_settings": { "dynamic_lai": -1 } });
        let err = validate_document(&value, SchemaMode::Partial, "<inline>").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnumValue { ref actual, .. } if actual == "-1"));
    }

    #[test]
    fn root_must_be_object() {
        let err = validate_document(&json!([1, 2]), SchemaMode::Full, "<inline>").unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { ref path, .. } if path == "root"));
    }

    #[test]
    fn output_starting_year_accepts_sentinel() {
        let value = json!({ "model_settings": { "output_starting_year": -9999 } });
        validate_document(&value, SchemaMode::Partial, "<inline>").expect("valid");
    }
}
