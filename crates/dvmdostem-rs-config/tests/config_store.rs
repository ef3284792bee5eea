//! Public API tests for control file loading.

use dvmdostem_rs_config::{ConfigError, ConfigStore, RunConfig, RunStage};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

fn fixture() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/toolik.js"))
}

/// The example control file loads and answers dotted lookups.
#[test]
fn toolik_control_file_loads() {
    let store = ConfigStore::load(fixture()).expect("store");
    assert_eq!(store.get("stage_settings.tr_yrs").expect("tr_yrs"), json!(109));
    assert_eq!(store.get("stage_settings.sc_yrs").expect("sc_yrs"), json!(100));
    assert_eq!(store.get("IO.output_monthly").expect("output_monthly"), json!(1));
    assert_eq!(
        store.get("general.run_name").expect("run_name"),
        json!("Toolik area, 10x10 test cells")
    );

    let config = store.config();
    assert_eq!(
        config.stage_settings.as_ref().and_then(|stage| stage.run_stage.clone()),
        Some(RunStage::Equilibrium)
    );
    assert_eq!(config.io.input_files().len(), 9);
}

/// Dropping the IO section makes the load fail as a whole.
#[test]
fn control_file_without_io_fails() {
    let config = RunConfig::load_from_path(fixture()).expect("config");
    let mut value = serde_json::to_value(&config).expect("serialize");
    value.as_object_mut().expect("object").remove("IO");

    let err = RunConfig::load_from_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingSection { ref section, .. } if section == "IO"));
    assert_eq!(err.field_path(), Some("IO"));
}

/// Setting output_monthly to 2 is rejected.
#[test]
fn output_monthly_two_is_rejected() {
    let contents = std::fs::read_to_string(fixture())
        .expect("read")
        .replace("\"output_monthly\":     1", "\"output_monthly\":     2");
    let err = RunConfig::load_from_str(&contents).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnumValue { .. }));
    assert_eq!(err.field_path(), Some("IO.output_monthly"));
}
