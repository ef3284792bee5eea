//! Control file schema for dvmdostem runs.
//!
//! Sections `general` and `IO` are required. Every other section is an
//! `Option` so that "section absent" stays distinguishable from "section
//! present but empty". Fields inside a section are optional too; the loader
//! only checks the ones that are present.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Name of the section holding the run label.
pub const GENERAL_SECTION: &str = "general";
/// Name of the section holding input datasets and output locations.
pub const IO_SECTION: &str = "IO";
/// Name of the section holding calibration artifact folders.
pub const CALIBRATION_IO_SECTION: &str = "calibration-IO";
/// Name of the section holding run stage options.
pub const STAGE_SETTINGS_SECTION: &str = "stage_settings";
/// Name of the section holding process model switches.
pub const MODEL_SETTINGS_SECTION: &str = "model_settings";
/// Name of the section holding output frequency switches.
pub const OUTPUT_SWITCHES_SECTION: &str = "output_switches";

/// Root of a validated control file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub general: GeneralSettings,
    #[serde(rename = "IO")]
    pub io: IoSettings,
    #[serde(
        rename = "calibration-IO",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub calibration_io: Option<CalibrationIoSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_settings: Option<StageSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_settings: Option<ModelSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_switches: Option<OutputSwitches>,
}

impl RunConfig {
    /// Human readable label for the run, if one was given.
    pub fn run_name(&self) -> Option<&str> {
        self.general.run_name.as_deref()
    }

    /// Transient stage length in years, if configured.
    pub fn tr_yrs(&self) -> Option<u32> {
        self.stage_settings.as_ref().and_then(|stage| stage.tr_yrs)
    }

    /// Scenario stage length in years, if configured.
    pub fn sc_yrs(&self) -> Option<u32> {
        self.stage_settings.as_ref().and_then(|stage| stage.sc_yrs)
    }

    /// Whether monthly output was requested. `None` when the switch is unset.
    pub fn output_monthly(&self) -> Option<bool> {
        self.io.output_monthly.map(Switch::is_on)
    }
}

/// The `general` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,
}

/// The `IO` section: where the engine reads inputs and writes outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hist_climate_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proj_climate_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veg_class_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drainage_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_texture_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runmask_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_monthly: Option<Switch>,
}

impl IoSettings {
    /// Configured input locations paired with their field names.
    ///
    /// `output_dir` is not an input and is left out.
    pub fn input_files(&self) -> Vec<(&'static str, &Path)> {
        [
            ("parameter_dir", &self.parameter_dir),
            ("hist_climate_file", &self.hist_climate_file),
            ("proj_climate_file", &self.proj_climate_file),
            ("veg_class_file", &self.veg_class_file),
            ("fire_file", &self.fire_file),
            ("drainage_file", &self.drainage_file),
            ("soil_texture_file", &self.soil_texture_file),
            ("co2_file", &self.co2_file),
            ("runmask_file", &self.runmask_file),
        ]
        .into_iter()
        .filter_map(|(name, path)| path.as_deref().map(|path| (name, path)))
        .collect()
    }
}

/// The `calibration-IO` section, read by the calibration viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationIoSettings {
    #[serde(
        rename = "yearly-json-folder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub yearly_json_folder: Option<PathBuf>,
    #[serde(
        rename = "monthly-json-folder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub monthly_json_folder: Option<PathBuf>,
    #[serde(
        rename = "daily-json-folder",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub daily_json_folder: Option<PathBuf>,
}

impl CalibrationIoSettings {
    /// Copy of these folders with `-<tag>` appended to each final component.
    ///
    /// Lets concurrent calibration runs keep their JSON artifacts apart.
    pub fn with_pid_tag(&self, tag: &str) -> Self {
        if tag.is_empty() {
            return self.clone();
        }
        let tagged = |folder: &Option<PathBuf>| {
            folder.as_deref().map(|path| tag_path(path, tag))
        };
        Self {
            yearly_json_folder: tagged(&self.yearly_json_folder),
            monthly_json_folder: tagged(&self.monthly_json_folder),
            daily_json_folder: tagged(&self.daily_json_folder),
        }
    }
}

fn tag_path(path: &Path, tag: &str) -> PathBuf {
    // Trailing separators are dropped by `components`, so "a/b/" tags as "a/b-tag".
    let mut components: Vec<Component<'_>> = path.components().collect();
    match components.pop() {
        Some(Component::Normal(last)) => {
            let mut name = last.to_os_string();
            name.push("-");
            name.push(tag);
            let mut tagged: PathBuf = components.iter().collect();
            tagged.push(name);
            tagged
        }
        _ => path.join(tag),
    }
}

/// The `stage_settings` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_mode: Option<RestartMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_stage: Option<RunStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter_stage_pause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tr_yrs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sc_yrs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restartfile_dir: Option<PathBuf>,
}

/// The `model_settings` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_climate: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub varied_co2: Option<Switch>,
    /// LAI from the model (1) or from input (0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_lai: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_severity_as_input: Option<Switch>,
    /// First year written to output; -9999 means "from the start".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_starting_year: Option<i64>,
}

/// The `output_switches` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSwitches {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_output: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_output: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_output: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_output: Option<Switch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_climate_output: Option<Switch>,
}

/// A boolean stored as the integer 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u8")]
pub struct Switch(bool);

impl Switch {
    pub const ON: Switch = Switch(true);
    pub const OFF: Switch = Switch(false);

    pub fn is_on(self) -> bool {
        self.0
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        Switch(value)
    }
}

impl TryFrom<u64> for Switch {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Switch::OFF),
            1 => Ok(Switch::ON),
            other => Err(format!("switch value must be 0 or 1, got {other}")),
        }
    }
}

impl From<Switch> for u8 {
    fn from(value: Switch) -> Self {
        u8::from(value.0)
    }
}

/// Restart policy for a run.
///
/// Only `restart` is known; any other non-empty string is kept verbatim for
/// the engine to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RestartMode {
    Restart,
    Other(String),
}

impl RestartMode {
    pub fn as_str(&self) -> &str {
        match self {
            RestartMode::Restart => "restart",
            RestartMode::Other(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RestartMode::Other(_))
    }
}

impl From<String> for RestartMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "restart" => RestartMode::Restart,
            _ => RestartMode::Other(value),
        }
    }
}

impl From<RestartMode> for String {
    fn from(value: RestartMode) -> Self {
        match value {
            RestartMode::Restart => "restart".to_string(),
            RestartMode::Other(value) => value,
        }
    }
}

impl fmt::Display for RestartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simulation phase a run starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStage {
    PreRun,
    Equilibrium,
    Spinup,
    Transient,
    Scenario,
    Other(String),
}

impl RunStage {
    /// Two letter code used in control files and archive prefixes.
    pub fn code(&self) -> &str {
        match self {
            RunStage::PreRun => "pr",
            RunStage::Equilibrium => "eq",
            RunStage::Spinup => "sp",
            RunStage::Transient => "tr",
            RunStage::Scenario => "sc",
            RunStage::Other(value) => value,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RunStage::Other(_))
    }
}

impl From<String> for RunStage {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pr" => RunStage::PreRun,
            "eq" => RunStage::Equilibrium,
            "sp" => RunStage::Spinup,
            "tr" => RunStage::Transient,
            "sc" => RunStage::Scenario,
            _ => RunStage::Other(value),
        }
    }
}

impl From<RunStage> for String {
    fn from(value: RunStage) -> Self {
        match value {
            RunStage::Other(value) => value,
            known => known.code().to_string(),
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn run_stage_keeps_unknown_literal() {
        assert_eq!(RunStage::from("eq".to_string()), RunStage::Equilibrium);
        let other = RunStage::from("eq-sp".to_string());
        assert_eq!(other.code(), "eq-sp");
        assert!(!other.is_known());
        assert_eq!(String::from(other), "eq-sp");
    }

    #[test]
    fn switch_rejects_values_above_one() {
        assert_eq!(Switch::try_from(1_u64).map(Switch::is_on), Ok(true));
        assert!(Switch::try_from(2_u64).is_err());
    }

    #[test]
    fn pid_tag_appends_to_last_component() {
        let folders = CalibrationIoSettings {
            yearly_json_folder: Some(PathBuf::from("/tmp/dvmdostem/calibration/yearly")),
            monthly_json_folder: Some(PathBuf::from("/tmp/dvmdostem/calibration/monthly/")),
            daily_json_folder: None,
        };
        let tagged = folders.with_pid_tag("4242");
        assert_eq!(
            tagged.yearly_json_folder,
            Some(PathBuf::from("/tmp/dvmdostem/calibration/yearly-4242"))
        );
        assert_eq!(
            tagged.monthly_json_folder,
            Some(PathBuf::from("/tmp/dvmdostem/calibration/monthly-4242"))
        );
        assert_eq!(tagged.daily_json_folder, None);
        assert_eq!(folders.with_pid_tag(""), folders);
    }

    #[test]
    fn input_files_skips_unset_and_output_dir() {
        let io = IoSettings {
            co2_file: Some(PathBuf::from("co2.nc")),
            output_dir: Some(PathBuf::from("out/")),
            ..IoSettings::default()
        };
        assert_eq!(io.input_files(), vec![("co2_file", Path::new("co2.nc"))]);
    }
}
