//! Layered control file loader.
//!
//! Reads the control file, applies optional override layers on top of it,
//! validates the merged document, and produces an immutable `RunConfig`.

mod comments;
mod layer_io;
mod merge;
mod schema;


use crate::{
    ConfigError, RestartMode, RunConfig, RunStage, STAGE_SETTINGS_SECTION, StageSettings,
};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Control file used when none is given on the command line.
pub const DEFAULT_CTRL_FILE: &str = "config/config.js";

/// Label for documents loaded from memory.
const INLINE_LABEL: &str = "<inline>";
/// Label for the overlay built from command-line flags.
const COMMAND_LINE_LABEL: &str = "command-line";

/// Origin for a single layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// The control file named by `--ctrl-file`.
    ControlFile,
    /// Additional override documents, applied in order.
    Runtime,
    /// Values set through command-line flags (highest precedence).
    CommandLine,
}

/// Metadata about a layer that contributed to the effective config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    /// Location on disk, if the layer came from a file.
    pub path: Option<PathBuf>,
}

/// Schema validation mode.
#[derive(Debug, Clone, Copy)]
enum SchemaMode {
    /// Override layers: types and keys only.
    Partial,
    /// Effective config: required sections too.
    Full,
}

/// Options controlling which layers are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Control file path.
    pub ctrl_file: PathBuf,
    /// Override documents applied after the control file.
    pub runtime_paths: Vec<PathBuf>,
    /// Raw overlay applied after the runtime layers.
    pub overrides: Option<Value>,
    /// Stage settings from command-line flags, applied last.
    pub stage_overrides: StageSettings,
}

impl LoadOptions {
    pub fn new(ctrl_file: impl AsRef<Path>) -> Self {
        Self {
            ctrl_file: ctrl_file.as_ref().to_path_buf(),
            runtime_paths: Vec::new(),
            overrides: None,
            stage_overrides: StageSettings::default(),
        }
    }

    /// Add an override document applied after the control file.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Override `stage_settings` fields that are set in `stage`.
    pub fn with_stage_overrides(mut self, stage: StageSettings) -> Self {
        self.stage_overrides = stage;
        self
    }

    /// Merge the raw overlay and the stage overrides into one document.
    ///
    /// All-`None` stage overrides add nothing, so an absent section stays absent.
    fn command_line_overlay(&self) -> Result<Option<Value>, ConfigError> {
        let mut overlay = self.overrides.clone();
        if self.stage_overrides != StageSettings::default() {
            let mut section = Map::new();
            section.insert(
                STAGE_SETTINGS_SECTION.to_string(),
                serde_json::to_value(&self.stage_overrides)?,
            );
            let base = overlay.get_or_insert_with(|| Value::Object(Map::new()));
            merge::merge_json_values(base, &Value::Object(section));
        }
        Ok(overlay)
    }
}

/// Loaded run configuration plus the layers it was built from.
///
/// The config is behind an `Arc` so readers on other threads can hold it for
/// the whole run; nothing mutates it after load.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: Arc<RunConfig>,
    layers: Vec<ConfigLayer>,
}

impl ConfigStore {
    /// Load a single control file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_options(LoadOptions::new(path))
    }

    /// Load the control file, then apply runtime and command-line layers.
    pub fn load_with_options(options: LoadOptions) -> Result<Self, ConfigError> {
        info!("loading control file: {}", options.ctrl_file.display());
        let base = layer_io::load_layer(ConfigLayerSource::ControlFile, &options.ctrl_file)?;
        let mut layers = vec![base.meta];
        let mut merged = base.value;

        for runtime_path in &options.runtime_paths {
            let layer = layer_io::load_layer(ConfigLayerSource::Runtime, runtime_path)?;
            debug!("applying runtime layer (path={})", runtime_path.display());
            merge::merge_json_values(&mut merged, &layer.value);
            layers.push(layer.meta);
        }

        if let Some(overrides) = options.command_line_overlay()? {
            schema::validate_document(&overrides, SchemaMode::Partial, COMMAND_LINE_LABEL)?;
            debug!("applying command-line overrides: {overrides}");
            merge::merge_json_values(&mut merged, &overrides);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::CommandLine,
                path: None,
            });
        }

        let label = effective_label(&options.ctrl_file, layers.len() - 1);
        let config = config_from_value(merged, &label)?;
        info!("control file loaded (layers={})", layers.len());
        Ok(Self {
            config: Arc::new(config),
            layers,
        })
    }

    /// Load a control document held in memory (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let config = RunConfig::load_from_str(contents)?;
        Ok(Self {
            config: Arc::new(config),
            layers: Vec::new(),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// A handle to the config that can be sent to other threads.
    pub fn shared(&self) -> Arc<RunConfig> {
        Arc::clone(&self.config)
    }

    /// Layers that contributed to the config, lowest precedence first.
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    /// Look up a value by dotted path, e.g. `stage_settings.tr_yrs`.
    pub fn get(&self, key: &str) -> Result<Value, ConfigError> {
        self.config.get(key)
    }
}

impl RunConfig {
    /// Load a single control file from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading control file from path: {}", path.display());
        let layer = layer_io::load_layer(ConfigLayerSource::ControlFile, path)?;
        config_from_value(layer.value, &path.display().to_string())
    }

    /// Load a single control document from its contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!(
            "loading control document from raw contents (len={})",
            contents.len()
        );
        let value = layer_io::parse_document(contents, INLINE_LABEL)?;
        config_from_value(value, INLINE_LABEL)
    }
}

/// Internal representation of a loaded layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

/// Names the merged document after its control file, e.g. `config.js (+2 overrides)`.
fn effective_label(ctrl_file: &Path, overrides: usize) -> String {
    match overrides {
        0 => ctrl_file.display().to_string(),
        1 => format!("{} (+1 override)", ctrl_file.display()),
        n => format!("{} (+{n} overrides)", ctrl_file.display()),
    }
}

fn config_from_value(value: Value, label: &str) -> Result<RunConfig, ConfigError> {
    schema::validate_document(&value, SchemaMode::Full, label)?;
    let config: RunConfig = serde_json::from_value(value)?;
    warn_on_unknown_stage_values(&config);
    Ok(config)
}

/// Unknown restart modes and run stages are legal, but worth a note.
fn warn_on_unknown_stage_values(config: &RunConfig) {
    let Some(stage) = config.stage_settings.as_ref() else {
        return;
    };
    if let Some(RestartMode::Other(mode)) = &stage.restart_mode {
        warn!("unrecognised restart_mode \"{mode}\"; passing it through unchanged");
    }
    if let Some(RunStage::Other(run_stage)) = &stage.run_stage {
        warn!("unrecognised run_stage \"{run_stage}\"; passing it through unchanged");
    }
}
