//! Startup sequence shared by the binary and its tests.

use crate::Cli;
use anyhow::Context;
use dvmdostem_rs_config::{CalibrationIoSettings, ConfigStore, RunConfig};
use log::{debug, info};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything the engine needs to start a run.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub store: ConfigStore,
    /// Calibration folders with the pid tag applied, when in calibration mode.
    pub calibration_io: Option<CalibrationIoSettings>,
    /// Pre-run years.
    pub pr_yrs: u32,
    /// Equilibrium years.
    pub eq_yrs: u32,
    /// Spinup years.
    pub sp_yrs: u32,
    /// Community type forced for every cell (calibration mode only).
    pub force_cmt: Option<u32>,
    /// Keep calibration JSON for only the last N years; `None` keeps all.
    pub last_n_json: Option<NonZeroU32>,
}

impl PreparedRun {
    pub fn config(&self) -> Arc<RunConfig> {
        self.store.shared()
    }

    /// The config as the engine will see it, calibration folders included.
    pub fn effective_config(&self) -> RunConfig {
        let mut config = self.store.config().clone();
        if self.calibration_io.is_some() {
            config.calibration_io = self.calibration_io.clone();
        }
        config
    }
}

/// Verify arguments and load the layered control file.
pub fn prepare(cli: &Cli) -> anyhow::Result<PreparedRun> {
    cli.verify().context("invalid command line")?;
    let store = ConfigStore::load_with_options(cli.load_options()).with_context(|| {
        format!("failed to load control file {}", cli.ctrl_file.display())
    })?;
    for layer in store.layers() {
        debug!("config layer: {:?}", layer);
    }

    let calibration_io = if cli.cal_mode {
        store
            .config()
            .calibration_io
            .as_ref()
            .map(|folders| folders.with_pid_tag(&cli.pid_tag))
    } else {
        None
    };

    let config = store.config();
    info!(
        "run \"{}\" (run_stage={}, restart_mode={}, tr_yrs={}, sc_yrs={}, cal_mode={})",
        config.run_name().unwrap_or("<unnamed>"),
        display_or_unset(config.stage_settings.as_ref().and_then(|s| s.run_stage.as_ref())),
        display_or_unset(config.stage_settings.as_ref().and_then(|s| s.restart_mode.as_ref())),
        display_or_unset(config.tr_yrs()),
        display_or_unset(config.sc_yrs()),
        cli.cal_mode,
    );
    info!(
        "stage years (pr_yrs={}, eq_yrs={}, sp_yrs={}), force_cmt={}, last_n_json={}",
        cli.pr_yrs,
        cli.eq_yrs,
        cli.sp_yrs,
        display_or_unset(cli.forced_cmt()),
        display_or_unset(cli.last_n_json_years()),
    );
    if let Some(folders) = calibration_io.as_ref() {
        info!("calibration json folders: {:?}", folders);
    }

    Ok(PreparedRun {
        store,
        calibration_io,
        pr_yrs: cli.pr_yrs,
        eq_yrs: cli.eq_yrs,
        sp_yrs: cli.sp_yrs,
        force_cmt: cli.forced_cmt(),
        last_n_json: cli.last_n_json_years(),
    })
}

/// Input files named in the config that do not exist, relative to `base`.
pub fn missing_inputs(config: &RunConfig, base: &Path) -> Vec<(&'static str, PathBuf)> {
    config
        .io
        .input_files()
        .into_iter()
        .map(|(name, path)| (name, base.join(path)))
        .filter(|(_, path)| !path.exists())
        .collect()
}

fn display_or_unset<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "unset".to_string())
}
