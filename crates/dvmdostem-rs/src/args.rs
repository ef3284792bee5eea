//! Command-line arguments for the `dvmdostem` binary.

use anyhow::bail;
use clap::{Parser, ValueEnum};
use dvmdostem_rs_config::{DEFAULT_CTRL_FILE, LoadOptions, RestartMode, RunStage, StageSettings};
use log::{LevelFilter, warn};
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Console log verbosity, using the level names the model has always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Note,
    Warn,
    Err,
    Fatal,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info | LogLevel::Note => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Err | LogLevel::Fatal => LevelFilter::Error,
        }
    }
}

/// Command-line options for a dvmdostem run.
#[derive(Debug, Parser)]
#[command(name = "dvmdostem", version, about = "Load and check a dvmdostem run configuration")]
pub struct Cli {
    /// Control file to use
    #[arg(short = 'f', long, default_value = DEFAULT_CTRL_FILE)]
    pub ctrl_file: PathBuf,
    /// Console log verbosity
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
    /// Calibration mode: single site, yearly/monthly JSON artifacts
    #[arg(short = 'c', long)]
    pub cal_mode: bool,
    /// Tag appended to the calibration JSON folders (requires --cal-mode)
    #[arg(short = 'u', long, default_value = "")]
    pub pid_tag: String,
    /// Pause for user input at the end of each run stage (with --cal-mode)
    #[arg(long)]
    pub inter_stage_pause: bool,
    /// Number of PRE RUN years to run
    #[arg(short = 'p', long, default_value_t = 10)]
    pub pr_yrs: u32,
    /// Number of EQUILIBRIUM years to run
    #[arg(short = 'e', long, default_value_t = 1000)]
    pub eq_yrs: u32,
    /// Number of SPINUP years to run
    #[arg(short = 's', long, default_value_t = 100)]
    pub sp_yrs: u32,
    /// Number of TRANSIENT years to run
    #[arg(short = 't', long)]
    pub tr_yrs: Option<u32>,
    /// Number of SCENARIO years to run
    #[arg(short = 'n', long)]
    pub sc_yrs: Option<u32>,
    /// Run stage to start from (pr, eq, sp, tr, sc)
    #[arg(long)]
    pub run_stage: Option<String>,
    /// Restart mode passed through to the engine
    #[arg(long)]
    pub restart_mode: Option<String>,
    /// Force a community type for every cell (requires --cal-mode)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub force_cmt: i32,
    /// Only write calibration JSON for the last N years; -1 writes all years
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub last_n_json: i32,
    /// Extra control documents merged over the control file, in order
    #[arg(long = "config-override", value_name = "PATH")]
    pub config_overrides: Vec<PathBuf>,
    /// Print the effective configuration as JSON
    #[arg(long)]
    pub print_config: bool,
    /// Fail if any configured input file is missing
    #[arg(long)]
    pub check_inputs: bool,
}

impl Cli {
    /// Reject conflicting argument combinations; warn about ineffective ones.
    pub fn verify(&self) -> anyhow::Result<()> {
        if !self.pid_tag.is_empty() && !self.cal_mode {
            bail!("--pid-tag requires --cal-mode");
        }
        if self.force_cmt >= 0 && !self.cal_mode {
            bail!("--force-cmt requires --cal-mode");
        }
        if self.last_n_json == 0 || self.last_n_json < -1 {
            bail!(
                "--last-n-json must be -1 or a positive number of years, got {}",
                self.last_n_json
            );
        }
        if matches!(self.run_stage.as_deref(), Some("")) {
            bail!("--run-stage must not be empty");
        }
        if matches!(self.restart_mode.as_deref(), Some("")) {
            bail!("--restart-mode must not be empty");
        }
        if self.inter_stage_pause && !self.cal_mode {
            warn!("--inter-stage-pause is not effective without --cal-mode");
        }
        Ok(())
    }

    /// Stage settings set on the command line; unset flags stay `None`.
    pub fn stage_overrides(&self) -> StageSettings {
        StageSettings {
            restart_mode: self.restart_mode.clone().map(RestartMode::from),
            run_stage: self.run_stage.clone().map(RunStage::from),
            inter_stage_pause: self.inter_stage_pause.then_some(true),
            tr_yrs: self.tr_yrs,
            sc_yrs: self.sc_yrs,
            restartfile_dir: None,
        }
    }

    /// Community type to force for every cell; `None` when unset (-1).
    pub fn forced_cmt(&self) -> Option<u32> {
        u32::try_from(self.force_cmt).ok()
    }

    /// Number of trailing years to keep calibration JSON for; `None` keeps all.
    pub fn last_n_json_years(&self) -> Option<NonZeroU32> {
        u32::try_from(self.last_n_json).ok().and_then(NonZeroU32::new)
    }

    /// Layer options for the config loader.
    pub fn load_options(&self) -> LoadOptions {
        self.config_overrides
            .iter()
            .fold(LoadOptions::new(&self.ctrl_file), |options, path| {
                options.with_runtime_path(path)
            })
            .with_stage_overrides(self.stage_overrides())
    }
}
