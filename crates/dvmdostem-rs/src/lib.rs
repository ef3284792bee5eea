//! Command-line front end for dvmdostem runs.
//!
//! Parses arguments, loads the layered control file, and reports the
//! effective run configuration. The simulation engine itself consumes the
//! resulting `RunConfig`.

pub mod args;
mod run;

pub use args::{Cli, LogLevel};
/// Re-export for convenience.
pub use dvmdostem_rs_config as config;
pub use run::{PreparedRun, missing_inputs, prepare};

/// Initialize console logging at the given level.
///
/// `RUST_LOG` still takes precedence when set.
pub fn init_logging(level: LogLevel) {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init();
}
