//! `dvmdostem` entry point.

use anyhow::{Context, bail};
use clap::Parser;
use dvmdostem_rs::{Cli, init_logging, missing_inputs, prepare};
use log::{error, info};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let run = prepare(&cli)?;

    if cli.print_config {
        let rendered = serde_json::to_string_pretty(&run.effective_config())
            .context("failed to render config")?;
        println!("{rendered}");
    }

    if cli.check_inputs {
        let cwd = std::env::current_dir().context("cwd")?;
        let missing = missing_inputs(run.store.config(), &cwd);
        for (name, path) in &missing {
            error!("missing input {name}: {}", path.display());
        }
        if !missing.is_empty() {
            bail!("{} configured input file(s) not found", missing.len());
        }
        info!("all configured input files present");
    }

    Ok(())
}
