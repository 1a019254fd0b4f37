//! `tessel run`: run a simulation and write its output.

use anyhow::{Context, Result};
use clap::Args;
use tessel_engine::run_to_files;
use tracing::info;

use super::ConfigArgs;

/// Arguments of `tessel run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Run the merged configuration, writing snapshots and the layout table
/// under the output prefix.
pub fn execute(args: RunArgs) -> Result<()> {
    let cfg = args.config.load()?;
    info!(
        prefix = %cfg.output.prefix.display(),
        ranks = cfg.ranks,
        "writing output"
    );
    let report = run_to_files(&cfg).context("simulation failed")?;

    info!(
        total_max_secs = report.total_max_secs,
        worst_avg_step_ms = report.worst_avg_step_secs * 1e3,
        "timing"
    );
    println!(
        "{} steps on {} ranks ({}x{}), dt = {}",
        cfg.time.steps,
        cfg.ranks,
        report.process_grid.px(),
        report.process_grid.py(),
        report.dt
    );
    println!(
        "field min {:.6e}  max {:.6e}  mass {:.6e}",
        report.final_stats.min, report.final_stats.max, report.final_stats.mass
    );
    println!(
        "slowest rank {:.3} s, worst mean step {:.3} ms",
        report.total_max_secs,
        report.worst_avg_step_secs * 1e3
    );
    Ok(())
}
