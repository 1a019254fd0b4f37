//! `tessel validate`: load and check a configuration without running it.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use super::ConfigArgs;

/// Arguments of `tessel validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Validate, then print the resolved parameters.
pub fn execute(args: ValidateArgs) -> Result<()> {
    let cfg = args.config.load()?;
    let limit = cfg.stability_limit();
    let dt = cfg.effective_dt();
    if dt < cfg.time.dt {
        warn!(requested = cfg.time.dt, used = dt, "dt will be clamped");
    }

    println!("configuration ok");
    println!("  grid       {} x {} (dx {}, dy {})", cfg.grid.nx, cfg.grid.ny, cfg.grid.dx, cfg.grid.dy);
    println!("  physics    D {}, v ({}, {})", cfg.physics.d, cfg.physics.vx, cfg.physics.vy);
    println!("  boundary   {}", cfg.boundary_config()?);
    println!("  initial    {:?}", cfg.initial_condition()?);
    println!(
        "  time       {} steps, dt {} (advective limit {}, diffusive limit {})",
        cfg.time.steps, dt, limit.advective, limit.diffusive
    );
    println!("  ranks      {}", cfg.ranks);
    println!("  output     {} every {} steps", cfg.output.prefix.display(), cfg.time.out_every);
    Ok(())
}
