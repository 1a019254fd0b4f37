//! `tessel layout`: print the decomposition without running.

use anyhow::{Context, Result};
use clap::Args;
use tessel_engine::plan_layout;
use tessel_io::LAYOUT_HEADER;

use super::ConfigArgs;

/// Arguments of `tessel layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Print one CSV row per rank under the layout header.
pub fn execute(args: LayoutArgs) -> Result<()> {
    let cfg = args.config.load()?;
    let layouts = plan_layout(&cfg).context("cannot decompose grid")?;
    println!("{LAYOUT_HEADER}");
    for l in layouts {
        println!(
            "{},{},{},{},{},{},{},{}",
            l.rank, l.x_offset, l.y_offset, l.nx_local, l.ny_local, l.halo, l.nx_global, l.ny_global
        );
    }
    Ok(())
}
