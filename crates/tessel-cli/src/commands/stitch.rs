//! `tessel stitch`: reassemble one step's per-rank snapshots.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tessel_grid::RankLayout;
use tessel_io::{read_layout_csv, stitch_snapshots, write_global_csv};

/// Arguments of `tessel stitch`.
#[derive(Args, Debug)]
pub struct StitchArgs {
    /// Output directory of the run
    #[arg(short, long, default_value = "outputs")]
    pub prefix: PathBuf,

    /// Step to reassemble
    #[arg(short, long)]
    pub step: usize,

    /// Destination CSV; standard output when omitted
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// The layout log accumulates rows across runs into the same prefix.
/// Rows of the latest run are the trailing rows whose blocks add up to the
/// global grid; they are returned in rank order.
pub fn latest_layouts(rows: &[RankLayout]) -> Result<Vec<RankLayout>> {
    let Some(last) = rows.last() else {
        bail!("layout table is empty");
    };
    let area = last.nx_global * last.ny_global;
    let mut covered = 0;
    let mut latest = BTreeMap::new();
    for row in rows.iter().rev() {
        if latest.insert(row.rank, *row).is_some() {
            bail!("rank {} repeats before the grid is covered", row.rank);
        }
        covered += row.nx_local * row.ny_local;
        if covered >= area {
            break;
        }
    }
    if covered != area {
        bail!("latest run covers {covered} of {area} cells");
    }
    Ok(latest.into_values().collect())
}

fn stitch(prefix: &Path, step: usize) -> Result<Vec<Vec<f64>>> {
    let layout_path = prefix.join("rank_layout.csv");
    let rows = read_layout_csv(&layout_path)
        .with_context(|| format!("reading {}", layout_path.display()))?;
    let layouts = latest_layouts(&rows)
        .with_context(|| format!("reading {}", layout_path.display()))?;
    let field = stitch_snapshots(&layouts, step, &prefix.join("snapshots"))
        .with_context(|| format!("stitching step {step}"))?;
    Ok(field)
}

/// Write the global field for one step.
pub fn execute(args: StitchArgs) -> Result<()> {
    let field = stitch(&args.prefix, args.step)?;
    match &args.out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_global_csv(BufWriter::new(file), &field)?;
        }
        None => write_global_csv(io::stdout().lock(), &field)?,
    }
    Ok(())
}
