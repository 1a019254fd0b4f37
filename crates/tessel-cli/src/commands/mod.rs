//! Subcommands.

pub mod layout;
pub mod run;
pub mod stitch;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tessel_engine::{BcSpec, EdgeBc, SimConfig};

/// Configuration file plus per-key overrides, shared by `run`, `validate`
/// and `layout`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// YAML configuration file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Global columns
    #[arg(long)]
    pub nx: Option<usize>,
    /// Global rows
    #[arg(long)]
    pub ny: Option<usize>,
    /// Cell width
    #[arg(long)]
    pub dx: Option<f64>,
    /// Cell height
    #[arg(long)]
    pub dy: Option<f64>,

    /// Diffusivity
    #[arg(long = "d", alias = "diffusivity")]
    pub d: Option<f64>,
    /// Velocity along x
    #[arg(long, allow_hyphen_values = true)]
    pub vx: Option<f64>,
    /// Velocity along y
    #[arg(long, allow_hyphen_values = true)]
    pub vy: Option<f64>,

    /// Requested time step (clamped to the stability limit)
    #[arg(long)]
    pub dt: Option<f64>,
    /// Number of steps
    #[arg(long)]
    pub steps: Option<usize>,
    /// Snapshot interval in steps
    #[arg(long)]
    pub out_every: Option<usize>,

    /// Number of ranks
    #[arg(short = 'n', long)]
    pub ranks: Option<usize>,

    /// Boundary condition for all four edges (dirichlet, neumann, periodic)
    #[arg(long)]
    pub bc: Option<String>,
    /// Boundary condition at x = 0
    #[arg(long)]
    pub bc_left: Option<String>,
    /// Boundary condition at x = Lx
    #[arg(long)]
    pub bc_right: Option<String>,
    /// Boundary condition at y = 0
    #[arg(long)]
    pub bc_bottom: Option<String>,
    /// Boundary condition at y = Ly
    #[arg(long)]
    pub bc_top: Option<String>,
    /// Value of every Dirichlet edge
    #[arg(long, allow_hyphen_values = true)]
    pub bc_value: Option<f64>,

    /// Initial-condition preset (constant_zero, constant, gaussian_hotspot)
    #[arg(long)]
    pub ic_preset: Option<String>,
    /// Global little-endian f64 initial field; overrides the preset
    #[arg(long)]
    pub ic_file: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output_prefix: Option<PathBuf>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn per_edge(bc: &BcSpec) -> EdgeBc {
    match bc {
        BcSpec::Uniform(name) => EdgeBc {
            left: Some(name.clone()),
            right: Some(name.clone()),
            bottom: Some(name.clone()),
            top: Some(name.clone()),
        },
        BcSpec::PerEdge(e) => e.clone(),
    }
}

impl ConfigArgs {
    /// Load the YAML file (if any) and apply every override given.
    /// The result is not validated.
    pub fn merged(&self) -> Result<SimConfig> {
        let mut cfg = match &self.config {
            Some(path) => SimConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimConfig::default(),
        };

        set(&mut cfg.grid.nx, self.nx);
        set(&mut cfg.grid.ny, self.ny);
        set(&mut cfg.grid.dx, self.dx);
        set(&mut cfg.grid.dy, self.dy);
        set(&mut cfg.physics.d, self.d);
        set(&mut cfg.physics.vx, self.vx);
        set(&mut cfg.physics.vy, self.vy);
        set(&mut cfg.time.dt, self.dt);
        set(&mut cfg.time.steps, self.steps);
        set(&mut cfg.time.out_every, self.out_every);
        set(&mut cfg.ranks, self.ranks);
        set(&mut cfg.bc_value, self.bc_value);

        if let Some(name) = &self.bc {
            cfg.bc = BcSpec::Uniform(name.clone());
        }
        let edges = [&self.bc_left, &self.bc_right, &self.bc_bottom, &self.bc_top];
        if edges.iter().any(|e| e.is_some()) {
            let mut e = per_edge(&cfg.bc);
            set(&mut e.left, self.bc_left.clone().map(Some));
            set(&mut e.right, self.bc_right.clone().map(Some));
            set(&mut e.bottom, self.bc_bottom.clone().map(Some));
            set(&mut e.top, self.bc_top.clone().map(Some));
            cfg.bc = BcSpec::PerEdge(e);
        }

        if let Some(preset) = &self.ic_preset {
            cfg.ic.preset = preset.clone();
            cfg.ic.file = None;
        }
        if let Some(file) = &self.ic_file {
            cfg.ic.file = Some(file.clone());
        }
        set(&mut cfg.output.prefix, self.output_prefix.clone());
        Ok(cfg)
    }

    /// [`merged`](Self::merged), then validated.
    pub fn load(&self) -> Result<SimConfig> {
        let cfg = self.merged()?;
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}
