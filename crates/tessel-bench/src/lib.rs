//! Benchmark profiles for the Tessel solver.
//!
//! - [`reference_profile`]: 256x256 advection-diffusion run, Dirichlet edges
//! - [`periodic_profile`]: the same grid on a fully periodic domain
//! - [`stress_profile`]: 1024x1024 for scaling runs

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessel_engine::{BcSpec, SimConfig};

/// 256x256 cells, D=0.1, v=(1.0, 0.5), dt=0.1 (well inside both limits),
/// hotspot in the lower-left quadrant. Snapshots disabled.
pub fn reference_profile(ranks: usize, steps: usize) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.grid.nx = 256;
    cfg.grid.ny = 256;
    cfg.physics.d = 0.1;
    cfg.physics.vx = 1.0;
    cfg.physics.vy = 0.5;
    cfg.time.dt = 0.1;
    cfg.time.steps = steps;
    cfg.time.out_every = steps + 1;
    cfg.ic.xc_frac = 0.3;
    cfg.ic.yc_frac = 0.3;
    cfg.ranks = ranks;
    cfg
}

/// [`reference_profile`] with every edge periodic.
pub fn periodic_profile(ranks: usize, steps: usize) -> SimConfig {
    SimConfig {
        bc: BcSpec::Uniform("periodic".to_string()),
        ..reference_profile(ranks, steps)
    }
}

/// 1024x1024 cells (~1M), otherwise as [`reference_profile`].
pub fn stress_profile(ranks: usize, steps: usize) -> SimConfig {
    let mut cfg = reference_profile(ranks, steps);
    cfg.grid.nx = 1024;
    cfg.grid.ny = 1024;
    cfg
}
