//! Run the reference profile on four ranks and print the field summary.

use tessel_bench::reference_profile;
use tessel_engine::{run_spmd, NoopObserver};

fn main() {
    let cfg = reference_profile(4, 200);
    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();

    println!("=== Tessel hotspot run ===");
    println!(
        "grid {}x{} on {}x{} ranks, dt = {}",
        cfg.grid.nx,
        cfg.grid.ny,
        report.process_grid.px(),
        report.process_grid.py(),
        report.dt
    );
    println!(
        "max {:.6} -> {:.6}, mass {:.6} -> {:.6}",
        report.initial.max, report.final_stats.max, report.initial.mass, report.final_stats.mass
    );
    println!(
        "slowest rank {:.3}s, worst mean step {:.3}ms",
        report.total_max_secs,
        report.worst_avg_step_secs * 1e3
    );
    for r in &report.ranks {
        println!(
            "  rank {}: {}x{} at ({}, {}), {} steps",
            r.layout.rank,
            r.layout.nx_local,
            r.layout.ny_local,
            r.layout.x_offset,
            r.layout.y_offset,
            r.summary.steps
        );
    }
}
