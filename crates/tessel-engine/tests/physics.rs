//! Whole-run physics checks across several ranks.

use tessel_core::RankId;
use tessel_engine::{run_spmd, InitialCondition, NoopObserver, SimConfig};
use tessel_grid::{Decomposition, Periodicity, Tile};
use tessel_test_utils::fixtures::{
    centre_of_mass, field_max, field_min, field_sum, max_abs_diff, tile_field,
};

fn config(nx: usize, ny: usize, ranks: usize) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.grid.nx = nx;
    cfg.grid.ny = ny;
    cfg.ranks = ranks;
    cfg.recv_timeout_secs = 10.0;
    cfg
}

fn initial_field(cfg: &SimConfig) -> Vec<Vec<f64>> {
    let d = Decomposition::init(RankId(0), 1, cfg.grid.nx, cfg.grid.ny, Periodicity::NONE).unwrap();
    let mut t = Tile::new(cfg.grid.nx, cfg.grid.ny, 1, cfg.grid.dx, cfg.grid.dy);
    cfg.initial_condition().unwrap().apply(&mut t, &d).unwrap();
    tile_field(&t)
}

#[test]
fn diffusion_lowers_the_peak_and_stays_non_negative() {
    let mut cfg = config(32, 24, 4);
    cfg.physics.d = 0.1;
    cfg.time.dt = 0.1;
    cfg.time.steps = 10;
    cfg.ic.sigma_frac = 0.1;

    let before = initial_field(&cfg);
    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
    assert!(report.final_stats.max < report.initial.max);
    assert!(report.final_stats.min >= 0.0);

    let after = report.global_field();
    assert_eq!(field_max(&before), report.initial.max);
    assert!(field_max(&after) < field_max(&before));
    assert_eq!(field_max(&after), report.final_stats.max);
    assert!(field_min(&after) >= 0.0);
}

#[test]
fn advection_moves_the_centre_of_mass_downstream() {
    let mut cfg = config(40, 20, 4);
    cfg.physics.vx = 1.0;
    cfg.time.dt = 1.0;
    cfg.time.steps = 5;
    cfg.ic.sigma_frac = 0.1;
    cfg.ic.xc_frac = 0.25;

    let before = initial_field(&cfg);
    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
    assert_eq!(report.dt, 1.0);
    let after = report.global_field();

    let (x0, y0) = centre_of_mass(&before, 1.0, 1.0);
    let (x1, y1) = centre_of_mass(&after, 1.0, 1.0);
    assert!((x1 - x0 - 5.0).abs() <= 1.0, "shift {}", x1 - x0);
    assert!((y1 - y0).abs() < 1e-9);

    let (m0, m1) = (field_sum(&before), field_sum(&after));
    assert!(((m1 - m0) / m0).abs() < 0.05, "mass {m0} -> {m1}");
}

#[test]
fn rank_count_does_not_change_the_answer() {
    let mut cfg = config(23, 17, 1);
    cfg.physics.d = 0.05;
    cfg.physics.vx = 0.4;
    cfg.physics.vy = -0.3;
    cfg.time.dt = 0.5;
    cfg.time.steps = 20;
    cfg.bc = serde_yaml::from_str("{ left: neumann, right: dirichlet, bottom: noflux }").unwrap();
    cfg.bc_value = 0.25;
    cfg.ic.xc_frac = 0.3;
    cfg.ic.sigma_frac = 0.15;

    let reference = run_spmd(&cfg, |_| NoopObserver).unwrap().global_field();
    for ranks in [2, 4, 6, 9] {
        cfg.ranks = ranks;
        let field = run_spmd(&cfg, |_| NoopObserver).unwrap().global_field();
        assert!(max_abs_diff(&reference, &field) < 1e-12, "{ranks} ranks");
    }
}

#[test]
fn periodic_domain_wraps_and_conserves_mass() {
    let mut cfg = config(20, 12, 4);
    cfg.bc = serde_yaml::from_str("periodic").unwrap();
    cfg.physics.vx = 1.0;
    cfg.time.dt = 1.0;
    cfg.time.steps = 20;
    cfg.ic.xc_frac = 0.8;
    cfg.ic.sigma_frac = 0.2;

    let before = initial_field(&cfg);
    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
    // One cell per step for a full domain width brings the field home.
    assert!(max_abs_diff(&before, &report.global_field()) < 1e-12);
    let m0 = report.initial.mass;
    assert!(((report.final_stats.mass - m0) / m0).abs() < 1e-12);
}

#[test]
fn periodic_run_is_independent_of_rank_count() {
    let mut cfg = config(18, 14, 1);
    cfg.bc = serde_yaml::from_str("periodic").unwrap();
    cfg.physics.d = 0.1;
    cfg.physics.vx = -0.7;
    cfg.physics.vy = 0.4;
    cfg.time.dt = 0.5;
    cfg.time.steps = 15;
    cfg.ic = serde_yaml::from_str("{ preset: gaussian_hotspot, xc_frac: 0.1, yc_frac: 0.9, sigma_frac: 0.2 }")
        .unwrap();

    let reference = run_spmd(&cfg, |_| NoopObserver).unwrap().global_field();
    for ranks in [2, 3, 4, 8] {
        cfg.ranks = ranks;
        let field = run_spmd(&cfg, |_| NoopObserver).unwrap().global_field();
        assert!(max_abs_diff(&reference, &field) < 1e-12, "{ranks} ranks");
    }
}

#[test]
fn requested_dt_above_the_bound_is_clamped() {
    let mut cfg = config(16, 16, 2);
    cfg.physics.d = 1.0;
    cfg.time.dt = 10.0;
    cfg.time.steps = 3;
    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
    assert_eq!(report.dt, 0.25);
    assert!(report.final_stats.min >= 0.0);
    assert!(report.final_stats.max <= report.initial.max);
}

#[test]
fn constant_field_with_matching_dirichlet_is_steady() {
    let mut cfg = config(10, 10, 4);
    cfg.physics.d = 0.2;
    cfg.physics.vx = 0.5;
    cfg.time.steps = 10;
    cfg.bc_value = 3.0;
    cfg.ic = serde_yaml::from_str("{ preset: constant, value: 3.0 }").unwrap();
    assert_eq!(cfg.initial_condition().unwrap(), InitialCondition::Constant(3.0));

    let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
    assert_eq!(report.final_stats.min, 3.0);
    assert_eq!(report.final_stats.max, 3.0);
}
