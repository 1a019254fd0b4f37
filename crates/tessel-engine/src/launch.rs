//! SPMD launch: one thread per rank over a [`LocalWorld`].
//!
//! [`run_spmd`] validates the configuration, starts every rank on its own
//! named thread, and joins them. Each rank builds its decomposition, fills
//! its tile from the initial condition, runs its [`Solver`] and takes part
//! in the end-of-run reductions. Any failure on any rank fails the run:
//! the failing rank aborts the group, so peers blocked on its halos or
//! reductions stop with [`ExchangeError::Aborted`] instead of waiting out
//! the receive deadline.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread;

use tessel_comm::{AbortHandle, Communicator, LocalComm, LocalWorld};
use tessel_core::{ExchangeError, RankId, StepError, TopologyError};
use tessel_grid::{BoundaryConfig, Decomposition, Periodicity, ProcessGrid, RankLayout, Tile};
use tessel_io::{IoError, LayoutLog, SnapshotWriter};
use tracing::{debug, error, info};

use crate::config::{ConfigError, SimConfig};
use crate::init::InitialCondition;
use crate::metrics::{FieldStats, RunSummary};
use crate::observer::{FileObserver, Observer};
use crate::solver::{Solver, StepParams};

// ── RunError ───────────────────────────────────────────────────────

/// Why a run failed.
#[derive(Debug)]
pub enum RunError {
    /// The configuration is invalid.
    Config(ConfigError),
    /// Output setup or the initial-condition file failed.
    Io(IoError),
    /// A rank failed while stepping, or panicked.
    Step(StepError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Step(e) => write!(f, "{e}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Step(e) => Some(e),
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<IoError> for RunError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<StepError> for RunError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<ExchangeError> for RunError {
    fn from(e: ExchangeError) -> Self {
        Self::Step(e.into())
    }
}

impl From<TopologyError> for RunError {
    fn from(e: TopologyError) -> Self {
        Self::Step(e.into())
    }
}

impl RunError {
    /// Whether this failure was provoked by another rank's: an abort, a
    /// receive timeout, or a vanished peer.
    fn is_symptom(&self) -> bool {
        matches!(
            self,
            Self::Step(StepError::Exchange(
                ExchangeError::Aborted { .. }
                    | ExchangeError::Timeout { .. }
                    | ExchangeError::Disconnected { .. }
            ))
        )
    }
}

// ── Report ─────────────────────────────────────────────────────────

/// What one rank finished with.
#[derive(Clone, Debug)]
pub struct RankOutcome {
    /// Where the rank's block sits in the global grid.
    pub layout: RankLayout,
    /// The rank's own timings.
    pub summary: RunSummary,
    /// The final active tile.
    pub tile: Tile,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// The clamped time step used.
    pub dt: f64,
    /// Process grid the ranks were arranged in.
    pub process_grid: ProcessGrid,
    /// Per-rank outcomes in rank order.
    pub ranks: Vec<RankOutcome>,
    /// Slowest rank's total loop time.
    pub total_max_secs: f64,
    /// Worst per-rank mean step time.
    pub worst_avg_step_secs: f64,
    /// Field statistics before the first step.
    pub initial: FieldStats,
    /// Field statistics after the last step.
    pub final_stats: FieldStats,
}

impl RunReport {
    /// The final field assembled from every rank's tile, as `ny_global`
    /// rows of `nx_global` values.
    pub fn global_field(&self) -> Vec<Vec<f64>> {
        let Some(first) = self.ranks.first() else {
            return Vec::new();
        };
        let (nx, ny) = (first.layout.nx_global, first.layout.ny_global);
        let mut field = vec![vec![0.0; nx]; ny];
        for r in &self.ranks {
            let (l, h) = (&r.layout, r.tile.halo());
            for j in 0..l.ny_local {
                for i in 0..l.nx_local {
                    field[l.y_offset + j][l.x_offset + i] = r.tile[(h + i, h + j)];
                }
            }
        }
        field
    }
}

// ── Launch ─────────────────────────────────────────────────────────

struct RankSetup<'a> {
    cfg: &'a SimConfig,
    bc: BoundaryConfig,
    periodicity: Periodicity,
    ic: InitialCondition,
    params: StepParams,
}

/// Partial per-rank result carried out of the thread.
struct RankResult {
    outcome: RankOutcome,
    total_max_secs: f64,
    worst_avg_step_secs: f64,
    initial: FieldStats,
    final_stats: FieldStats,
}

/// Aborts the group when dropped while armed: on an error return and
/// while unwinding from a panic.
struct AbortOnFailure {
    rank: RankId,
    handle: AbortHandle,
    armed: bool,
}

impl AbortOnFailure {
    fn new(comm: &LocalComm) -> Self {
        Self {
            rank: comm.rank(),
            handle: comm.abort_handle(),
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnFailure {
    fn drop(&mut self) {
        if self.armed && self.handle.abort() {
            debug!(rank = %self.rank, "aborting peers");
        }
    }
}

fn rank_main<O: Observer>(
    setup: &RankSetup<'_>,
    mut comm: LocalComm,
    mut observer: O,
) -> Result<RankResult, RunError> {
    let cfg = setup.cfg;
    let rank = comm.rank();
    let decomp = Decomposition::init(
        rank,
        comm.size(),
        cfg.grid.nx,
        cfg.grid.ny,
        setup.periodicity,
    )?;
    debug!(rank = %rank, layout = %decomp, "rank layout");

    let mut tile = Tile::new(
        decomp.nx_local(),
        decomp.ny_local(),
        Tile::DEFAULT_HALO,
        cfg.grid.dx,
        cfg.grid.dy,
    );
    setup.ic.apply(&mut tile, &decomp)?;
    let initial = FieldStats::reduce(&tile, &mut comm)?;
    if rank.index() == 0 {
        info!(min = initial.min, max = initial.max, "initial condition");
    }

    let mut solver = Solver::new(decomp, setup.bc, setup.params, tile)?;
    let summary = solver.run(&mut comm, cfg.time.steps, cfg.time.out_every, &mut observer)?;

    let final_stats = FieldStats::reduce(solver.active(), &mut comm)?;
    let total_max_secs = comm.all_reduce_max(summary.total_secs)?;
    let worst_avg_step_secs = comm.all_reduce_max(summary.avg_step_secs)?;
    solver.finalize();

    let layout = solver.decomposition().layout(Tile::DEFAULT_HALO);
    Ok(RankResult {
        outcome: RankOutcome {
            layout,
            summary,
            tile: solver.into_tile(),
        },
        total_max_secs,
        worst_avg_step_secs,
        initial,
        final_stats,
    })
}

/// Run the configured simulation with `cfg.ranks` ranks, building each
/// rank's observer with `make_observer`.
///
/// # Errors
///
/// The configuration is validated first. After launch, the first failing
/// rank's error is returned, preferring a root cause over the aborts and
/// timeouts it provokes on its peers.
pub fn run_spmd<F, O>(cfg: &SimConfig, make_observer: F) -> Result<RunReport, RunError>
where
    F: Fn(RankId) -> O,
    O: Observer,
{
    cfg.validate()?;
    let bc = cfg.boundary_config()?;
    let setup = RankSetup {
        cfg,
        bc,
        periodicity: bc.periodicity(),
        ic: cfg.initial_condition()?,
        params: cfg.step_params(),
    };
    let process_grid = ProcessGrid::balanced(cfg.ranks)?;

    info!(
        nx = cfg.grid.nx,
        ny = cfg.grid.ny,
        dx = cfg.grid.dx,
        dy = cfg.grid.dy,
        dt = setup.params.dt,
        steps = cfg.time.steps,
        d = cfg.physics.d,
        vx = cfg.physics.vx,
        vy = cfg.physics.vy,
        bc = %bc,
        ranks = cfg.ranks,
        px = process_grid.px(),
        py = process_grid.py(),
        "starting run"
    );

    let mut world = LocalWorld::new(cfg.ranks)?;
    if let Some(timeout) = cfg.recv_timeout() {
        world = world.with_recv_timeout(timeout);
    }

    let results: Vec<(RankId, Result<RankResult, RunError>)> = thread::scope(|s| {
        let handles: Vec<_> = world
            .into_endpoints()
            .into_iter()
            .map(|comm| {
                let rank = comm.rank();
                let observer = make_observer(rank);
                let setup = &setup;
                let handle = thread::Builder::new()
                    .name(format!("tessel-rank-{}", rank.index()))
                    .spawn_scoped(s, move || {
                        let guard = AbortOnFailure::new(&comm);
                        let result = rank_main(setup, comm, observer);
                        if result.is_ok() {
                            guard.disarm();
                        }
                        result
                    });
                (rank, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(rank, handle)| {
                let result = match handle {
                    Ok(h) => h
                        .join()
                        .unwrap_or_else(|_| Err(StepError::RankPanicked { rank }.into())),
                    Err(e) => Err(IoError::from(e).into()),
                };
                (rank, result)
            })
            .collect()
    });

    let mut ranks = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (rank, result) in results {
        match result {
            Ok(r) => ranks.push(r),
            Err(e) => {
                error!(rank = %rank, error = %e, "rank failed");
                failures.push(e);
            }
        }
    }
    if !failures.is_empty() {
        let pos = failures.iter().position(|e| !e.is_symptom()).unwrap_or(0);
        return Err(failures.swap_remove(pos));
    }

    // Reductions leave the same values on every rank; take rank 0's.
    let Some(root) = ranks.first() else {
        return Err(TopologyError::NoProcesses.into());
    };
    let (total_max_secs, worst_avg_step_secs) = (root.total_max_secs, root.worst_avg_step_secs);
    let (initial, final_stats) = (root.initial, root.final_stats);
    let report = RunReport {
        dt: setup.params.dt,
        process_grid,
        ranks: ranks.into_iter().map(|r| r.outcome).collect(),
        total_max_secs,
        worst_avg_step_secs,
        initial,
        final_stats,
    };
    info!(
        total_max_secs = report.total_max_secs,
        worst_avg_step_secs = report.worst_avg_step_secs,
        min = report.final_stats.min,
        max = report.final_stats.max,
        mass = report.final_stats.mass,
        "run complete"
    );
    Ok(report)
}

/// [`run_spmd`] writing CSV snapshots under `<prefix>/snapshots` and the
/// layout table to `<prefix>/rank_layout.csv`.
pub fn run_to_files(cfg: &SimConfig) -> Result<RunReport, RunError> {
    cfg.validate()?;
    let snapshots = SnapshotWriter::create(cfg.snapshot_dir())?;
    let layout = Arc::new(LayoutLog::create(cfg.layout_path())?);
    run_spmd(cfg, |_| {
        FileObserver::new(snapshots.clone(), Arc::clone(&layout))
    })
}

/// Every rank's layout for `cfg`, without running anything.
pub fn plan_layout(cfg: &SimConfig) -> Result<Vec<RankLayout>, RunError> {
    cfg.validate()?;
    let all = Decomposition::all(cfg.ranks, cfg.grid.nx, cfg.grid.ny, cfg.periodicity()?)?;
    Ok(all.iter().map(|d| d.layout(Tile::DEFAULT_HALO)).collect())
}
