//! The per-rank step orchestrator.
//!
//! One [`Solver`] per rank owns that rank's decomposition, boundary policy
//! and tile pair. A step runs, strictly in order:
//!
//! ```text
//! Idle ─► Exchanging ─► BoundaryApplying ─► Stepping ─► Swapped
//!          ghost         edges of the       copy, diffuse,  roles
//!          exchange      active tile        advect          flipped
//! ```
//!
//! The exchange's wait-all completes before the boundary is applied, and
//! the next step does not start until the previous swap. There is no
//! overlap of communication with computation.

use std::fmt;
use std::time::Instant;

use tessel_comm::{exchange_halos, Communicator};
use tessel_core::{StepError, TileError};
use tessel_grid::{BoundaryConfig, Decomposition, Tile};
use tessel_stencil::{advect, apply_boundary, diffuse};
use tracing::debug;

use crate::buffer::DoubleBuffer;
use crate::metrics::{micros, RunSummary, StepMetrics};
use crate::observer::Observer;

// Compile-time assertion: a Solver can be moved onto its rank's thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Solver>();
    }
};

// ── StepPhase ──────────────────────────────────────────────────────

/// Where the solver is within a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// No step in progress.
    Idle,
    /// Ghost cells are being refreshed.
    Exchanging,
    /// Physical edges are being enforced.
    BoundaryApplying,
    /// Stencils are writing the scratch tile.
    Stepping,
    /// The step finished and scratch became active.
    Swapped,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Exchanging => "exchanging",
            Self::BoundaryApplying => "boundary",
            Self::Stepping => "stepping",
            Self::Swapped => "swapped",
        };
        f.write_str(s)
    }
}

// ── StepParams ─────────────────────────────────────────────────────

/// Physics and time step used by every step. `dt` is already clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    /// Diffusivity.
    pub d: f64,
    /// Velocity along x.
    pub vx: f64,
    /// Velocity along y.
    pub vy: f64,
    /// Time step.
    pub dt: f64,
}

// ── Solver ─────────────────────────────────────────────────────────

/// One rank's simulation state and step loop.
#[derive(Debug)]
pub struct Solver {
    decomp: Decomposition,
    bc: BoundaryConfig,
    params: StepParams,
    buffer: DoubleBuffer,
    phase: StepPhase,
    steps_done: usize,
}

impl Solver {
    /// A solver starting from `initial`, whose interior must match the
    /// decomposition's local extents.
    pub fn new(
        decomp: Decomposition,
        bc: BoundaryConfig,
        params: StepParams,
        initial: Tile,
    ) -> Result<Self, StepError> {
        let h = initial.halo();
        let expected = (decomp.nx_local() + 2 * h, decomp.ny_local() + 2 * h);
        if initial.shape() != expected {
            return Err(TileError::ShapeMismatch {
                expected,
                found: initial.shape(),
            }
            .into());
        }
        Ok(Self {
            decomp,
            bc,
            params,
            buffer: DoubleBuffer::new(initial),
            phase: StepPhase::Idle,
            steps_done: 0,
        })
    }

    /// This rank's decomposition.
    pub fn decomposition(&self) -> &Decomposition {
        &self.decomp
    }

    /// Step parameters.
    pub fn params(&self) -> StepParams {
        self.params
    }

    /// Current phase. After a failed step this is the phase that failed.
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Steps completed so far.
    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    /// The current state.
    pub fn active(&self) -> &Tile {
        self.buffer.active()
    }

    /// Advance one step.
    ///
    /// # Errors
    ///
    /// Any ghost-exchange failure, or a tile shape error from the stencils.
    /// A failed step leaves the solver unusable; the run must abort.
    pub fn step<C: Communicator + ?Sized>(&mut self, comm: &mut C) -> Result<StepMetrics, StepError> {
        let start = Instant::now();

        self.phase = StepPhase::Exchanging;
        exchange_halos(self.buffer.active_mut(), &self.decomp, comm)?;
        let exchanged = Instant::now();

        self.phase = StepPhase::BoundaryApplying;
        apply_boundary(self.buffer.active_mut(), &self.decomp, &self.bc);
        let bounded = Instant::now();

        self.phase = StepPhase::Stepping;
        let StepParams { d, vx, vy, dt } = self.params;
        self.buffer.sync_scratch()?;
        let (active, scratch) = self.buffer.split();
        diffuse(active, scratch, d, dt)?;
        advect(active, scratch, vx, vy, dt)?;
        let stepped = Instant::now();

        self.buffer.swap();
        self.phase = StepPhase::Swapped;
        self.steps_done += 1;

        Ok(StepMetrics {
            total_us: micros(stepped - start),
            exchange_us: micros(exchanged - start),
            boundary_us: micros(bounded - exchanged),
            stencil_us: micros(stepped - bounded),
        })
    }

    /// Run `steps` steps, reporting the layout once and a snapshot before
    /// every step whose number is a multiple of `out_every` (step 0
    /// included). `out_every == 0` disables snapshots.
    ///
    /// Step numbers continue from [`steps_done`](Self::steps_done), so a
    /// second call resumes the numbering.
    pub fn run<C: Communicator + ?Sized>(
        &mut self,
        comm: &mut C,
        steps: usize,
        out_every: usize,
        observer: &mut dyn Observer,
    ) -> Result<RunSummary, StepError> {
        let rank = self.decomp.rank();
        observer
            .on_layout(&self.decomp.layout(self.buffer.active().halo()))
            .map_err(StepError::Observer)?;

        let start = Instant::now();
        let mut per_step = Vec::with_capacity(steps);
        for _ in 0..steps {
            let n = self.steps_done;
            if out_every > 0 && n % out_every == 0 {
                observer
                    .on_snapshot(n, self.buffer.active(), &self.decomp)
                    .map_err(StepError::Observer)?;
            }
            let m = self.step(comm)?;
            debug!(
                rank = %rank,
                step = n,
                total_us = m.total_us,
                exchange_us = m.exchange_us,
                boundary_us = m.boundary_us,
                stencil_us = m.stencil_us,
                "step complete"
            );
            per_step.push(m);
        }
        self.phase = StepPhase::Idle;
        Ok(RunSummary::from_steps(&per_step, start.elapsed()))
    }

    /// Release the process topology. Further steps fail with
    /// [`ExchangeError::TopologyReleased`](tessel_core::ExchangeError::TopologyReleased).
    pub fn finalize(&mut self) {
        self.decomp.finalize();
    }

    /// Consume the solver, returning the final active tile.
    pub fn into_tile(self) -> Tile {
        self.buffer.into_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_comm::LocalWorld;
    use tessel_core::{ExchangeError, RankId};
    use tessel_grid::{BoundaryCondition, Periodicity};

    use tessel_test_utils::fixtures::impulse_tile;

    use crate::observer::{NoopObserver, ObserverError};

    fn single(nx: usize, ny: usize, bc: BoundaryCondition, params: StepParams) -> Solver {
        let per = BoundaryConfig::uniform(bc).periodicity();
        let d = Decomposition::init(RankId(0), 1, nx, ny, per).unwrap();
        Solver::new(d, BoundaryConfig::uniform(bc), params, Tile::new(nx, ny, 1, 1.0, 1.0)).unwrap()
    }

    fn comm() -> tessel_comm::LocalComm {
        LocalWorld::new(1).unwrap().into_endpoints().remove(0)
    }

    const DIFFUSE: StepParams = StepParams {
        d: 0.1,
        vx: 0.0,
        vy: 0.0,
        dt: 0.1,
    };

    #[test]
    fn rejects_wrong_tile_shape() {
        let d = Decomposition::init(RankId(0), 1, 4, 4, Periodicity::NONE).unwrap();
        let err = Solver::new(
            d,
            BoundaryConfig::default(),
            DIFFUSE,
            Tile::new(3, 4, 1, 1.0, 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, StepError::Tile(TileError::ShapeMismatch { .. })));
    }

    #[test]
    fn impulse_step_matches_stencil() {
        let mut s = single(3, 3, BoundaryCondition::Dirichlet(0.0), DIFFUSE);
        s.buffer = DoubleBuffer::new(impulse_tile(3, 3, (1, 1), 1.0));

        s.step(&mut comm()).unwrap();
        let a = s.active();
        assert!((a[(2, 2)] - 0.96).abs() < 1e-12);
        assert!((a[(1, 2)] - 0.01).abs() < 1e-12);
        assert!((a[(2, 3)] - 0.01).abs() < 1e-12);
        assert_eq!(s.phase(), StepPhase::Swapped);
        assert_eq!(s.steps_done(), 1);
    }

    #[test]
    fn dirichlet_edges_hold_after_step() {
        let mut s = single(4, 4, BoundaryCondition::Dirichlet(5.0), DIFFUSE);
        s.step(&mut comm()).unwrap();
        let a = s.active();
        for i in 0..6 {
            assert_eq!(a[(i, 0)], 5.0);
            assert_eq!(a[(i, 5)], 5.0);
        }
        assert!(a[(1, 1)] > 0.0);
    }

    struct Recorder {
        layouts: usize,
        steps: Vec<usize>,
    }

    impl Observer for Recorder {
        fn on_layout(&mut self, _: &tessel_grid::RankLayout) -> Result<(), ObserverError> {
            self.layouts += 1;
            Ok(())
        }

        fn on_snapshot(
            &mut self,
            step: usize,
            _: &Tile,
            _: &Decomposition,
        ) -> Result<(), ObserverError> {
            self.steps.push(step);
            Ok(())
        }
    }

    #[test]
    fn snapshots_every_out_every_from_zero() {
        let mut s = single(4, 4, BoundaryCondition::Neumann, DIFFUSE);
        let mut rec = Recorder {
            layouts: 0,
            steps: Vec::new(),
        };
        let summary = s.run(&mut comm(), 7, 3, &mut rec).unwrap();
        assert_eq!(rec.layouts, 1);
        assert_eq!(rec.steps, vec![0, 3, 6]);
        assert_eq!(summary.steps, 7);
        assert_eq!(s.phase(), StepPhase::Idle);

        s.run(&mut comm(), 3, 3, &mut rec).unwrap();
        assert_eq!(rec.steps, vec![0, 3, 6, 9]);
    }

    struct Failing;

    impl Observer for Failing {
        fn on_layout(&mut self, _: &tessel_grid::RankLayout) -> Result<(), ObserverError> {
            Ok(())
        }

        fn on_snapshot(&mut self, _: usize, _: &Tile, _: &Decomposition) -> Result<(), ObserverError> {
            Err("disk full".into())
        }
    }

    #[test]
    fn observer_failure_aborts_run() {
        let mut s = single(2, 2, BoundaryCondition::Neumann, DIFFUSE);
        let err = s.run(&mut comm(), 5, 1, &mut Failing).unwrap_err();
        assert!(matches!(&err, StepError::Observer(e) if e.to_string() == "disk full"));
        assert_eq!(s.steps_done(), 0);
    }

    #[test]
    fn finalized_solver_cannot_step() {
        let mut s = single(2, 2, BoundaryCondition::Neumann, DIFFUSE);
        s.finalize();
        let err = s.run(&mut comm(), 1, 0, &mut NoopObserver).unwrap_err();
        assert!(matches!(err, StepError::Exchange(ExchangeError::TopologyReleased)));
        assert_eq!(s.phase(), StepPhase::Exchanging);
    }
}
