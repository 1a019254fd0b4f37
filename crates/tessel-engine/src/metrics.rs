//! Per-step timings and the end-of-run summary.

use std::time::Duration;

use tessel_comm::Communicator;
use tessel_core::ExchangeError;
use tessel_grid::Tile;

/// Wall time of each phase of one step, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Whole step, in microseconds.
    pub total_us: u64,
    /// Ghost exchange, including the wait-all.
    pub exchange_us: u64,
    /// Boundary enforcement.
    pub boundary_us: u64,
    /// Scratch copy plus diffusion and advection sweeps.
    pub stencil_us: u64,
}

pub(crate) fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// One rank's timing over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Steps executed.
    pub steps: usize,
    /// Wall time of the stepping loop, including snapshots.
    pub total_secs: f64,
    /// Mean step time.
    pub avg_step_secs: f64,
    /// Fastest step.
    pub min_step_secs: f64,
    /// Slowest step.
    pub max_step_secs: f64,
}

impl RunSummary {
    /// Summarise `per_step` timings taken inside a loop lasting `total`.
    pub fn from_steps(per_step: &[StepMetrics], total: Duration) -> Self {
        if per_step.is_empty() {
            return Self {
                total_secs: total.as_secs_f64(),
                ..Self::default()
            };
        }
        let secs = |m: &StepMetrics| m.total_us as f64 * 1e-6;
        let (min, max, sum) = per_step.iter().map(secs).fold(
            (f64::INFINITY, 0.0_f64, 0.0),
            |(lo, hi, sum), s| (lo.min(s), hi.max(s), sum + s),
        );
        Self {
            steps: per_step.len(),
            total_secs: total.as_secs_f64(),
            avg_step_secs: sum / per_step.len() as f64,
            min_step_secs: min,
            max_step_secs: max,
        }
    }
}

/// Global minimum, maximum and mass (`Σ u · dx · dy`) of the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    /// Smallest interior value on any rank.
    pub min: f64,
    /// Largest interior value on any rank.
    pub max: f64,
    /// Integral of the field over the domain.
    pub mass: f64,
}

impl FieldStats {
    /// Statistics of one tile alone.
    pub fn local(tile: &Tile) -> Self {
        let (min, max) = tile
            .interior_min_max()
            .unwrap_or((f64::INFINITY, f64::NEG_INFINITY));
        Self {
            min,
            max,
            mass: tile.interior_sum() * tile.dx() * tile.dy(),
        }
    }

    /// Combine every rank's tile. Collective: all ranks must call it.
    pub fn reduce<C: Communicator + ?Sized>(tile: &Tile, comm: &mut C) -> Result<Self, ExchangeError> {
        let local = Self::local(tile);
        Ok(Self {
            min: -comm.all_reduce_max(-local.min)?,
            max: comm.all_reduce_max(local.max)?,
            mass: comm.all_reduce_sum(local.mass)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(us: u64) -> StepMetrics {
        StepMetrics {
            total_us: us,
            ..StepMetrics::default()
        }
    }

    #[test]
    fn summary_of_steps() {
        let s = RunSummary::from_steps(&[step(100), step(300), step(200)], Duration::from_millis(1));
        assert_eq!(s.steps, 3);
        assert_eq!(s.total_secs, 0.001);
        assert!((s.avg_step_secs - 200e-6).abs() < 1e-12);
        assert!((s.min_step_secs - 100e-6).abs() < 1e-12);
        assert!((s.max_step_secs - 300e-6).abs() < 1e-12);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = RunSummary::from_steps(&[], Duration::ZERO);
        assert_eq!(s, RunSummary::default());
    }

    #[test]
    fn local_stats_scale_mass_by_cell_area() {
        let mut t = Tile::new(2, 2, 1, 0.5, 2.0);
        t.fill(-7.0);
        t.fill_interior(1.0);
        t[(1, 1)] = 3.0;
        let s = FieldStats::local(&t);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.mass, 6.0);
    }

    #[test]
    fn micros_saturates() {
        assert_eq!(micros(Duration::from_micros(42)), 42);
        assert_eq!(micros(Duration::MAX), u64::MAX);
    }
}
