//! Time-step bound for the explicit upwind / 5-point scheme.

/// The two limits whose minimum bounds the stable time step.
///
/// Either limit is `f64::INFINITY` when its term vanishes (no velocity, or
/// no diffusivity).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityLimit {
    /// `1 / (|vx|/dx + |vy|/dy)`.
    pub advective: f64,
    /// `1 / (2 D (1/dx^2 + 1/dy^2))`.
    pub diffusive: f64,
}

impl StabilityLimit {
    /// Evaluate both limits.
    pub fn new(dx: f64, dy: f64, vx: f64, vy: f64, d: f64) -> Self {
        let rate = vx.abs() / dx + vy.abs() / dy;
        let advective = if rate > 0.0 { 1.0 / rate } else { f64::INFINITY };
        let diffusive = if d > 0.0 {
            1.0 / (2.0 * d * (1.0 / (dx * dx) + 1.0 / (dy * dy)))
        } else {
            f64::INFINITY
        };
        Self {
            advective,
            diffusive,
        }
    }

    /// The binding limit.
    pub fn dt(&self) -> f64 {
        self.advective.min(self.diffusive)
    }

    /// Whether neither physics term constrains the step.
    pub fn is_unbounded(&self) -> bool {
        self.dt().is_infinite()
    }
}

/// Largest stable time step for cell spacing `(dx, dy)`, velocity
/// `(vx, vy)` and diffusivity `d`.
///
/// Returns `f64::INFINITY` when both velocity and diffusivity are zero.
///
/// # Examples
///
/// ```
/// use tessel_stencil::stable_dt;
///
/// // Diffusion-limited: 1 / (2 * 0.1 * 2) = 2.5
/// assert!((stable_dt(1.0, 1.0, 0.0, 0.0, 0.1) - 2.5).abs() < 1e-12);
/// // Advection-limited: 1 / (1 + 1) = 0.5
/// assert!((stable_dt(1.0, 1.0, 1.0, -1.0, 0.0) - 0.5).abs() < 1e-12);
/// ```
pub fn stable_dt(dx: f64, dy: f64, vx: f64, vy: f64, d: f64) -> f64 {
    StabilityLimit::new(dx, dy, vx, vy, d).dt()
}

/// `requested` clamped to `bound`, and whether clamping happened.
pub fn clamp_dt(requested: f64, bound: f64) -> (f64, bool) {
    if requested > bound {
        (bound, true)
    } else {
        (requested, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_physics_is_unbounded() {
        let lim = StabilityLimit::new(1.0, 1.0, 0.0, 0.0, 0.0);
        assert!(lim.is_unbounded());
        assert_eq!(clamp_dt(0.3, lim.dt()), (0.3, false));
    }

    #[test]
    fn binding_limit_is_the_smaller() {
        let lim = StabilityLimit::new(0.5, 0.5, 1.0, 0.0, 0.01);
        assert!((lim.advective - 0.5).abs() < 1e-12);
        assert!((lim.diffusive - 1.0 / (2.0 * 0.01 * 8.0)).abs() < 1e-12);
        assert_eq!(lim.dt(), lim.advective);
    }

    #[test]
    fn clamp_reports_when_it_bites() {
        assert_eq!(clamp_dt(2.0, 0.5), (0.5, true));
        assert_eq!(clamp_dt(0.5, 0.5), (0.5, false));
    }

    #[test]
    fn negative_velocity_counts_by_magnitude() {
        assert_eq!(
            stable_dt(1.0, 2.0, -3.0, 0.5, 0.0),
            stable_dt(1.0, 2.0, 3.0, -0.5, 0.0)
        );
    }

    proptest! {
        #[test]
        fn bound_is_positive(
            dx in 0.01f64..10.0,
            dy in 0.01f64..10.0,
            vx in -10.0f64..10.0,
            vy in -10.0f64..10.0,
            d in 0.0f64..10.0,
        ) {
            prop_assert!(stable_dt(dx, dy, vx, vy, d) > 0.0);
        }

        #[test]
        fn bound_decreases_with_speed(
            dx in 0.1f64..5.0,
            vx in 0.1f64..10.0,
            extra in 0.1f64..10.0,
        ) {
            // Zero diffusivity so the advective term always binds.
            let slow = stable_dt(dx, dx, vx, 0.0, 0.0);
            let fast = stable_dt(dx, dx, vx + extra, 0.0, 0.0);
            prop_assert!(fast < slow);
        }

        #[test]
        fn bound_decreases_with_diffusivity(
            dx in 0.1f64..5.0,
            d in 0.01f64..10.0,
            extra in 0.01f64..10.0,
        ) {
            let low = stable_dt(dx, dx, 0.0, 0.0, d);
            let high = stable_dt(dx, dx, 0.0, 0.0, d + extra);
            prop_assert!(high < low);
        }
    }
}
