//! First-order upwind advection.

use tessel_core::TileError;
use tessel_grid::Tile;

/// Add one upwind advection increment of `input` onto `output`.
///
/// For every interior cell the derivative along each axis is taken from the
/// upwind side (`vx >= 0` differences backwards in x, `vx < 0` forwards;
/// likewise for y), and `-dt * (vx * du/dx + vy * du/dy)` is added to the
/// value already in `output`. Ghost cells of `output` are not touched.
///
/// `output` is expected to already hold the diffusion update for the same
/// step; the two passes together form the full advection-diffusion step.
///
/// # Errors
///
/// [`TileError::ShapeMismatch`] if the tiles differ in shape.
pub fn advect(
    input: &Tile,
    output: &mut Tile,
    vx: f64,
    vy: f64,
    dt: f64,
) -> Result<(), TileError> {
    input.check_same_shape(output)?;
    if vx == 0.0 && vy == 0.0 {
        return Ok(());
    }

    let nx_total = input.nx_total();
    let (dx, dy) = (input.dx(), input.dy());
    let u = input.as_slice();
    let out = output.as_mut_slice();
    for j in input.interior_y() {
        for i in input.interior_x() {
            let c = j * nx_total + i;
            let dudx = if vx >= 0.0 {
                (u[c] - u[c - 1]) / dx
            } else {
                (u[c + 1] - u[c]) / dx
            };
            let dudy = if vy >= 0.0 {
                (u[c] - u[c - nx_total]) / dy
            } else {
                (u[c + nx_total] - u[c]) / dy
            };
            out[c] -= dt * (vx * dudx + vy * dudy);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_profile() -> Tile {
        // Columns 0..=2 hold 1.0, columns 3.. hold 0.0.
        let mut t = Tile::new(4, 1, 1, 1.0, 1.0);
        for i in 0..3 {
            for j in 0..3 {
                t[(i, j)] = 1.0;
            }
        }
        t
    }

    #[test]
    fn positive_velocity_reads_from_the_left() {
        let input = step_profile();
        let mut output = input.clone();
        advect(&input, &mut output, 0.5, 0.0, 1.0).unwrap();
        // Cell 3 sees u[3] - u[2] = -1; gains 0.5.
        assert!((output[(3, 1)] - 0.5).abs() < 1e-12);
        assert_eq!(output[(2, 1)], 1.0);
        assert_eq!(output[(4, 1)], 0.0);
    }

    #[test]
    fn negative_velocity_reads_from_the_right() {
        let input = step_profile();
        let mut output = input.clone();
        advect(&input, &mut output, -0.5, 0.0, 1.0).unwrap();
        // Cell 2 sees u[3] - u[2] = -1; loses 0.5.
        assert!((output[(2, 1)] - 0.5).abs() < 1e-12);
        assert_eq!(output[(3, 1)], 0.0);
    }

    #[test]
    fn accumulates_onto_existing_output() {
        let input = step_profile();
        let mut output = input.clone();
        output.fill_interior(10.0);
        advect(&input, &mut output, 0.5, 0.0, 1.0).unwrap();
        assert!((output[(3, 1)] - 10.5).abs() < 1e-12);
        assert_eq!(output[(1, 1)], 10.0);
        // Ghosts untouched.
        assert_eq!(output[(0, 1)], 1.0);
    }

    #[test]
    fn courant_one_shifts_exactly_one_cell() {
        let mut input = Tile::new(5, 5, 1, 1.0, 1.0);
        input[(2, 3)] = 1.0;
        let mut output = input.clone();
        advect(&input, &mut output, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(output[(2, 3)], 0.0);
        assert_eq!(output[(2, 4)], 1.0);
    }

    #[test]
    fn no_new_extrema() {
        let mut input = Tile::new(6, 6, 1, 1.0, 1.0);
        for (k, v) in input.as_mut_slice().iter_mut().enumerate() {
            *v = ((k * 37) % 11) as f64 / 10.0;
        }
        let (lo, hi) = input
            .as_slice()
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let mut output = input.clone();
        advect(&input, &mut output, 0.4, -0.3, 1.0).unwrap();
        for (_, _, v) in output.interior() {
            assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
        }
    }
}
