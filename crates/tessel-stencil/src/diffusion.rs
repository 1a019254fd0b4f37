//! Explicit 5-point diffusion.

use tessel_core::TileError;
use tessel_grid::Tile;

/// One forward-Euler diffusion step from `input` into `output`.
///
/// For every interior cell:
///
/// ```text
/// lap = (u[i+1,j] - 2u[i,j] + u[i-1,j]) / dx^2
///     + (u[i,j+1] - 2u[i,j] + u[i,j-1]) / dy^2
/// out[i,j] = u[i,j] + dt * d * lap
/// ```
///
/// Ghost cells are copied from `input` unchanged, so values placed by the
/// boundary enforcer survive the pass. Spacing is taken from `input`.
///
/// Stable only while `d * dt * (1/dx^2 + 1/dy^2) <= 0.5`; callers clamp
/// `dt` beforehand with [`stable_dt`](crate::stable_dt).
///
/// # Errors
///
/// [`TileError::ShapeMismatch`] if the tiles differ in shape.
pub fn diffuse(input: &Tile, output: &mut Tile, d: f64, dt: f64) -> Result<(), TileError> {
    input.check_same_shape(output)?;

    let h = input.halo();
    let (nx_total, ny_total) = input.shape();
    let inv_dx2 = 1.0 / (input.dx() * input.dx());
    let inv_dy2 = 1.0 / (input.dy() * input.dy());
    let k = dt * d;

    let u = input.as_slice();
    let out = output.as_mut_slice();
    for j in 0..ny_total {
        let row = j * nx_total;
        let interior_row = j >= h && j < ny_total - h;
        if !interior_row {
            out[row..row + nx_total].copy_from_slice(&u[row..row + nx_total]);
            continue;
        }
        out[row..row + h].copy_from_slice(&u[row..row + h]);
        out[row + nx_total - h..row + nx_total].copy_from_slice(&u[row + nx_total - h..row + nx_total]);
        for i in h..nx_total - h {
            let c = row + i;
            let lap = (u[c + 1] - 2.0 * u[c] + u[c - 1]) * inv_dx2
                + (u[c + nx_total] - 2.0 * u[c] + u[c - nx_total]) * inv_dy2;
            out[c] = u[c] + k * lap;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_test_utils::fixtures::impulse_tile;

    #[test]
    fn impulse_spreads_by_alpha() {
        let input = impulse_tile(3, 3, (1, 1), 1.0);
        let mut output = Tile::new(3, 3, 1, 1.0, 1.0);
        diffuse(&input, &mut output, 0.1, 0.1).unwrap();

        let alpha = 0.01;
        assert!((output[(2, 2)] - (1.0 - 4.0 * alpha)).abs() < 1e-12);
        for (i, j) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert!((output[(i, j)] - alpha).abs() < 1e-12, "({i}, {j})");
        }
        for (i, j) in [(1, 1), (3, 3), (1, 3), (3, 1)] {
            assert_eq!(output[(i, j)], 0.0);
        }
    }

    #[test]
    fn ghost_ring_is_copied_not_computed() {
        let mut input = Tile::new(2, 2, 1, 1.0, 1.0);
        input.fill(3.0);
        input.fill_interior(0.0);
        let mut output = Tile::new(2, 2, 1, 1.0, 1.0);
        output.fill(-1.0);
        diffuse(&input, &mut output, 0.2, 0.5).unwrap();
        let (nx, ny) = output.shape();
        for j in 0..ny {
            for i in 0..nx {
                let ghost = i == 0 || j == 0 || i == nx - 1 || j == ny - 1;
                if ghost {
                    assert_eq!(output[(i, j)], 3.0);
                } else {
                    // Two ghost neighbours at 3.0: 0 + 0.1 * (3 + 3) = 0.6
                    assert!((output[(i, j)] - 0.6).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn constant_field_is_stationary() {
        let mut input = Tile::new(4, 5, 1, 0.5, 2.0);
        input.fill(1.25);
        let mut output = Tile::new(4, 5, 1, 0.5, 2.0);
        diffuse(&input, &mut output, 0.3, 0.1).unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn anisotropic_spacing_weights_axes() {
        let mut input = Tile::new(3, 3, 1, 1.0, 2.0);
        input[(2, 2)] = 1.0;
        let mut output = Tile::new(3, 3, 1, 1.0, 2.0);
        diffuse(&input, &mut output, 1.0, 0.1).unwrap();
        assert!((output[(1, 2)] - 0.1).abs() < 1e-12);
        assert!((output[(2, 1)] - 0.025).abs() < 1e-12);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let input = Tile::new(3, 3, 1, 1.0, 1.0);
        let mut output = Tile::new(3, 2, 1, 1.0, 1.0);
        assert!(matches!(
            diffuse(&input, &mut output, 0.1, 0.1),
            Err(TileError::ShapeMismatch { .. })
        ));
    }
}
