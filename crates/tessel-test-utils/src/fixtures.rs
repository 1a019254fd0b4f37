//! Field fixtures and measurements.

use tessel_grid::Tile;

/// A single-rank tile with a Gaussian bump `amplitude · exp(-r² / 2σ²)`
/// centred at `(xc, yc)` in cell-centred coordinates.
pub fn gaussian_tile(
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    amplitude: f64,
    sigma: f64,
    (xc, yc): (f64, f64),
) -> Tile {
    let mut t = Tile::new(nx, ny, Tile::DEFAULT_HALO, dx, dy);
    let h = t.halo();
    for j in 0..ny {
        let y = (j as f64 + 0.5) * dy;
        for i in 0..nx {
            let x = (i as f64 + 0.5) * dx;
            let r2 = (x - xc).powi(2) + (y - yc).powi(2);
            t[(h + i, h + j)] = amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
        }
    }
    t
}

/// A single-rank tile with one interior cell set to `value`.
pub fn impulse_tile(nx: usize, ny: usize, (i, j): (usize, usize), value: f64) -> Tile {
    let mut t = Tile::new(nx, ny, Tile::DEFAULT_HALO, 1.0, 1.0);
    let h = t.halo();
    t[(h + i, h + j)] = value;
    t
}

/// Sum of every value of a global field stored as rows.
pub fn field_sum(field: &[Vec<f64>]) -> f64 {
    field.iter().flatten().sum()
}

/// Largest value of a global field.
pub fn field_max(field: &[Vec<f64>]) -> f64 {
    field.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Smallest value of a global field.
pub fn field_min(field: &[Vec<f64>]) -> f64 {
    field.iter().flatten().copied().fold(f64::INFINITY, f64::min)
}

/// Cell-centred centre of mass `(x, y)` of a global field.
pub fn centre_of_mass(field: &[Vec<f64>], dx: f64, dy: f64) -> (f64, f64) {
    let (mut m, mut mx, mut my) = (0.0, 0.0, 0.0);
    for (j, row) in field.iter().enumerate() {
        let y = (j as f64 + 0.5) * dy;
        for (i, &v) in row.iter().enumerate() {
            let x = (i as f64 + 0.5) * dx;
            m += v;
            mx += v * x;
            my += v * y;
        }
    }
    (mx / m, my / m)
}

/// Interior of a single-rank tile as a global field.
pub fn tile_field(tile: &Tile) -> Vec<Vec<f64>> {
    let h = tile.halo();
    (0..tile.ny_local())
        .map(|j| (0..tile.nx_local()).map(|i| tile[(h + i, h + j)]).collect())
        .collect()
}

/// Largest absolute difference between two same-shaped fields.
///
/// # Panics
///
/// If the shapes differ.
pub fn max_abs_diff(a: &[Vec<f64>], b: &[Vec<f64>]) -> f64 {
    assert_eq!(a.len(), b.len(), "row count differs");
    a.iter()
        .zip(b)
        .flat_map(|(ra, rb)| {
            assert_eq!(ra.len(), rb.len(), "row length differs");
            ra.iter().zip(rb).map(|(x, y)| (x - y).abs())
        })
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_hotspot_centre_of_mass() {
        let t = gaussian_tile(10, 8, 1.0, 1.0, 1.0, 1.5, (5.0, 4.0));
        let (x, y) = centre_of_mass(&tile_field(&t), 1.0, 1.0);
        assert!((x - 5.0).abs() < 1e-12);
        assert!((y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn impulse_sits_at_offset_cell() {
        let t = impulse_tile(3, 3, (2, 0), 4.0);
        let f = tile_field(&t);
        assert_eq!(f[0][2], 4.0);
        assert_eq!(field_sum(&f), 4.0);
        assert_eq!(field_max(&f), 4.0);
        assert_eq!(field_min(&f), 0.0);
    }
}
