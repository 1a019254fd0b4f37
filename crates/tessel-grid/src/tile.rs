//! One rank's local field: interior cells plus a ghost border.

use std::ops::{Index, IndexMut, Range};

use tessel_core::TileError;

/// A rank's subgrid of `nx_local x ny_local` interior cells surrounded by a
/// ghost border of depth `halo`.
///
/// Storage is row-major over the total extent:
/// `index(i, j) = j * nx_total + i`, with `i` the column (x) and `j` the
/// row (y). Interior cells occupy `halo..halo + nx_local` by
/// `halo..halo + ny_local`.
///
/// Checked access goes through [`at`](Tile::at) / [`at_mut`](Tile::at_mut),
/// which accept signed indices and return [`TileError::OutOfBounds`] instead
/// of clamping. `tile[(i, j)]` panics on an out-of-range index.
///
/// # Examples
///
/// ```
/// use tessel_grid::Tile;
///
/// let mut t = Tile::new(3, 2, 1, 1.0, 1.0);
/// assert_eq!((t.nx_total(), t.ny_total()), (5, 4));
/// *t.at_mut(1, 1).unwrap() = 2.5;
/// assert_eq!(t[(1, 1)], 2.5);
/// assert!(t.at(-1, 0).is_err());
/// assert!(t.at(5, 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    nx_local: usize,
    ny_local: usize,
    halo: usize,
    dx: f64,
    dy: f64,
    data: Vec<f64>,
}

impl Tile {
    /// Ghost-border depth used by the 5-point and upwind stencils.
    pub const DEFAULT_HALO: usize = 1;

    /// Create a zero-filled tile.
    pub fn new(nx_local: usize, ny_local: usize, halo: usize, dx: f64, dy: f64) -> Self {
        let len = (nx_local + 2 * halo) * (ny_local + 2 * halo);
        Self {
            nx_local,
            ny_local,
            halo,
            dx,
            dy,
            data: vec![0.0; len],
        }
    }

    /// Interior columns.
    pub fn nx_local(&self) -> usize {
        self.nx_local
    }

    /// Interior rows.
    pub fn ny_local(&self) -> usize {
        self.ny_local
    }

    /// Ghost-border depth.
    pub fn halo(&self) -> usize {
        self.halo
    }

    /// Cell spacing along x.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Cell spacing along y.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Columns including both ghost borders.
    pub fn nx_total(&self) -> usize {
        self.nx_local + 2 * self.halo
    }

    /// Rows including both ghost borders.
    pub fn ny_total(&self) -> usize {
        self.ny_local + 2 * self.halo
    }

    /// `(nx_total, ny_total)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.nx_total(), self.ny_total())
    }

    /// Number of stored cells, ghosts included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tile stores no cells at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Interior column range `halo..halo + nx_local`.
    pub fn interior_x(&self) -> Range<usize> {
        self.halo..self.halo + self.nx_local
    }

    /// Interior row range `halo..halo + ny_local`.
    pub fn interior_y(&self) -> Range<usize> {
        self.halo..self.halo + self.ny_local
    }

    /// Linear index of `(i, j)`. The caller guarantees it is in range.
    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx_total() && j < self.ny_total());
        j * self.nx_total() + i
    }

    fn checked_idx(&self, i: isize, j: isize) -> Result<usize, TileError> {
        let (nx_total, ny_total) = self.shape();
        if i < 0 || j < 0 || i as usize >= nx_total || j as usize >= ny_total {
            return Err(TileError::OutOfBounds {
                i,
                j,
                nx_total,
                ny_total,
            });
        }
        Ok(j as usize * nx_total + i as usize)
    }

    /// Bounds-checked read of cell `(i, j)`.
    pub fn at(&self, i: isize, j: isize) -> Result<&f64, TileError> {
        let k = self.checked_idx(i, j)?;
        Ok(&self.data[k])
    }

    /// Bounds-checked mutable access to cell `(i, j)`.
    pub fn at_mut(&mut self, i: isize, j: isize) -> Result<&mut f64, TileError> {
        let k = self.checked_idx(i, j)?;
        Ok(&mut self.data[k])
    }

    /// Set every cell, ghosts included.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every interior cell, leaving the ghost border untouched.
    pub fn fill_interior(&mut self, value: f64) {
        for j in self.interior_y() {
            let row = self.idx(self.halo, j);
            self.data[row..row + self.nx_local].fill(value);
        }
    }

    /// Raw row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw row-major storage.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Fail with [`TileError::ShapeMismatch`] unless `other` has the same
    /// total extent.
    pub fn check_same_shape(&self, other: &Tile) -> Result<(), TileError> {
        if self.shape() != other.shape() {
            return Err(TileError::ShapeMismatch {
                expected: self.shape(),
                found: other.shape(),
            });
        }
        Ok(())
    }

    /// Overwrite every cell (ghosts included) with `other`'s values.
    pub fn copy_from(&mut self, other: &Tile) -> Result<(), TileError> {
        self.check_same_shape(other)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Iterate `(i, j, value)` over interior cells in row-major order.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.interior_y().flat_map(move |j| {
            self.interior_x()
                .map(move |i| (i, j, self.data[self.idx(i, j)]))
        })
    }

    /// Sum of interior values.
    pub fn interior_sum(&self) -> f64 {
        self.interior().map(|(_, _, v)| v).sum()
    }

    /// `(min, max)` of interior values, or `None` for an empty interior.
    pub fn interior_min_max(&self) -> Option<(f64, f64)> {
        self.interior().fold(None, |acc, (_, _, v)| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Interior values copied row by row into a dense
    /// `nx_local * ny_local` buffer.
    pub fn interior_to_vec(&self) -> Vec<f64> {
        self.interior().map(|(_, _, v)| v).collect()
    }
}

impl Index<(usize, usize)> for Tile {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(
            i < self.nx_total() && j < self.ny_total(),
            "tile index ({i}, {j}) out of range for {}x{} tile",
            self.nx_total(),
            self.ny_total()
        );
        &self.data[j * self.nx_total() + i]
    }
}

impl IndexMut<(usize, usize)> for Tile {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(
            i < self.nx_total() && j < self.ny_total(),
            "tile index ({i}, {j}) out of range for {}x{} tile",
            self.nx_total(),
            self.ny_total()
        );
        let nx_total = self.nx_total();
        &mut self.data[j * nx_total + i]
    }
}
