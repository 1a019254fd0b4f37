//! Structured region descriptors for edge transfers.
//!
//! A [`StridedRegion`] names `count` elements of a flat buffer starting at
//! `start`, spaced `stride` apart. Columns of a row-major tile are strided
//! (`stride = nx_total`); rows are contiguous (`stride = 1`). Regions are
//! cheap values: built per exchange and dropped afterwards.

use tessel_core::{Direction, ExchangeError};

use crate::tile::Tile;

/// `count` elements starting at `start`, `stride` apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StridedRegion {
    start: usize,
    count: usize,
    stride: usize,
}

impl StridedRegion {
    /// A strided region. A zero stride is treated as contiguous.
    pub fn strided(start: usize, count: usize, stride: usize) -> Self {
        Self {
            start,
            count,
            stride: stride.max(1),
        }
    }

    /// A contiguous run of `count` elements.
    pub fn contiguous(start: usize, count: usize) -> Self {
        Self::strided(start, count, 1)
    }

    /// Interior part of column `i`: `ny_local` values, one per interior row.
    pub fn column(tile: &Tile, i: usize) -> Self {
        Self::strided(tile.idx(i, tile.halo()), tile.ny_local(), tile.nx_total())
    }

    /// The whole of row `j`, ghost corners included.
    pub fn row(tile: &Tile, j: usize) -> Self {
        Self::contiguous(tile.idx(0, j), tile.nx_total())
    }

    /// Interior edge data a rank sends through `dir`.
    ///
    /// West/east send the first/last interior column; south/north send
    /// the first/last interior row (full width).
    pub fn send(tile: &Tile, dir: Direction) -> Self {
        let h = tile.halo();
        match dir {
            Direction::West => Self::column(tile, h),
            Direction::East => Self::column(tile, h + tile.nx_local() - 1),
            Direction::South => Self::row(tile, h),
            Direction::North => Self::row(tile, h + tile.ny_local() - 1),
        }
    }

    /// Ghost cells adjacent to the interior on the `dir` side, which
    /// receive the neighbour's edge data.
    pub fn ghost(tile: &Tile, dir: Direction) -> Self {
        let h = tile.halo();
        match dir {
            Direction::West => Self::column(tile, h - 1),
            Direction::East => Self::column(tile, h + tile.nx_local()),
            Direction::South => Self::row(tile, h - 1),
            Direction::North => Self::row(tile, h + tile.ny_local()),
        }
    }

    /// First element.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the region selects nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Distance between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether consecutive elements are adjacent in memory.
    pub fn is_contiguous(&self) -> bool {
        self.stride == 1
    }

    /// Flat indices selected by the region, in order.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let (start, stride) = (self.start, self.stride);
        (0..self.count).map(move |k| start + k * stride)
    }

    /// Copy the selected elements of `data` into a new contiguous buffer.
    pub fn pack(&self, data: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.count);
        self.pack_into(data, &mut out);
        out
    }

    /// Append the selected elements of `data` to `out`.
    pub fn pack_into(&self, data: &[f64], out: &mut Vec<f64>) {
        if self.is_contiguous() {
            out.extend_from_slice(&data[self.start..self.start + self.count]);
        } else {
            out.extend(self.indices().map(|k| data[k]));
        }
    }

    /// Scatter a contiguous `payload` back into the selected elements.
    pub fn unpack(&self, data: &mut [f64], payload: &[f64]) -> Result<(), ExchangeError> {
        if payload.len() != self.count {
            return Err(ExchangeError::LengthMismatch {
                expected: self.count,
                received: payload.len(),
            });
        }
        if self.is_contiguous() {
            data[self.start..self.start + self.count].copy_from_slice(payload);
        } else {
            for (k, &v) in self.indices().zip(payload) {
                data[k] = v;
            }
        }
        Ok(())
    }
}
