//! Static block decomposition of the global grid across a process grid.
//!
//! The process count `P` is factored into a near-square `Px x Py` grid
//! (`Px >= Py`, `Py` the largest divisor of `P` not above `sqrt(P)`). Ranks
//! are laid out with the x coordinate slowest: `rank = cx * Py + cy`. Each
//! rank owns `floor(Nx / Px) x floor(Ny / Py)` cells; the last rank along an
//! axis also takes that axis's remainder.

use std::fmt;

use tessel_core::{Axis, Direction, RankId, TopologyError};

/// Which axes of the process grid wrap around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Periodicity {
    /// Left/right neighbours wrap.
    pub x: bool,
    /// Down/up neighbours wrap.
    pub y: bool,
}

impl Periodicity {
    /// No wrapping on either axis.
    pub const NONE: Periodicity = Periodicity { x: false, y: false };
    /// Wrapping on both axes (torus).
    pub const BOTH: Periodicity = Periodicity { x: true, y: true };
}

/// A `px x py` arrangement of processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessGrid {
    px: usize,
    py: usize,
}

impl ProcessGrid {
    /// Most-square factor pair of `process_count`, larger factor first.
    ///
    /// # Examples
    ///
    /// ```
    /// use tessel_grid::ProcessGrid;
    ///
    /// let g = ProcessGrid::balanced(6).unwrap();
    /// assert_eq!((g.px(), g.py()), (3, 2));
    /// let g = ProcessGrid::balanced(7).unwrap();
    /// assert_eq!((g.px(), g.py()), (7, 1));
    /// ```
    pub fn balanced(process_count: usize) -> Result<Self, TopologyError> {
        if process_count == 0 {
            return Err(TopologyError::NoProcesses);
        }
        let mut py = 1;
        let mut d = 1;
        while d * d <= process_count {
            if process_count % d == 0 {
                py = d;
            }
            d += 1;
        }
        Ok(Self {
            px: process_count / py,
            py,
        })
    }

    /// Processes along x.
    pub fn px(&self) -> usize {
        self.px
    }

    /// Processes along y.
    pub fn py(&self) -> usize {
        self.py
    }

    /// Total processes.
    pub fn size(&self) -> usize {
        self.px * self.py
    }

    /// `(cx, cy)` of `rank`.
    pub fn coords_of(&self, rank: RankId) -> (usize, usize) {
        (rank.0 / self.py, rank.0 % self.py)
    }

    /// Rank at `(cx, cy)`.
    pub fn rank_at(&self, cx: usize, cy: usize) -> RankId {
        RankId(cx * self.py + cy)
    }

    /// Neighbour one step from `coord` along an axis of length `len`, or
    /// `None` past a non-wrapping edge.
    fn shift(coord: usize, len: usize, forward: bool, wrap: bool) -> Option<usize> {
        match (forward, wrap) {
            (false, _) if coord > 0 => Some(coord - 1),
            (false, true) => Some(len - 1),
            (true, _) if coord + 1 < len => Some(coord + 1),
            (true, true) => Some(0),
            _ => None,
        }
    }
}

/// The four neighbours of a tile; `None` marks a physical edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Neighbours {
    /// Neighbour towards -x.
    pub left: Option<RankId>,
    /// Neighbour towards +x.
    pub right: Option<RankId>,
    /// Neighbour towards -y.
    pub down: Option<RankId>,
    /// Neighbour towards +y.
    pub up: Option<RankId>,
}

impl Neighbours {
    /// The neighbour across the edge facing `dir`.
    pub fn get(&self, dir: Direction) -> Option<RankId> {
        match dir {
            Direction::West => self.left,
            Direction::East => self.right,
            Direction::South => self.down,
            Direction::North => self.up,
        }
    }

    /// `(direction, rank)` for every edge that has a neighbour, in
    /// left, right, down, up order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, RankId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |d| self.get(d).map(|r| (d, r)))
    }
}

/// One row of the rank-layout report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankLayout {
    /// Owning rank.
    pub rank: RankId,
    /// Global column of the first interior cell.
    pub x_offset: usize,
    /// Global row of the first interior cell.
    pub y_offset: usize,
    /// Interior columns.
    pub nx_local: usize,
    /// Interior rows.
    pub ny_local: usize,
    /// Ghost-border depth.
    pub halo: usize,
    /// Global columns.
    pub nx_global: usize,
    /// Global rows.
    pub ny_global: usize,
}

/// This rank's share of the global grid and its place in the process grid.
///
/// Immutable after [`init`](Decomposition::init) apart from
/// [`finalize`](Decomposition::finalize), which releases the topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decomposition {
    rank: RankId,
    grid: ProcessGrid,
    coords: (usize, usize),
    periodicity: Periodicity,
    neighbours: Neighbours,
    nx_global: usize,
    ny_global: usize,
    nx_local: usize,
    ny_local: usize,
    x_offset: usize,
    y_offset: usize,
    released: bool,
}

impl Decomposition {
    /// Partition an `nx_global x ny_global` grid across `process_count`
    /// ranks and describe `rank`'s share.
    ///
    /// # Errors
    ///
    /// - [`TopologyError::NoProcesses`] for `process_count == 0`
    /// - [`TopologyError::EmptyGrid`] for a zero global extent
    /// - [`TopologyError::RankOutOfRange`] for `rank >= process_count`
    /// - [`TopologyError::DegenerateExtent`] when an axis has fewer cells
    ///   than processes, which would leave some rank an empty tile
    ///
    /// # Examples
    ///
    /// ```
    /// use tessel_core::RankId;
    /// use tessel_grid::{Decomposition, Periodicity};
    ///
    /// // 4 ranks -> 2x2; rank 3 sits at (1, 1) and absorbs the remainder.
    /// let d = Decomposition::init(RankId(3), 4, 9, 7, Periodicity::NONE).unwrap();
    /// assert_eq!(d.coords(), (1, 1));
    /// assert_eq!((d.nx_local(), d.ny_local()), (5, 4));
    /// assert_eq!((d.x_offset(), d.y_offset()), (4, 3));
    /// assert!(d.neighbours().right.is_none());
    /// ```
    pub fn init(
        rank: RankId,
        process_count: usize,
        nx_global: usize,
        ny_global: usize,
        periodicity: Periodicity,
    ) -> Result<Self, TopologyError> {
        let grid = ProcessGrid::balanced(process_count)?;
        if nx_global == 0 {
            return Err(TopologyError::EmptyGrid { axis: Axis::X });
        }
        if ny_global == 0 {
            return Err(TopologyError::EmptyGrid { axis: Axis::Y });
        }
        if rank.0 >= process_count {
            return Err(TopologyError::RankOutOfRange {
                rank,
                size: process_count,
            });
        }
        if nx_global < grid.px {
            return Err(TopologyError::DegenerateExtent {
                axis: Axis::X,
                global: nx_global,
                procs: grid.px,
            });
        }
        if ny_global < grid.py {
            return Err(TopologyError::DegenerateExtent {
                axis: Axis::Y,
                global: ny_global,
                procs: grid.py,
            });
        }

        let (cx, cy) = grid.coords_of(rank);
        let base_nx = nx_global / grid.px;
        let base_ny = ny_global / grid.py;
        let nx_local = base_nx + if cx == grid.px - 1 { nx_global % grid.px } else { 0 };
        let ny_local = base_ny + if cy == grid.py - 1 { ny_global % grid.py } else { 0 };

        let at = |x: Option<usize>, y: Option<usize>| match (x, y) {
            (Some(x), Some(y)) => Some(grid.rank_at(x, y)),
            _ => None,
        };
        let neighbours = Neighbours {
            left: at(
                ProcessGrid::shift(cx, grid.px, false, periodicity.x),
                Some(cy),
            ),
            right: at(
                ProcessGrid::shift(cx, grid.px, true, periodicity.x),
                Some(cy),
            ),
            down: at(
                Some(cx),
                ProcessGrid::shift(cy, grid.py, false, periodicity.y),
            ),
            up: at(
                Some(cx),
                ProcessGrid::shift(cy, grid.py, true, periodicity.y),
            ),
        };

        Ok(Self {
            rank,
            grid,
            coords: (cx, cy),
            periodicity,
            neighbours,
            nx_global,
            ny_global,
            nx_local,
            ny_local,
            x_offset: cx * base_nx,
            y_offset: cy * base_ny,
            released: false,
        })
    }

    /// Decompositions of every rank, in rank order.
    pub fn all(
        process_count: usize,
        nx_global: usize,
        ny_global: usize,
        periodicity: Periodicity,
    ) -> Result<Vec<Self>, TopologyError> {
        (0..process_count)
            .map(|r| Self::init(RankId(r), process_count, nx_global, ny_global, periodicity))
            .collect()
    }

    /// Release the process topology. Idempotent.
    ///
    /// Extents and offsets stay readable; ghost exchange refuses to run on
    /// a finalized decomposition.
    pub fn finalize(&mut self) {
        self.released = true;
    }

    /// Whether [`finalize`](Decomposition::finalize) has been called.
    pub fn is_finalized(&self) -> bool {
        self.released
    }

    /// This rank.
    pub fn rank(&self) -> RankId {
        self.rank
    }

    /// Number of ranks.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// The process grid.
    pub fn process_grid(&self) -> ProcessGrid {
        self.grid
    }

    /// `(cx, cy)` within the process grid.
    pub fn coords(&self) -> (usize, usize) {
        self.coords
    }

    /// Wrap-around per axis.
    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// The four neighbours.
    pub fn neighbours(&self) -> &Neighbours {
        &self.neighbours
    }

    /// The neighbour across the edge facing `dir`.
    pub fn neighbour(&self, dir: Direction) -> Option<RankId> {
        self.neighbours.get(dir)
    }

    /// Whether the edge facing `dir` is a true physical boundary.
    pub fn is_physical_edge(&self, dir: Direction) -> bool {
        self.neighbours.get(dir).is_none()
    }

    /// Global columns.
    pub fn nx_global(&self) -> usize {
        self.nx_global
    }

    /// Global rows.
    pub fn ny_global(&self) -> usize {
        self.ny_global
    }

    /// Interior columns owned by this rank.
    pub fn nx_local(&self) -> usize {
        self.nx_local
    }

    /// Interior rows owned by this rank.
    pub fn ny_local(&self) -> usize {
        self.ny_local
    }

    /// Global column of this rank's first interior cell.
    pub fn x_offset(&self) -> usize {
        self.x_offset
    }

    /// Global row of this rank's first interior cell.
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    /// Whether global cell `(gi, gj)` belongs to this rank.
    pub fn owns(&self, gi: usize, gj: usize) -> bool {
        (self.x_offset..self.x_offset + self.nx_local).contains(&gi)
            && (self.y_offset..self.y_offset + self.ny_local).contains(&gj)
    }

    /// Layout record for reporting, with the given ghost depth.
    pub fn layout(&self, halo: usize) -> RankLayout {
        RankLayout {
            rank: self.rank,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            nx_local: self.nx_local,
            ny_local: self.ny_local,
            halo,
            nx_global: self.nx_global,
            ny_global: self.ny_global,
        }
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rank {} at ({}, {}) of {}x{}: {}x{} cells at offset ({}, {})",
            self.rank,
            self.coords.0,
            self.coords.1,
            self.grid.px,
            self.grid.py,
            self.nx_local,
            self.ny_local,
            self.x_offset,
            self.y_offset
        )
    }
}
