//! Physical boundary enforcement on ghost cells.

use tessel_core::Direction;
use tessel_grid::{BoundaryCondition, BoundaryConfig, Decomposition, Tile};

/// Fill the ghost cells on every physical edge of `tile`.
///
/// Edges with a neighbour in `decomp` are seams and are skipped; their
/// ghosts come from the exchange. On a physical edge:
///
/// - `Dirichlet(v)`: every ghost cell along the edge is set to `v`
/// - `Neumann`: every ghost cell copies the adjacent interior-layer cell
/// - `Periodic`: nothing; wrapping is the topology's job, so a periodic
///   edge without a wrapping neighbour keeps whatever its ghosts held
///
/// Left/right edges cover full ghost columns and run first; bottom/top
/// cover full ghost rows and run last, so they own the corners.
///
/// # Examples
///
/// ```
/// use tessel_core::RankId;
/// use tessel_grid::{BoundaryCondition, BoundaryConfig, Decomposition, Periodicity, Tile};
/// use tessel_stencil::apply_boundary;
///
/// let d = Decomposition::init(RankId(0), 1, 3, 3, Periodicity::NONE).unwrap();
/// let mut t = Tile::new(3, 3, 1, 1.0, 1.0);
/// apply_boundary(&mut t, &d, &BoundaryConfig::uniform(BoundaryCondition::Dirichlet(5.0)));
/// assert_eq!(t[(0, 0)], 5.0);
/// assert_eq!(t[(4, 2)], 5.0);
/// assert_eq!(t[(2, 2)], 0.0);
/// ```
pub fn apply_boundary(tile: &mut Tile, decomp: &Decomposition, bc: &BoundaryConfig) {
    for dir in Direction::ALL {
        if decomp.is_physical_edge(dir) {
            apply_edge(tile, dir, bc.edge(dir));
        }
    }
}

fn apply_edge(tile: &mut Tile, dir: Direction, cond: BoundaryCondition) {
    let h = tile.halo();
    let (nx_total, ny_total) = tile.shape();
    // (ghost layers, adjacent interior layer) along the edge's normal axis.
    let (ghosts, inner) = match dir {
        Direction::West => (0..h, h),
        Direction::East => (h + tile.nx_local()..nx_total, h + tile.nx_local() - 1),
        Direction::South => (0..h, h),
        Direction::North => (h + tile.ny_local()..ny_total, h + tile.ny_local() - 1),
    };

    match cond {
        BoundaryCondition::Periodic => {}
        BoundaryCondition::Dirichlet(v) => {
            for g in ghosts {
                match dir {
                    Direction::West | Direction::East => {
                        for j in 0..ny_total {
                            tile[(g, j)] = v;
                        }
                    }
                    Direction::South | Direction::North => {
                        for i in 0..nx_total {
                            tile[(i, g)] = v;
                        }
                    }
                }
            }
        }
        BoundaryCondition::Neumann => {
            for g in ghosts {
                match dir {
                    Direction::West | Direction::East => {
                        for j in 0..ny_total {
                            tile[(g, j)] = tile[(inner, j)];
                        }
                    }
                    Direction::South | Direction::North => {
                        let src = tile.idx(0, inner);
                        let dst = tile.idx(0, g);
                        tile.as_mut_slice()
                            .copy_within(src..src + nx_total, dst);
                    }
                }
            }
        }
    }
}
