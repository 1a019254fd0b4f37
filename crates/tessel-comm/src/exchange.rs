//! Per-step ghost-cell exchange.

use smallvec::SmallVec;
use tessel_core::{Direction, ExchangeError};
use tessel_grid::{Decomposition, StridedRegion, Tile};

use crate::communicator::Communicator;

/// Refresh `tile`'s ghost cells from the four neighbours in `decomp`.
///
/// For every direction with a neighbour a receive into the adjacent ghost
/// region is posted and the matching interior edge is packed and sent;
/// nothing is posted towards a physical edge. Left/right edges move strided
/// columns of `ny_local` values, bottom/top edges move full rows of
/// `nx_total` values. The call returns only once every posted transfer has
/// completed, and ghost cells are written only after that point.
///
/// Physical-edge ghost cells are left untouched.
///
/// # Errors
///
/// - [`ExchangeError::TopologyReleased`] after [`Decomposition::finalize`]
/// - [`ExchangeError::TileMismatch`] if the tile interior does not match
///   the decomposition's local extents
/// - any error of the underlying [`Communicator`]
pub fn exchange_halos<C: Communicator + ?Sized>(
    tile: &mut Tile,
    decomp: &Decomposition,
    comm: &mut C,
) -> Result<(), ExchangeError> {
    if decomp.is_finalized() {
        return Err(ExchangeError::TopologyReleased);
    }
    let expected = (decomp.nx_local(), decomp.ny_local());
    let found = (tile.nx_local(), tile.ny_local());
    if expected != found {
        return Err(ExchangeError::TileMismatch { expected, found });
    }

    let mut requests = Vec::with_capacity(8);
    let mut recv_dirs: SmallVec<[Direction; 4]> = SmallVec::new();
    for (dir, peer) in decomp.neighbours().iter() {
        requests.push(comm.irecv(peer, dir.recv_tag())?);
        recv_dirs.push(dir);
        let payload = StridedRegion::send(tile, dir).pack(tile.as_slice());
        requests.push(comm.isend(peer, dir.send_tag(), payload)?);
    }
    if requests.is_empty() {
        return Ok(());
    }

    let completed = comm.wait_all(requests)?;
    for (dir, payload) in recv_dirs.into_iter().zip(completed.into_iter().flatten()) {
        StridedRegion::ghost(tile, dir).unpack(tile.as_mut_slice(), &payload)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LocalWorld;
    use tessel_core::RankId;
    use tessel_grid::Periodicity;

    fn numbered(nx: usize, ny: usize) -> Tile {
        let mut t = Tile::new(nx, ny, 1, 1.0, 1.0);
        for j in t.interior_y() {
            for i in t.interior_x() {
                t[(i, j)] = (10 * j + i) as f64;
            }
        }
        t
    }

    #[test]
    fn single_rank_without_wrap_is_a_no_op() {
        let mut comm = LocalWorld::new(1).unwrap().into_endpoints().remove(0);
        let d = Decomposition::init(RankId(0), 1, 3, 3, Periodicity::NONE).unwrap();
        let mut t = numbered(3, 3);
        t[(0, 0)] = -7.0;
        let before = t.clone();
        exchange_halos(&mut t, &d, &mut comm).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn single_rank_periodic_wraps_edges_into_ghosts() {
        let mut comm = LocalWorld::new(1).unwrap().into_endpoints().remove(0);
        let d = Decomposition::init(RankId(0), 1, 3, 2, Periodicity::BOTH).unwrap();
        let mut t = numbered(3, 2);
        exchange_halos(&mut t, &d, &mut comm).unwrap();

        // West ghost holds the east interior column, and vice versa.
        assert_eq!(t[(0, 1)], t[(3, 1)]);
        assert_eq!(t[(0, 2)], t[(3, 2)]);
        assert_eq!(t[(4, 1)], t[(1, 1)]);
        // South ghost row holds the top interior row.
        assert_eq!(t[(2, 0)], t[(2, 2)]);
        assert_eq!(t[(2, 3)], t[(2, 1)]);
        assert_eq!(comm.pending_unexpected(), 0);
    }

    #[test]
    fn finalized_topology_refuses_exchange() {
        let mut comm = LocalWorld::new(1).unwrap().into_endpoints().remove(0);
        let mut d = Decomposition::init(RankId(0), 1, 3, 3, Periodicity::NONE).unwrap();
        d.finalize();
        let mut t = numbered(3, 3);
        assert_eq!(
            exchange_halos(&mut t, &d, &mut comm),
            Err(ExchangeError::TopologyReleased)
        );
    }

    #[test]
    fn mismatched_tile_is_rejected() {
        let mut comm = LocalWorld::new(1).unwrap().into_endpoints().remove(0);
        let d = Decomposition::init(RankId(0), 1, 3, 3, Periodicity::NONE).unwrap();
        let mut t = numbered(4, 3);
        assert_eq!(
            exchange_halos(&mut t, &d, &mut comm),
            Err(ExchangeError::TileMismatch {
                expected: (3, 3),
                found: (4, 3),
            })
        );
    }
}
