use tessel_comm::{exchange_halos, Communicator};
use tessel_core::Direction;
use tessel_grid::{Decomposition, Periodicity, Tile};
use tessel_test_utils::run_ranks;

const UNSET: f64 = -1.0;

/// Run one exchange on every rank with interiors filled by rank id.
fn exchange_rank_ids(p: usize, nx: usize, ny: usize, per: Periodicity) -> Vec<(Decomposition, Tile)> {
    run_ranks(p, |mut comm| {
        let d = Decomposition::init(comm.rank(), p, nx, ny, per).unwrap();
        let mut t = Tile::new(d.nx_local(), d.ny_local(), 1, 1.0, 1.0);
        t.fill(UNSET);
        t.fill_interior(comm.rank().index() as f64);
        exchange_halos(&mut t, &d, &mut comm).unwrap();
        (d, t)
    })
}

/// Ghost cells along the `dir` edge, excluding corners.
fn ghost_cells(t: &Tile, dir: Direction) -> Vec<f64> {
    let h = t.halo();
    match dir {
        Direction::West => t.interior_y().map(|j| t[(h - 1, j)]).collect(),
        Direction::East => t.interior_y().map(|j| t[(h + t.nx_local(), j)]).collect(),
        Direction::South => t.interior_x().map(|i| t[(i, h - 1)]).collect(),
        Direction::North => t.interior_x().map(|i| t[(i, h + t.ny_local())]).collect(),
    }
}

fn assert_ghosts_hold_neighbour_ids(results: &[(Decomposition, Tile)]) {
    for (d, t) in results {
        for dir in Direction::ALL {
            let expected = match d.neighbour(dir) {
                Some(nb) => nb.index() as f64,
                None => UNSET,
            };
            for v in ghost_cells(t, dir) {
                assert_eq!(v, expected, "rank {} {dir} ghost", d.rank());
            }
        }
        // Interior is untouched by the exchange.
        assert!(t.interior().all(|(_, _, v)| v == d.rank().index() as f64));
    }
}

#[test]
fn ghosts_hold_owner_rank_for_many_process_counts() {
    for &(p, nx, ny) in &[(2, 8, 5), (4, 9, 7), (6, 12, 10), (9, 9, 9), (12, 25, 13)] {
        let results = exchange_rank_ids(p, nx, ny, Periodicity::NONE);
        assert_ghosts_hold_neighbour_ids(&results);
    }
}

#[test]
fn periodic_topology_fills_every_ghost() {
    for per in [
        Periodicity::BOTH,
        Periodicity { x: true, y: false },
        Periodicity { x: false, y: true },
    ] {
        let results = exchange_rank_ids(4, 8, 8, per);
        assert_ghosts_hold_neighbour_ids(&results);
    }
}

#[test]
fn seven_ranks_form_a_strip() {
    let results = exchange_rank_ids(7, 21, 3, Periodicity::NONE);
    for (d, t) in &results {
        assert!(d.neighbour(Direction::South).is_none());
        assert!(d.neighbour(Direction::North).is_none());
        assert!(ghost_cells(t, Direction::South).iter().all(|&v| v == UNSET));
    }
    assert_ghosts_hold_neighbour_ids(&results);
}

#[test]
fn repeated_exchanges_leave_no_stray_messages() {
    let leftovers = run_ranks(4, |mut comm| {
        let d = Decomposition::init(comm.rank(), 4, 6, 6, Periodicity::BOTH).unwrap();
        let mut t = Tile::new(d.nx_local(), d.ny_local(), 1, 1.0, 1.0);
        for step in 0..5 {
            t.fill_interior(step as f64);
            exchange_halos(&mut t, &d, &mut comm).unwrap();
            assert_eq!(t[(0, 1)], step as f64);
        }
        comm.barrier().unwrap();
        comm.pending_unexpected()
    });
    assert!(leftovers.iter().all(|&n| n == 0));
}
