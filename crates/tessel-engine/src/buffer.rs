//! Ping-pong tile pair.
//!
//! [`DoubleBuffer`] owns two same-shaped tiles that alternate between the
//! "active" role (read by the stencils, holds the current state) and the
//! "scratch" role (written by the stencils). [`swap`](DoubleBuffer::swap)
//! flips the roles by index; no data moves.

use tessel_core::TileError;
use tessel_grid::Tile;

/// Two tiles whose roles swap every step.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    tiles: [Tile; 2],
    /// Index of the active tile in `tiles`.
    active: usize,
    swaps: u64,
}

impl DoubleBuffer {
    /// Build from an initial active tile; scratch starts as a copy.
    pub fn new(initial: Tile) -> Self {
        let scratch = initial.clone();
        Self {
            tiles: [initial, scratch],
            active: 0,
            swaps: 0,
        }
    }

    /// The tile holding the current state.
    pub fn active(&self) -> &Tile {
        &self.tiles[self.active]
    }

    /// Mutable access to the current state (ghost exchange, boundaries).
    pub fn active_mut(&mut self) -> &mut Tile {
        &mut self.tiles[self.active]
    }

    /// The tile the next state is written into.
    pub fn scratch(&self) -> &Tile {
        &self.tiles[1 - self.active]
    }

    /// Split borrow: `(active, scratch)`.
    pub fn split(&mut self) -> (&Tile, &mut Tile) {
        let [a, b] = &mut self.tiles;
        if self.active == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Copy every cell of the active tile into scratch.
    pub fn sync_scratch(&mut self) -> Result<(), TileError> {
        let (active, scratch) = self.split();
        scratch.copy_from(active)
    }

    /// Make scratch the new active tile.
    pub fn swap(&mut self) {
        self.active = 1 - self.active;
        self.swaps += 1;
    }

    /// Number of swaps since construction.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Consume the buffer, returning the active tile.
    pub fn into_active(self) -> Tile {
        let [a, b] = self.tiles;
        if self.active == 0 {
            a
        } else {
            b
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_flips_roles() {
        let mut t = Tile::new(2, 2, 1, 1.0, 1.0);
        t.fill_interior(1.0);
        let mut buf = DoubleBuffer::new(t);
        {
            let (_, scratch) = buf.split();
            scratch.fill_interior(2.0);
        }
        assert_eq!(buf.active().interior_sum(), 4.0);
        buf.swap();
        assert_eq!(buf.active().interior_sum(), 8.0);
        assert_eq!(buf.scratch().interior_sum(), 4.0);
        assert_eq!(buf.swaps(), 1);
        buf.swap();
        assert_eq!(buf.active().interior_sum(), 4.0);
    }

    #[test]
    fn sync_copies_ghosts_too() {
        let mut buf = DoubleBuffer::new(Tile::new(2, 2, 1, 1.0, 1.0));
        buf.active_mut().fill(3.0);
        buf.sync_scratch().unwrap();
        assert_eq!(buf.scratch(), buf.active());
    }

    #[test]
    fn into_active_returns_current_state() {
        let mut buf = DoubleBuffer::new(Tile::new(1, 1, 1, 1.0, 1.0));
        buf.swap();
        buf.active_mut()[(1, 1)] = 9.0;
        assert_eq!(buf.into_active()[(1, 1)], 9.0);
    }
}
