//! Global binary field files.
//!
//! A field file is the whole `nx_global x ny_global` grid as row-major
//! little-endian `f64` with no header: value `(gi, gj)` lives at byte
//! `8 * (gj * nx_global + gi)`. Each rank seeks to and reads only its own
//! block, one row at a time.

use std::io::{Read, Seek, SeekFrom, Write};

use tessel_grid::{RankLayout, Tile};

use crate::error::IoError;

const F64_BYTES: u64 = std::mem::size_of::<f64>() as u64;

/// Fill `tile`'s interior with this rank's block of a global field file.
///
/// # Errors
///
/// [`IoError::Truncated`] if the stream is shorter than the global grid.
pub fn read_tile_block<R: Read + Seek>(
    mut r: R,
    layout: &RankLayout,
    tile: &mut Tile,
) -> Result<(), IoError> {
    let expected = (layout.nx_global * layout.ny_global) as u64 * F64_BYTES;
    let found = r.seek(SeekFrom::End(0))?;
    if found < expected {
        return Err(IoError::Truncated { expected, found });
    }

    let h = tile.halo();
    let mut row = vec![0u8; layout.nx_local * F64_BYTES as usize];
    for j in 0..layout.ny_local {
        let gj = layout.y_offset + j;
        let offset = (gj * layout.nx_global + layout.x_offset) as u64 * F64_BYTES;
        r.seek(SeekFrom::Start(offset))?;
        r.read_exact(&mut row)?;
        for (i, chunk) in row.chunks_exact(F64_BYTES as usize).enumerate() {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            tile[(h + i, h + j)] = f64::from_le_bytes(bytes);
        }
    }
    Ok(())
}

/// Write a global row-major field as little-endian `f64`.
pub fn write_global_field<W: Write>(mut w: W, values: &[f64]) -> Result<(), IoError> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tessel_core::RankId;

    fn layout(x: usize, y: usize, nx: usize, ny: usize) -> RankLayout {
        RankLayout {
            rank: RankId(0),
            x_offset: x,
            y_offset: y,
            nx_local: nx,
            ny_local: ny,
            halo: 1,
            nx_global: 4,
            ny_global: 3,
        }
    }

    fn global() -> Vec<u8> {
        let values: Vec<f64> = (0..12).map(|k| k as f64).collect();
        let mut buf = Vec::new();
        write_global_field(&mut buf, &values).unwrap();
        buf
    }

    #[test]
    fn reads_offset_block() {
        let l = layout(2, 1, 2, 2);
        let mut t = Tile::new(2, 2, 1, 1.0, 1.0);
        read_tile_block(Cursor::new(global()), &l, &mut t).unwrap();
        assert_eq!(t.interior_to_vec(), vec![6.0, 7.0, 10.0, 11.0]);
        assert_eq!(t[(0, 0)], 0.0);
    }

    #[test]
    fn short_file_is_truncated() {
        let mut data = global();
        data.truncate(11 * 8);
        let mut t = Tile::new(4, 3, 1, 1.0, 1.0);
        let err = read_tile_block(Cursor::new(data), &layout(0, 0, 4, 3), &mut t).unwrap_err();
        assert!(matches!(
            err,
            IoError::Truncated {
                expected: 96,
                found: 88,
            }
        ));
    }
}
