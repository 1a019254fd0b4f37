//! Reassembly of per-rank snapshots into the global field.

use std::io::Write;
use std::path::Path;

use tessel_grid::RankLayout;

use crate::error::IoError;
use crate::snapshot::SnapshotWriter;

/// Read every rank's snapshot for `step` from `dir` and place each block at
/// its offset, returning the global field as `ny_global` rows of
/// `nx_global` values.
///
/// # Errors
///
/// - [`IoError::InconsistentLayout`] if `layouts` is empty, disagrees on
///   the global extent, or leaves cells uncovered or doubly covered
/// - [`IoError::Malformed`] if a snapshot's shape differs from its layout
pub fn stitch_snapshots(
    layouts: &[RankLayout],
    step: usize,
    dir: &Path,
) -> Result<Vec<Vec<f64>>, IoError> {
    let first = layouts.first().ok_or_else(|| IoError::InconsistentLayout {
        detail: "no ranks".to_string(),
    })?;
    let (nx, ny) = (first.nx_global, first.ny_global);
    let mut field = vec![vec![0.0; nx]; ny];
    let mut covered = vec![vec![false; nx]; ny];

    let snapshots = SnapshotWriter::open(dir);
    for l in layouts {
        if (l.nx_global, l.ny_global) != (nx, ny) {
            return Err(IoError::InconsistentLayout {
                detail: format!(
                    "rank {} reports a {}x{} grid, rank {} reports {nx}x{ny}",
                    l.rank, l.nx_global, l.ny_global, first.rank
                ),
            });
        }
        let rows = snapshots.read(step, l.rank)?;
        let path = snapshots.path_for(step, l.rank);
        if rows.len() != l.ny_local {
            return Err(IoError::Malformed {
                path,
                line: rows.len(),
                detail: format!("expected {} rows, found {}", l.ny_local, rows.len()),
            });
        }
        for (j, row) in rows.iter().enumerate() {
            if row.len() != l.nx_local {
                return Err(IoError::Malformed {
                    path,
                    line: j + 1,
                    detail: format!("expected {} values, found {}", l.nx_local, row.len()),
                });
            }
            let gj = l.y_offset + j;
            for (i, &v) in row.iter().enumerate() {
                let gi = l.x_offset + i;
                if gj >= ny || gi >= nx || covered[gj][gi] {
                    return Err(IoError::InconsistentLayout {
                        detail: format!("rank {} overlaps or overflows at ({gi}, {gj})", l.rank),
                    });
                }
                covered[gj][gi] = true;
                field[gj][gi] = v;
            }
        }
    }
    if covered.iter().flatten().any(|&c| !c) {
        return Err(IoError::InconsistentLayout {
            detail: "global grid not fully covered".to_string(),
        });
    }
    Ok(field)
}

/// Write a global field as CSV, one line per row.
pub fn write_global_csv<W: Write>(mut w: W, field: &[Vec<f64>]) -> Result<(), IoError> {
    for row in field {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(w, "{line}")?;
    }
    w.flush()?;
    Ok(())
}
