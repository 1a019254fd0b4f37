//! Per-rank CSV snapshots.
//!
//! One line per interior row in ascending `j`, values comma-separated in
//! ascending `i`. Ghost cells are not written. Values use Rust's shortest
//! round-trip formatting, so reading a snapshot back is exact.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tessel_core::RankId;
use tessel_grid::Tile;

use crate::error::IoError;

/// `snapshot_{step:05}_rank{rank:05}.csv`.
pub fn snapshot_filename(step: usize, rank: RankId) -> String {
    format!("snapshot_{step:05}_rank{:05}.csv", rank.0)
}

/// Write `tile`'s interior as CSV.
pub fn write_snapshot_csv<W: Write>(mut w: W, tile: &Tile) -> Result<(), IoError> {
    for j in tile.interior_y() {
        let mut first = true;
        for i in tile.interior_x() {
            if !first {
                w.write_all(b",")?;
            }
            write!(w, "{}", tile[(i, j)])?;
            first = false;
        }
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Parse a CSV snapshot into rows. `path` is only used in error messages.
pub fn read_snapshot_csv<R: BufRead>(r: R, path: &Path) -> Result<Vec<Vec<f64>>, IoError> {
    let mut rows = Vec::new();
    for (n, line) in r.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IoError::Malformed {
                path: path.to_path_buf(),
                line: n + 1,
                detail: e.to_string(),
            })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Writes one rank's snapshots into a directory.
///
/// # Examples
///
/// ```
/// use tessel_core::RankId;
/// use tessel_grid::Tile;
/// use tessel_io::SnapshotWriter;
///
/// let dir = std::env::temp_dir().join("tessel-doc-snapshots");
/// let writer = SnapshotWriter::create(&dir).unwrap();
/// let mut t = Tile::new(2, 1, 1, 1.0, 1.0);
/// t.fill_interior(0.5);
/// let path = writer.write(0, RankId(3), &t).unwrap();
/// assert!(path.ends_with("snapshot_00000_rank00003.csv"));
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.5,0.5\n");
/// ```
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    /// Use `dir`, creating it (and parents) if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Use an existing `dir` as-is, for reading back.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot for `(step, rank)`.
    pub fn path_for(&self, step: usize, rank: RankId) -> PathBuf {
        self.dir.join(snapshot_filename(step, rank))
    }

    /// Write `tile` as the snapshot for `(step, rank)`, returning its path.
    pub fn write(&self, step: usize, rank: RankId, tile: &Tile) -> Result<PathBuf, IoError> {
        let path = self.path_for(step, rank);
        let file = File::create(&path)?;
        write_snapshot_csv(BufWriter::new(file), tile)?;
        Ok(path)
    }

    /// Read back the snapshot for `(step, rank)`.
    pub fn read(&self, step: usize, rank: RankId) -> Result<Vec<Vec<f64>>, IoError> {
        let path = self.path_for(step, rank);
        let file = File::open(&path)?;
        read_snapshot_csv(BufReader::new(file), &path)
    }
}
