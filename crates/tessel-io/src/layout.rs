//! The rank-layout CSV.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tessel_core::RankId;
use tessel_grid::RankLayout;

use crate::error::IoError;

/// Header line of the layout CSV.
pub const LAYOUT_HEADER: &str = "rank,x_offset,y_offset,nx_local,ny_local,halo,nx_global,ny_global";

fn format_row(l: &RankLayout) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        l.rank, l.x_offset, l.y_offset, l.nx_local, l.ny_local, l.halo, l.nx_global, l.ny_global
    )
}

/// Append-only layout CSV shared by every rank of a run.
///
/// Appends are serialised, and the header is written only when the file is
/// new or empty, so repeated runs into the same prefix accumulate rows
/// under one header.
#[derive(Debug)]
pub struct LayoutLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LayoutLog {
    /// Log into `path`, creating parent directories if missing.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, IoError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// The CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one rank's row.
    pub fn append(&self, layout: &RankLayout) -> Result<(), IoError> {
        // The mutex guards no data, so poisoning is ignored.
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut text = String::new();
        if file.metadata()?.len() == 0 {
            text.push_str(LAYOUT_HEADER);
            text.push('\n');
        }
        text.push_str(&format_row(layout));
        text.push('\n');
        file.write_all(text.as_bytes())?;
        Ok(())
    }
}

fn parse_row(line: &str, n: usize, path: &Path) -> Result<RankLayout, IoError> {
    let malformed = |detail: String| IoError::Malformed {
        path: path.to_path_buf(),
        line: n,
        detail,
    };
    let fields = line
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed(e.to_string()))?;
    match fields[..] {
        [rank, x_offset, y_offset, nx_local, ny_local, halo, nx_global, ny_global] => {
            Ok(RankLayout {
                rank: RankId(rank),
                x_offset,
                y_offset,
                nx_local,
                ny_local,
                halo,
                nx_global,
                ny_global,
            })
        }
        _ => Err(malformed(format!("expected 8 fields, found {}", fields.len()))),
    }
}

/// Read every row of a layout CSV, skipping header lines.
pub fn read_layout_csv(path: &Path) -> Result<Vec<RankLayout>, IoError> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == LAYOUT_HEADER {
            continue;
        }
        rows.push(parse_row(line, n + 1, path)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rank: usize, x: usize) -> RankLayout {
        RankLayout {
            rank: RankId(rank),
            x_offset: x,
            y_offset: 0,
            nx_local: 4,
            ny_local: 8,
            halo: 1,
            nx_global: 8,
            ny_global: 8,
        }
    }

    #[test]
    fn row_format_matches_header_order() {
        assert_eq!(format_row(&layout(1, 4)), "1,4,0,4,8,1,8,8");
        assert_eq!(LAYOUT_HEADER.split(',').count(), 8);
    }

    #[test]
    fn parse_rejects_short_rows() {
        let err = parse_row("1,2,3", 5, Path::new("l.csv")).unwrap_err();
        assert!(err.to_string().contains("l.csv:5"));
    }
}
