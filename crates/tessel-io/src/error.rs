//! Error type for Tessel file formats.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors reading or writing snapshots, layouts, and initial conditions.
#[derive(Debug)]
pub enum IoError {
    /// An underlying I/O operation failed.
    Io(io::Error),
    /// A binary field file holds fewer bytes than the grid needs.
    Truncated {
        /// Bytes required for the full global grid.
        expected: u64,
        /// Bytes actually present.
        found: u64,
    },
    /// A text file could not be parsed.
    Malformed {
        /// The offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        detail: String,
    },
    /// Per-rank layouts do not describe one consistent global grid.
    InconsistentLayout {
        /// What was wrong.
        detail: String,
    },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Truncated { expected, found } => write!(
                f,
                "field file truncated: need {expected} bytes, found {found}"
            ),
            Self::Malformed { path, line, detail } => {
                write!(f, "{}:{line}: {detail}", path.display())
            }
            Self::InconsistentLayout { detail } => write!(f, "inconsistent rank layout: {detail}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for IoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
