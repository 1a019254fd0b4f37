//! Error types for the Tessel solver.
//!
//! Organised by subsystem: tile storage, decomposition (topology), ghost
//! exchange (communication), and the per-step orchestrator. Nothing here
//! is recovered locally; every failure surfaces to the orchestrator and
//! terminates the run.

use std::error::Error;
use std::fmt;

use crate::direction::Axis;
use crate::id::{RankId, Tag};

/// Errors from tile storage and stencil input validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileError {
    /// Index `(i, j)` lies outside `[0, nx_total) x [0, ny_total)`.
    OutOfBounds {
        /// Requested column index.
        i: isize,
        /// Requested row index.
        j: isize,
        /// Total columns including ghosts.
        nx_total: usize,
        /// Total rows including ghosts.
        ny_total: usize,
    },
    /// Two tiles that must share a shape do not.
    ShapeMismatch {
        /// `(nx_total, ny_total)` of the reference tile.
        expected: (usize, usize),
        /// `(nx_total, ny_total)` of the offending tile.
        found: (usize, usize),
    },
}

impl fmt::Display for TileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                i,
                j,
                nx_total,
                ny_total,
            } => write!(
                f,
                "tile index ({i}, {j}) out of range for {nx_total}x{ny_total} tile"
            ),
            Self::ShapeMismatch { expected, found } => write!(
                f,
                "tile shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
        }
    }
}

impl Error for TileError {}

/// Errors from partitioning the global grid across processes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// The process count is zero.
    NoProcesses,
    /// The global grid has zero cells along an axis.
    EmptyGrid {
        /// The empty axis.
        axis: Axis,
    },
    /// The rank does not exist in a group of `size` processes.
    RankOutOfRange {
        /// The offending rank.
        rank: RankId,
        /// Number of processes in the group.
        size: usize,
    },
    /// Some rank would own zero cells along `axis`.
    DegenerateExtent {
        /// The axis that cannot be split.
        axis: Axis,
        /// Global cell count along the axis.
        global: usize,
        /// Process count along the axis.
        procs: usize,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProcesses => write!(f, "process count must be at least 1"),
            Self::EmptyGrid { axis } => write!(f, "global grid has zero cells along {axis}"),
            Self::RankOutOfRange { rank, size } => {
                write!(f, "rank {rank} out of range for {size} processes")
            }
            Self::DegenerateExtent {
                axis,
                global,
                procs,
            } => write!(
                f,
                "cannot split {global} cells along {axis} across {procs} processes"
            ),
        }
    }
}

impl Error for TopologyError {}

/// Failures while posting or completing a ghost exchange.
///
/// Always fatal: no transfer is retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// A message was addressed to a rank outside the process group.
    UnknownPeer {
        /// The addressed rank.
        peer: RankId,
        /// Number of processes in the group.
        size: usize,
    },
    /// The peer's mailbox is gone (its process has exited).
    Disconnected {
        /// The unreachable rank.
        peer: RankId,
    },
    /// No matching message arrived within the configured deadline.
    Timeout {
        /// Rank the receive was waiting on.
        peer: RankId,
        /// Tag the receive was waiting on.
        tag: Tag,
    },
    /// A received payload does not fit the region it targets.
    LengthMismatch {
        /// Elements the region expects.
        expected: usize,
        /// Elements actually received.
        received: usize,
    },
    /// Another rank failed and aborted the process group.
    Aborted {
        /// The rank that raised the abort.
        by: RankId,
    },
    /// The decomposition's topology was finalized before the exchange.
    TopologyReleased,
    /// The tile does not match the decomposition's local extents.
    TileMismatch {
        /// `(nx_local, ny_local)` from the decomposition.
        expected: (usize, usize),
        /// `(nx_local, ny_local)` of the tile.
        found: (usize, usize),
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPeer { peer, size } => {
                write!(f, "peer rank {peer} not in group of {size}")
            }
            Self::Disconnected { peer } => write!(f, "peer rank {peer} disconnected"),
            Self::Timeout { peer, tag } => {
                write!(f, "timed out waiting for tag {tag} from rank {peer}")
            }
            Self::LengthMismatch { expected, received } => write!(
                f,
                "payload length mismatch: expected {expected}, received {received}"
            ),
            Self::Aborted { by } => write!(f, "run aborted by rank {by}"),
            Self::TopologyReleased => write!(f, "topology already finalized"),
            Self::TileMismatch { expected, found } => write!(
                f,
                "tile interior {}x{} does not match decomposition {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl Error for ExchangeError {}

/// Errors surfacing from one step (or the setup) of a rank's run.
#[derive(Debug)]
pub enum StepError {
    /// Ghost exchange failed.
    Exchange(ExchangeError),
    /// A tile access or shape check failed.
    Tile(TileError),
    /// The decomposition could not be built.
    Topology(TopologyError),
    /// An observer hook (snapshot or layout writer) failed.
    Observer(Box<dyn Error + Send + Sync>),
    /// A rank's thread panicked.
    RankPanicked {
        /// The rank that panicked.
        rank: RankId,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exchange(e) => write!(f, "ghost exchange failed: {e}"),
            Self::Tile(e) => write!(f, "tile error: {e}"),
            Self::Topology(e) => write!(f, "decomposition failed: {e}"),
            Self::Observer(e) => write!(f, "observer failed: {e}"),
            Self::RankPanicked { rank } => write!(f, "rank {rank} panicked"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exchange(e) => Some(e),
            Self::Tile(e) => Some(e),
            Self::Topology(e) => Some(e),
            Self::Observer(e) => Some(e.as_ref()),
            Self::RankPanicked { .. } => None,
        }
    }
}

impl From<ExchangeError> for StepError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

impl From<TileError> for StepError {
    fn from(e: TileError) -> Self {
        Self::Tile(e)
    }
}

impl From<TopologyError> for StepError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}
