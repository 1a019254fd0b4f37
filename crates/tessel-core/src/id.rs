//! Strongly-typed identifiers for ranks and message channels.

use std::fmt;

/// Identifies one process (rank) of a run.
///
/// Ranks are numbered `0..process_count`. A missing neighbour is modelled
/// as `Option<RankId>::None`, never as a sentinel rank value, so no real
/// rank can be mistaken for "no neighbour".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankId(pub usize);

impl RankId {
    /// The rank as a plain index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RankId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Message channel identifier.
///
/// Every point-to-point message carries a tag; a receive only matches a
/// message from the expected source with the expected tag. Halo traffic
/// uses one tag per direction of travel so that opposing transfers on the
/// same edge can never be confused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    /// Halo data travelling towards +x (a rank's east edge to its right neighbour).
    pub const EASTBOUND: Tag = Tag(100);
    /// Halo data travelling towards -x.
    pub const WESTBOUND: Tag = Tag(101);
    /// Halo data travelling towards +y.
    pub const NORTHBOUND: Tag = Tag(200);
    /// Halo data travelling towards -y.
    pub const SOUTHBOUND: Tag = Tag(201);
    /// First tag reserved for collective operations. Halo tags stay below it.
    pub const COLLECTIVE_BASE: Tag = Tag(900);

    /// Whether this tag belongs to the reserved collective range.
    pub fn is_collective(self) -> bool {
        self.0 >= Self::COLLECTIVE_BASE.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
