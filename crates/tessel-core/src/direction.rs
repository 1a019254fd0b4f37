//! Edge directions and axes of a 2D tile.

use crate::id::Tag;
use std::fmt;

/// One of the two grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The `i` (column) axis.
    X,
    /// The `j` (row) axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
        }
    }
}

/// One of the four edges of a tile, named by the neighbour it faces.
///
/// `West`/`East` are the left/right edges (constant `i`), `South`/`North`
/// the bottom/top edges (constant `j`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left edge, towards -x.
    West,
    /// Right edge, towards +x.
    East,
    /// Bottom edge, towards -y.
    South,
    /// Top edge, towards +y.
    North,
}

impl Direction {
    /// All four directions in exchange order: left, right, down, up.
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
    ];

    /// The direction facing the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Self::West => Self::East,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::North => Self::South,
        }
    }

    /// The axis this edge is perpendicular to.
    pub fn axis(self) -> Axis {
        match self {
            Self::West | Self::East => Axis::X,
            Self::South | Self::North => Axis::Y,
        }
    }

    /// Tag for data a rank sends out through this edge.
    ///
    /// Sending west travels westbound, so the neighbour on the west
    /// receives it through its east edge with the same tag.
    pub fn send_tag(self) -> Tag {
        match self {
            Self::West => Tag::WESTBOUND,
            Self::East => Tag::EASTBOUND,
            Self::South => Tag::SOUTHBOUND,
            Self::North => Tag::NORTHBOUND,
        }
    }

    /// Tag for data a rank receives through this edge.
    pub fn recv_tag(self) -> Tag {
        self.opposite().send_tag()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::West => write!(f, "west"),
            Self::East => write!(f, "east"),
            Self::South => write!(f, "south"),
            Self::North => write!(f, "north"),
        }
    }
}
