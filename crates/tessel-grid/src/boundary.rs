//! Physical boundary policies for the four edges of the global grid.

use std::fmt;
use std::str::FromStr;

use tessel_core::{Axis, Direction};

use crate::decomp::Periodicity;

/// What happens at a true physical edge of the global grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryCondition {
    /// Ghost cells are pinned to a fixed value.
    Dirichlet(f64),
    /// Zero flux: ghost cells mirror the adjacent interior cell.
    Neumann,
    /// Wrap-around. Supplied by a periodic process topology, not by the
    /// boundary enforcer.
    Periodic,
}

impl BoundaryCondition {
    /// Short lowercase name (`dirichlet`, `neumann`, `periodic`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dirichlet(_) => "dirichlet",
            Self::Neumann => "neumann",
            Self::Periodic => "periodic",
        }
    }

    /// Whether this is [`BoundaryCondition::Periodic`].
    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Periodic)
    }
}

impl Default for BoundaryCondition {
    fn default() -> Self {
        Self::Dirichlet(0.0)
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dirichlet(v) => write!(f, "dirichlet({v})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// An unrecognised boundary-condition name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseBoundaryError(pub String);

impl fmt::Display for ParseBoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown boundary condition '{}'", self.0)
    }
}

impl std::error::Error for ParseBoundaryError {}

impl FromStr for BoundaryCondition {
    type Err = ParseBoundaryError;

    /// Case-insensitive. Dirichlet parses with value `0.0`; the fixed value
    /// is configured separately.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dirichlet" | "fixed" => Ok(Self::Dirichlet(0.0)),
            "neumann" | "noflux" | "zero-flux" => Ok(Self::Neumann),
            "periodic" | "period" => Ok(Self::Periodic),
            _ => Err(ParseBoundaryError(s.to_string())),
        }
    }
}

/// Per-edge boundary policy for the global grid.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoundaryConfig {
    /// Edge at `x = 0`.
    pub left: BoundaryCondition,
    /// Edge at `x = Lx`.
    pub right: BoundaryCondition,
    /// Edge at `y = 0`.
    pub bottom: BoundaryCondition,
    /// Edge at `y = Ly`.
    pub top: BoundaryCondition,
}

impl BoundaryConfig {
    /// The same condition on all four edges.
    pub fn uniform(bc: BoundaryCondition) -> Self {
        Self {
            left: bc,
            right: bc,
            bottom: bc,
            top: bc,
        }
    }

    /// The condition on the edge facing `dir`.
    pub fn edge(&self, dir: Direction) -> BoundaryCondition {
        match dir {
            Direction::West => self.left,
            Direction::East => self.right,
            Direction::South => self.bottom,
            Direction::North => self.top,
        }
    }

    /// Axes whose both edges are periodic, and so must wrap in the process
    /// topology.
    pub fn periodicity(&self) -> Periodicity {
        Periodicity {
            x: self.left.is_periodic() && self.right.is_periodic(),
            y: self.bottom.is_periodic() && self.top.is_periodic(),
        }
    }

    /// First axis with `Periodic` on exactly one of its two edges.
    pub fn unpaired_periodic(&self) -> Option<Axis> {
        if self.left.is_periodic() != self.right.is_periodic() {
            return Some(Axis::X);
        }
        if self.bottom.is_periodic() != self.top.is_periodic() {
            return Some(Axis::Y);
        }
        None
    }
}

impl fmt::Display for BoundaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left={} right={} bottom={} top={}",
            self.left, self.right, self.bottom, self.top
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("Fixed".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Dirichlet(0.0)));
        assert_eq!("zero-flux".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Neumann));
        assert_eq!("noflux".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Neumann));
        assert_eq!(" PERIOD ".parse::<BoundaryCondition>(), Ok(BoundaryCondition::Periodic));
        assert!("reflective".parse::<BoundaryCondition>().is_err());
    }

    #[test]
    fn periodicity_needs_both_edges() {
        let mut bc = BoundaryConfig::uniform(BoundaryCondition::Periodic);
        assert_eq!(bc.periodicity(), Periodicity { x: true, y: true });
        assert_eq!(bc.unpaired_periodic(), None);

        bc.top = BoundaryCondition::Neumann;
        assert_eq!(bc.periodicity(), Periodicity { x: true, y: false });
        assert_eq!(bc.unpaired_periodic(), Some(Axis::Y));
    }

    #[test]
    fn edge_lookup_matches_direction() {
        let bc = BoundaryConfig {
            left: BoundaryCondition::Dirichlet(1.0),
            right: BoundaryCondition::Dirichlet(2.0),
            bottom: BoundaryCondition::Neumann,
            top: BoundaryCondition::Periodic,
        };
        assert_eq!(bc.edge(Direction::West), BoundaryCondition::Dirichlet(1.0));
        assert_eq!(bc.edge(Direction::East), BoundaryCondition::Dirichlet(2.0));
        assert_eq!(bc.edge(Direction::South), BoundaryCondition::Neumann);
        assert_eq!(bc.edge(Direction::North), BoundaryCondition::Periodic);
        assert_eq!(
            bc.to_string(),
            "left=dirichlet(1) right=dirichlet(2) bottom=neumann top=periodic"
        );
    }
}
