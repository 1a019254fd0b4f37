//! Spatial data structures for Tessel.
//!
//! - [`Tile`]: one rank's subgrid plus its ghost border, row-major.
//! - [`Decomposition`]: the static block partition of the global grid
//!   across a near-square [`ProcessGrid`], with the 4-neighbour topology.
//! - [`StridedRegion`]: `(start, count, stride)` descriptors for the edge
//!   columns and rows moved by the ghost exchange.
//! - [`BoundaryConfig`]: the per-edge physical boundary policy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod decomp;
pub mod region;
pub mod tile;

pub use boundary::{BoundaryCondition, BoundaryConfig, ParseBoundaryError};
pub use decomp::{Decomposition, Neighbours, Periodicity, ProcessGrid, RankLayout};
pub use region::StridedRegion;
pub use tile::Tile;
