//! Core types for the Tessel distributed finite-difference solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: rank and tag
//! identifiers, the four edge directions of a tile, and the error
//! taxonomy (index, topology, exchange, and step failures).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod id;

pub use direction::{Axis, Direction};
pub use error::{ExchangeError, StepError, TileError, TopologyError};
pub use id::{RankId, Tag};
