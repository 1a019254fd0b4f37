//! Per-tile numerics for the Tessel advection-diffusion solver.
//!
//! All operations act on a single rank's [`Tile`](tessel_grid::Tile) and
//! never communicate. A step applies them in a fixed order:
//!
//! 1. [`apply_boundary`] on the active tile (after ghost exchange)
//! 2. copy active into scratch
//! 3. [`diffuse`] active into scratch
//! 4. [`advect`] active into scratch, accumulating
//!
//! [`stable_dt`] is evaluated once, before stepping, to clamp the time step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advection;
pub mod boundary;
pub mod diffusion;
pub mod stability;

pub use advection::advect;
pub use boundary::apply_boundary;
pub use diffusion::diffuse;
pub use stability::{clamp_dt, stable_dt, StabilityLimit};
