//! Run orchestration for the Tessel advection-diffusion solver.
//!
//! - [`SimConfig`]: YAML configuration, validation and the clamped time step
//! - [`InitialCondition`]: how each rank fills its tile before stepping
//! - [`Solver`]: one rank's exchange, boundary, stencil, swap loop over a
//!   [`DoubleBuffer`]
//! - [`Observer`]: layout and snapshot hooks; [`FileObserver`] writes CSV
//! - [`run_spmd`]: one thread per rank, joined into a [`RunReport`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod init;
pub mod launch;
pub mod metrics;
pub mod observer;
pub mod solver;

pub use buffer::DoubleBuffer;
pub use config::{BcSpec, ConfigError, EdgeBc, SimConfig};
pub use init::InitialCondition;
pub use launch::{plan_layout, run_spmd, run_to_files, RankOutcome, RunError, RunReport};
pub use metrics::{FieldStats, RunSummary, StepMetrics};
pub use observer::{FileObserver, NoopObserver, Observer, ObserverError};
pub use solver::{Solver, StepParams, StepPhase};
