//! Tessel: a distributed 2D advection-diffusion solver.
//!
//! The global grid is split into near-square blocks, one per rank. Every
//! step each rank refreshes its ghost cells from its four neighbours,
//! enforces the physical boundary, and advances its block with an explicit
//! 5-point diffusion and first-order upwind advection update.
//!
//! This is the facade crate re-exporting the public API of every
//! sub-crate.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let cfg = SimConfig::from_yaml_str(
//!     "grid: { nx: 24, ny: 16 }\nphysics: { D: 0.1, vx: 0.5 }\ntime: { steps: 5 }\nbc: neumann\nranks: 4\n",
//! )
//! .unwrap();
//! let report = run_spmd(&cfg, |_| NoopObserver).unwrap();
//! assert_eq!(report.ranks.len(), 4);
//! assert!(report.final_stats.max < report.initial.max);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessel-core` | Rank and tag ids, directions, error taxonomy |
//! | [`grid`] | `tessel-grid` | Tiles, decomposition, strided regions, boundary policy |
//! | [`comm`] | `tessel-comm` | `Communicator`, `LocalWorld`, ghost exchange |
//! | [`stencil`] | `tessel-stencil` | Stability bound, boundary enforcer, stencils |
//! | [`io`] | `tessel-io` | CSV snapshots, layout log, binary fields, stitching |
//! | [`engine`] | `tessel-engine` | Configuration, solver, observers, SPMD launch |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Ids, directions and errors (`tessel-core`).
pub use tessel_core as types;

/// Tiles, decomposition and boundary policy (`tessel-grid`).
///
/// [`grid::Decomposition::init`] partitions the global grid for one rank;
/// [`grid::Tile`] holds that rank's block plus ghost border.
pub use tessel_grid as grid;

/// Message passing and ghost exchange (`tessel-comm`).
pub use tessel_comm as comm;

/// Per-tile numerics (`tessel-stencil`).
pub use tessel_stencil as stencil;

/// File formats (`tessel-io`).
pub use tessel_io as io;

/// Run orchestration (`tessel-engine`).
///
/// [`engine::run_spmd`] runs a whole configuration; [`engine::Solver`]
/// drives a single rank.
pub use tessel_engine as engine;

/// Common imports for typical Tessel usage.
pub mod prelude {
    // Core
    pub use tessel_core::{Direction, ExchangeError, RankId, StepError, TileError, TopologyError};

    // Grid
    pub use tessel_grid::{
        BoundaryCondition, BoundaryConfig, Decomposition, Periodicity, RankLayout, Tile,
    };

    // Communication
    pub use tessel_comm::{exchange_halos, AbortHandle, Communicator, LocalComm, LocalWorld};

    // Stencils
    pub use tessel_stencil::{advect, apply_boundary, diffuse, stable_dt};

    // Engine
    pub use tessel_engine::{
        run_spmd, run_to_files, FileObserver, InitialCondition, NoopObserver, Observer, ObserverError,
        RunReport, SimConfig, Solver, StepParams,
    };
}
