//! File formats for Tessel runs.
//!
//! - [`snapshot`]: per-rank CSV snapshots of a tile's interior
//! - [`layout`]: the rank-layout CSV
//! - [`binary`]: the global little-endian `f64` field file
//! - [`stitch`]: reassembly of per-rank snapshots into the global field
//!
//! Writers are generic over `Write` where possible so tests can target
//! `Vec<u8>`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod binary;
pub mod error;
pub mod layout;
pub mod snapshot;
pub mod stitch;

pub use binary::{read_tile_block, write_global_field};
pub use error::IoError;
pub use layout::{read_layout_csv, LayoutLog, LAYOUT_HEADER};
pub use snapshot::{read_snapshot_csv, snapshot_filename, write_snapshot_csv, SnapshotWriter};
pub use stitch::{stitch_snapshots, write_global_csv};
