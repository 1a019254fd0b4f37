//! Message passing and ghost exchange for Tessel.
//!
//! The solver is written against the [`Communicator`] trait: buffered
//! non-blocking sends, posted receives matched by `(source, tag)`, and a
//! single [`wait_all`](Communicator::wait_all) completion point. The
//! [`LocalWorld`] backend realises a process group inside one OS process,
//! one thread per rank.
//!
//! [`exchange_halos`] is the per-step ghost-cell exchange built on top.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod communicator;
pub mod exchange;
pub mod local;

pub use communicator::{Communicator, Request};
pub use exchange::exchange_halos;
pub use local::{AbortHandle, LocalComm, LocalWorld};
