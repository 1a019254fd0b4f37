//! Test harnesses and field fixtures for Tessel development.
//!
//! [`run_ranks`] drives a closure on every rank of a [`LocalWorld`] with a
//! receive deadline, so a broken exchange fails a test instead of hanging
//! it. [`fixtures`] builds hotspot tiles and measures fields.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::thread;
use std::time::Duration;

use tessel_comm::{LocalComm, LocalWorld};

/// Receive deadline used by [`run_ranks`].
pub const TEST_RECV_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `f` once per rank of a `size`-rank world, each on its own thread,
/// returning results in rank order.
///
/// # Panics
///
/// If `size` is zero or any rank panics.
pub fn run_ranks<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(LocalComm) -> T + Sync,
{
    let world = LocalWorld::new(size)
        .expect("world size must be positive")
        .with_recv_timeout(TEST_RECV_TIMEOUT);
    thread::scope(|s| {
        let f = &f;
        let handles: Vec<_> = world
            .into_endpoints()
            .into_iter()
            .map(|comm| s.spawn(move || f(comm)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank panicked"))
            .collect()
    })
}
