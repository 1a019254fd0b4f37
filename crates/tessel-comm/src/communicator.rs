//! The message-passing surface used by the solver.

use tessel_core::{ExchangeError, RankId, Tag};

/// Handle for one posted operation, completed by
/// [`Communicator::wait_all`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a posted operation does nothing until it is waited on"]
pub struct Request {
    kind: RequestKind,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RequestKind {
    Send,
    Recv { source: RankId, tag: Tag },
}

impl Request {
    pub(crate) fn send() -> Self {
        Self {
            kind: RequestKind::Send,
        }
    }

    pub(crate) fn recv(source: RankId, tag: Tag) -> Self {
        Self {
            kind: RequestKind::Recv { source, tag },
        }
    }

    pub(crate) fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Whether this handle belongs to a send.
    pub fn is_send(&self) -> bool {
        matches!(self.kind, RequestKind::Send)
    }
}

/// One rank's endpoint into a process group.
///
/// Sends are buffered: [`isend`](Communicator::isend) hands the payload off
/// and returns at once. Receives are posted with
/// [`irecv`](Communicator::irecv) and only complete inside
/// [`wait_all`](Communicator::wait_all), which matches each posted receive
/// against messages by source and tag, FIFO per `(source, tag)` pair.
///
/// Collectives must be called by every rank of the group in the same order.
pub trait Communicator {
    /// This rank.
    fn rank(&self) -> RankId;

    /// Number of ranks in the group.
    fn size(&self) -> usize;

    /// Post a buffered send of `payload` to `dest`.
    fn isend(&mut self, dest: RankId, tag: Tag, payload: Vec<f64>)
        -> Result<Request, ExchangeError>;

    /// Post a receive of the next message from `source` with `tag`.
    fn irecv(&mut self, source: RankId, tag: Tag) -> Result<Request, ExchangeError>;

    /// Complete every request, returning received payloads in posting order
    /// (`None` for sends).
    fn wait_all(
        &mut self,
        requests: Vec<Request>,
    ) -> Result<Vec<Option<Vec<f64>>>, ExchangeError>;

    /// Block until every rank has reached the barrier.
    fn barrier(&mut self) -> Result<(), ExchangeError>;

    /// Maximum of `value` across all ranks, returned on every rank.
    fn all_reduce_max(&mut self, value: f64) -> Result<f64, ExchangeError>;

    /// Sum of `value` across all ranks, returned on every rank.
    fn all_reduce_sum(&mut self, value: f64) -> Result<f64, ExchangeError>;
}
