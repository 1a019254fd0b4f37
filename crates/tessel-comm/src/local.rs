//! In-process process group: one thread per rank, one mailbox per rank.
//!
//! Every rank owns the receiving end of an unbounded `crossbeam-channel`
//! and a sender into every mailbox (its own included, so a rank on a
//! one-wide periodic axis can exchange with itself). Messages that arrive
//! before a matching receive is waited on are parked in a per-rank
//! unexpected-message queue.
//!
//! A failing rank aborts the whole group through its [`AbortHandle`]: the
//! first abort is recorded in state shared by every endpoint and an abort
//! envelope is posted to each peer, so receives that are already blocked
//! wake up and fail with [`ExchangeError::Aborted`].

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tessel_core::{ExchangeError, RankId, Tag, TopologyError};

use crate::communicator::{Communicator, Request, RequestKind};

const REDUCE_TAG: Tag = Tag(Tag::COLLECTIVE_BASE.0);
const BROADCAST_TAG: Tag = Tag(Tag::COLLECTIVE_BASE.0 + 1);

#[derive(Debug)]
struct Message {
    source: RankId,
    tag: Tag,
    payload: Vec<f64>,
}

#[derive(Debug)]
enum Envelope {
    Data(Message),
    Abort { origin: RankId },
}

/// Builder for a group of [`LocalComm`] endpoints.
///
/// # Examples
///
/// ```
/// use tessel_comm::{Communicator, LocalWorld};
///
/// let comms = LocalWorld::new(3).unwrap().into_endpoints();
/// let sums: Vec<f64> = std::thread::scope(|s| {
///     let handles: Vec<_> = comms
///         .into_iter()
///         .map(|mut c| s.spawn(move || c.all_reduce_sum(c.rank().index() as f64).unwrap()))
///         .collect();
///     handles.into_iter().map(|h| h.join().unwrap()).collect()
/// });
/// assert_eq!(sums, vec![3.0, 3.0, 3.0]);
/// ```
#[derive(Debug)]
pub struct LocalWorld {
    size: usize,
    recv_timeout: Option<Duration>,
}

impl LocalWorld {
    /// A group of `size` ranks. Receives block indefinitely by default.
    pub fn new(size: usize) -> Result<Self, TopologyError> {
        if size == 0 {
            return Err(TopologyError::NoProcesses);
        }
        Ok(Self {
            size,
            recv_timeout: None,
        })
    }

    /// Fail a receive with [`ExchangeError::Timeout`] if nothing matching
    /// arrives within `timeout`.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Number of ranks.
    pub fn size(&self) -> usize {
        self.size
    }

    /// One endpoint per rank, in rank order. Move each to its own thread.
    pub fn into_endpoints(self) -> Vec<LocalComm> {
        let (senders, receivers): (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) =
            (0..self.size).map(|_| crossbeam_channel::unbounded()).unzip();
        let aborted = Arc::new(OnceLock::new());
        receivers
            .into_iter()
            .enumerate()
            .map(|(r, inbox)| LocalComm {
                rank: RankId(r),
                peers: senders.clone(),
                inbox,
                unexpected: VecDeque::new(),
                recv_timeout: self.recv_timeout,
                aborted: Arc::clone(&aborted),
            })
            .collect()
    }
}

/// Aborts every endpoint of a [`LocalWorld`] on behalf of one rank.
///
/// Cheap to clone and independent of the [`LocalComm`] it came from, so it
/// can outlive a rank's endpoint (for example in a drop guard).
#[derive(Clone, Debug)]
pub struct AbortHandle {
    rank: RankId,
    peers: Vec<Sender<Envelope>>,
    aborted: Arc<OnceLock<RankId>>,
}

impl AbortHandle {
    /// Abort the group. Returns `false` if some rank already had; only the
    /// first abort is recorded and broadcast.
    pub fn abort(&self) -> bool {
        if self.aborted.set(self.rank).is_err() {
            return false;
        }
        for (r, peer) in self.peers.iter().enumerate() {
            if r != self.rank.index() {
                // A peer whose endpoint is gone has nothing left to wake.
                let _ = peer.send(Envelope::Abort { origin: self.rank });
            }
        }
        true
    }

    /// The rank that aborted the group, if any.
    pub fn aborted_by(&self) -> Option<RankId> {
        self.aborted.get().copied()
    }
}

/// One rank's endpoint in a [`LocalWorld`].
#[derive(Debug)]
pub struct LocalComm {
    rank: RankId,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    unexpected: VecDeque<Message>,
    recv_timeout: Option<Duration>,
    aborted: Arc<OnceLock<RankId>>,
}

impl LocalComm {
    /// A handle that aborts the whole group on this rank's behalf.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            rank: self.rank,
            peers: self.peers.clone(),
            aborted: Arc::clone(&self.aborted),
        }
    }

    /// Abort the group from this rank. See [`AbortHandle::abort`].
    pub fn abort(&self) -> bool {
        self.abort_handle().abort()
    }

    fn check_aborted(&self) -> Result<(), ExchangeError> {
        match self.aborted.get() {
            Some(&by) => Err(ExchangeError::Aborted { by }),
            None => Ok(()),
        }
    }

    fn check_peer(&self, peer: RankId) -> Result<(), ExchangeError> {
        if peer.0 >= self.peers.len() {
            return Err(ExchangeError::UnknownPeer {
                peer,
                size: self.peers.len(),
            });
        }
        Ok(())
    }

    fn post(&self, dest: RankId, tag: Tag, payload: Vec<f64>) -> Result<(), ExchangeError> {
        self.check_peer(dest)?;
        self.peers[dest.0]
            .send(Envelope::Data(Message {
                source: self.rank,
                tag,
                payload,
            }))
            .map_err(|_| ExchangeError::Disconnected { peer: dest })
    }

    /// Block until the next message from `source` with `tag` is available,
    /// or the group is aborted.
    fn take(&mut self, source: RankId, tag: Tag) -> Result<Vec<f64>, ExchangeError> {
        self.check_aborted()?;
        if let Some(pos) = self
            .unexpected
            .iter()
            .position(|m| m.source == source && m.tag == tag)
        {
            if let Some(m) = self.unexpected.remove(pos) {
                return Ok(m.payload);
            }
        }
        loop {
            let envelope = match self.recv_timeout {
                Some(t) => self.inbox.recv_timeout(t).map_err(|e| match e {
                    RecvTimeoutError::Timeout => ExchangeError::Timeout { peer: source, tag },
                    RecvTimeoutError::Disconnected => ExchangeError::Disconnected { peer: source },
                })?,
                None => self
                    .inbox
                    .recv()
                    .map_err(|_| ExchangeError::Disconnected { peer: source })?,
            };
            match envelope {
                Envelope::Abort { origin } => return Err(ExchangeError::Aborted { by: origin }),
                Envelope::Data(m) if m.source == source && m.tag == tag => return Ok(m.payload),
                Envelope::Data(m) => self.unexpected.push_back(m),
            }
        }
    }

    /// Number of messages received but not yet matched.
    pub fn pending_unexpected(&self) -> usize {
        self.unexpected.len()
    }

    /// Gather `value` on rank 0, combine, and broadcast the result.
    fn all_reduce(&mut self, value: f64, op: fn(f64, f64) -> f64) -> Result<f64, ExchangeError> {
        let root = RankId(0);
        if self.rank == root {
            let mut acc = value;
            for r in 1..self.size() {
                let got = self.take(RankId(r), REDUCE_TAG)?;
                let v = single(&got)?;
                acc = op(acc, v);
            }
            for r in 1..self.size() {
                self.post(RankId(r), BROADCAST_TAG, vec![acc])?;
            }
            Ok(acc)
        } else {
            self.post(root, REDUCE_TAG, vec![value])?;
            let got = self.take(root, BROADCAST_TAG)?;
            single(&got)
        }
    }
}

fn single(payload: &[f64]) -> Result<f64, ExchangeError> {
    match payload {
        [v] => Ok(*v),
        other => Err(ExchangeError::LengthMismatch {
            expected: 1,
            received: other.len(),
        }),
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> RankId {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn isend(
        &mut self,
        dest: RankId,
        tag: Tag,
        payload: Vec<f64>,
    ) -> Result<Request, ExchangeError> {
        self.post(dest, tag, payload)?;
        Ok(Request::send())
    }

    fn irecv(&mut self, source: RankId, tag: Tag) -> Result<Request, ExchangeError> {
        self.check_peer(source)?;
        Ok(Request::recv(source, tag))
    }

    fn wait_all(
        &mut self,
        requests: Vec<Request>,
    ) -> Result<Vec<Option<Vec<f64>>>, ExchangeError> {
        let mut out = Vec::with_capacity(requests.len());
        for req in &requests {
            match *req.kind() {
                RequestKind::Send => out.push(None),
                RequestKind::Recv { source, tag } => out.push(Some(self.take(source, tag)?)),
            }
        }
        Ok(out)
    }

    fn barrier(&mut self) -> Result<(), ExchangeError> {
        self.all_reduce(0.0, f64::max).map(|_| ())
    }

    fn all_reduce_max(&mut self, value: f64) -> Result<f64, ExchangeError> {
        self.all_reduce(value, f64::max)
    }

    fn all_reduce_sum(&mut self, value: f64) -> Result<f64, ExchangeError> {
        self.all_reduce(value, |a, b| a + b)
    }
}
