//! In-process message-passing layer with collective operations.
//!
//! A stand-in for an MPI-style communication runtime: a fully connected mesh
//! of endpoints over crossbeam channels, one [`Communicator`] per
//! participant, with blocking `scatter`/`gather`/`broadcast`/`barrier`
//! collectives ordered by participant identity.
//!
//! Every message travels in an [`Envelope`] tagged with the source rank and a
//! per-edge sequence number. Receives match on `(source, sequence)`: an
//! envelope that arrives early, from a peer already racing ahead into the
//! next collective, is parked and delivered when its turn comes. This is what
//! lets all participants call the collectives in program order without any
//! global synchronization beyond the channels themselves.
//!
//! All collectives block until the exchange completes. There are no timeouts
//! and no retries: a missing or stalled participant suspends its peers
//! indefinitely, and a disconnected one (endpoint dropped) surfaces as
//! [`CommError::Disconnected`], which is fatal for the run.

use crossbeam_channel as channel;
use log::debug;
use thiserror::Error;

/// Errors surfaced by the distribution layer. All of them are fatal: the
/// protocol has no partial-failure recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommError {
    /// The root's item sequence does not have one entry per participant.
    #[error("collective requires exactly {expected} items, got {got}")]
    CountMismatch { expected: usize, got: usize },

    /// A non-root participant supplied the root-only item sequence.
    #[error("rank {rank} supplied items but is not the root of this collective")]
    ItemsOnNonRoot { rank: usize },

    /// The root called a collective without supplying its items.
    #[error("root rank {root} must supply the items for this collective")]
    MissingItems { root: usize },

    /// A peer endpoint was dropped while this participant was waiting on it.
    #[error("peer rank {rank} disconnected")]
    Disconnected { rank: usize },

    /// A rank outside `[0, size)` was named as root, source, or destination.
    #[error("rank {rank} is out of range for a world of size {size}")]
    InvalidRank { rank: usize, size: usize },

    /// Participants disagreed on the order of collectives: a data receive met
    /// a barrier token or vice versa.
    #[error("rank {rank} received a mismatched message kind from rank {from}")]
    KindMismatch { rank: usize, from: usize },
}

/// Payload of one envelope: either application data or a barrier token.
enum Payload<T> {
    Data(T),
    Token,
}

/// One point-to-point message, tagged for receive matching.
struct Envelope<T> {
    src: usize,
    seq: u64,
    payload: Payload<T>,
}

/// A participant's endpoint in the mesh.
///
/// Identity (`rank`) and participant count (`size`) are carried here rather
/// than in process globals; every send/receive and every collective goes
/// through this handle. The endpoint is `Send` and is meant to be moved into
/// the participant's thread.
pub struct Communicator<T> {
    rank: usize,
    /// Senders to every peer, indexed by destination rank. The entry at our
    /// own index is `None`: self-sends short-circuit through `parked`, so no
    /// endpoint keeps its own inbox alive after the peers are gone.
    peers: Vec<Option<channel::Sender<Envelope<T>>>>,
    inbox: channel::Receiver<Envelope<T>>,
    /// Envelopes received ahead of their turn, still waiting to be matched.
    parked: Vec<Envelope<T>>,
    next_send_seq: Vec<u64>,
    next_recv_seq: Vec<u64>,
}

/// Build a fully connected mesh of `size` endpoints.
///
/// The returned communicators are ordered by rank; move each one into its
/// participant's thread. `connect(0)` yields an empty world.
pub fn connect<T>(size: usize) -> Vec<Communicator<T>> {
    let (txs, rxs): (Vec<_>, Vec<_>) = (0..size).map(|_| channel::unbounded()).unzip();
    rxs.into_iter()
        .enumerate()
        .map(|(rank, inbox)| Communicator {
            rank,
            peers: txs
                .iter()
                .enumerate()
                .map(|(dst, tx)| (dst != rank).then(|| tx.clone()))
                .collect(),
            inbox,
            parked: Vec::new(),
            next_send_seq: vec![0; size],
            next_recv_seq: vec![0; size],
        })
        .collect()
}

impl<T> Communicator<T> {
    /// This participant's zero-based identity.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of participants in the world.
    pub fn size(&self) -> usize {
        self.peers.len()
    }

    fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank < self.size() {
            Ok(())
        } else {
            Err(CommError::InvalidRank {
                rank,
                size: self.size(),
            })
        }
    }

    fn send_payload(&mut self, to: usize, payload: Payload<T>) -> Result<(), CommError> {
        self.check_rank(to)?;
        let seq = self.next_send_seq[to];
        self.next_send_seq[to] += 1;
        let envelope = Envelope {
            src: self.rank,
            seq,
            payload,
        };
        if to == self.rank {
            self.parked.push(envelope);
            return Ok(());
        }
        match &self.peers[to] {
            Some(tx) => tx
                .send(envelope)
                .map_err(|_| CommError::Disconnected { rank: to }),
            None => Err(CommError::Disconnected { rank: to }),
        }
    }

    fn recv_payload(&mut self, from: usize) -> Result<Payload<T>, CommError> {
        self.check_rank(from)?;
        let want = self.next_recv_seq[from];
        if let Some(pos) = self
            .parked
            .iter()
            .position(|e| e.src == from && e.seq == want)
        {
            self.next_recv_seq[from] += 1;
            return Ok(self.parked.swap_remove(pos).payload);
        }
        loop {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| CommError::Disconnected { rank: from })?;
            if envelope.src == from && envelope.seq == want {
                self.next_recv_seq[from] += 1;
                return Ok(envelope.payload);
            }
            debug!(
                "rank {} parking envelope from rank {} (seq {})",
                self.rank, envelope.src, envelope.seq
            );
            self.parked.push(envelope);
        }
    }

    /// Send one payload to `to`. Buffered; never blocks.
    pub fn send(&mut self, to: usize, payload: T) -> Result<(), CommError> {
        self.send_payload(to, Payload::Data(payload))
    }

    /// Receive the next payload from `from`, blocking until it arrives.
    pub fn recv(&mut self, from: usize) -> Result<T, CommError> {
        match self.recv_payload(from)? {
            Payload::Data(payload) => Ok(payload),
            Payload::Token => Err(CommError::KindMismatch {
                rank: self.rank,
                from,
            }),
        }
    }

    fn recv_token(&mut self, from: usize) -> Result<(), CommError> {
        match self.recv_payload(from)? {
            Payload::Token => Ok(()),
            Payload::Data(_) => Err(CommError::KindMismatch {
                rank: self.rank,
                from,
            }),
        }
    }

    /// Collective: the root distributes one item per participant; the call
    /// returns the item at the caller's own rank.
    ///
    /// The root passes `Some(items)` with exactly `size()` entries, everyone
    /// else passes `None`. Blocks until the caller's item has arrived. A
    /// sequence of the wrong length is fatal.
    pub fn scatter(&mut self, root: usize, items: Option<Vec<T>>) -> Result<T, CommError> {
        self.check_rank(root)?;
        if self.rank == root {
            let items = items.ok_or(CommError::MissingItems { root })?;
            if items.len() != self.size() {
                return Err(CommError::CountMismatch {
                    expected: self.size(),
                    got: items.len(),
                });
            }
            for (dst, item) in items.into_iter().enumerate() {
                self.send_payload(dst, Payload::Data(item))?;
            }
        } else if items.is_some() {
            return Err(CommError::ItemsOnNonRoot { rank: self.rank });
        }
        self.recv(root)
    }

    /// Collective: every participant contributes one item; the root receives
    /// them all, ordered by participant identity.
    ///
    /// Returns `Some(items)` on the root and `None` everywhere else. The root
    /// blocks until every contribution has arrived; non-roots only enqueue
    /// their item and return.
    pub fn gather(&mut self, root: usize, item: T) -> Result<Option<Vec<T>>, CommError> {
        self.check_rank(root)?;
        self.send_payload(root, Payload::Data(item))?;
        if self.rank != root {
            return Ok(None);
        }
        let mut items = Vec::with_capacity(self.size());
        for src in 0..self.size() {
            items.push(self.recv(src)?);
        }
        Ok(Some(items))
    }

    /// Collective: the root's item is delivered to every participant.
    pub fn broadcast(&mut self, root: usize, item: Option<T>) -> Result<T, CommError>
    where
        T: Clone,
    {
        self.check_rank(root)?;
        if self.rank == root {
            let item = item.ok_or(CommError::MissingItems { root })?;
            for dst in 0..self.size() {
                self.send_payload(dst, Payload::Data(item.clone()))?;
            }
        } else if item.is_some() {
            return Err(CommError::ItemsOnNonRoot { rank: self.rank });
        }
        self.recv(root)
    }

    /// Synchronous rendezvous: no participant returns until every participant
    /// has entered the barrier.
    ///
    /// Implemented as a token gather at rank 0 followed by a token broadcast,
    /// over the same matched channels as the data collectives.
    pub fn barrier(&mut self) -> Result<(), CommError> {
        self.send_payload(0, Payload::Token)?;
        if self.rank == 0 {
            for src in 0..self.size() {
                self.recv_token(src)?;
            }
            for dst in 0..self.size() {
                self.send_payload(dst, Payload::Token)?;
            }
        }
        self.recv_token(0)
    }
}
