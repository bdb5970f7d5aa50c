//! Distributed bucket sort via scatter/gather.
//!
//! This crate implements the classic parallel sorting exercise: a coordinator
//! generates a bounded-range dataset, partitions it into per-worker buckets by
//! value range, scatters one bucket to each participant, every participant
//! sorts its bucket locally, and a gather at the coordinator reassembles the
//! sorted buckets into the final sequence. Because bucket ranges are
//! contiguous, non-overlapping, and increasing, concatenation in worker-index
//! order is already fully sorted and no merge step is needed.
//!
//! The cross-participant exchange runs over [`comm`], a small in-process
//! message-passing layer built on crossbeam channels. Participants are plain
//! OS threads; the two collective operations (scatter, gather) are the only
//! suspension points and both block until every participant has arrived.

pub mod comm;
pub mod config;
pub mod coordinator;
pub mod local_sort;
pub mod pipeline;
