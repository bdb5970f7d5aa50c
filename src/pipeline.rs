//! Top-level sorting protocol, run identically by every participant.
//!
//! The flow branches only on identity: the coordinator (rank 0) generates
//! and partitions the dataset before the scatter and reassembles after the
//! gather; everyone else enters the collectives with placeholders. The two
//! collectives are the only synchronization points, and any failure in them
//! aborts the run. There are no retries.

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::comm::{CommError, Communicator};
use crate::config::RunConfig;
use crate::{coordinator, local_sort};

/// The coordinator's identity.
pub const ROOT: usize = 0;

/// What one participant observed during a run.
///
/// `dataset` and `merged` are populated only on the coordinator; `received`
/// is this participant's bucket as delivered by the scatter, before sorting.
#[derive(Debug)]
pub struct Participation {
    pub dataset: Option<Vec<u32>>,
    pub received: Vec<u32>,
    pub merged: Option<Vec<u32>>,
}

/// Run the full protocol on this participant's endpoint.
///
/// Blocks in the scatter until the coordinator has partitioned and
/// distributed the dataset, and in the gather until every bucket has been
/// collected. Returns the coordinator's view (dataset plus merged result) on
/// rank 0 and the local view everywhere else.
pub fn run_participant(
    comm: &mut Communicator<Vec<u32>>,
    config: &RunConfig,
) -> Result<Participation, CommError> {
    let rank = comm.rank();

    let (dataset, buckets) = if rank == ROOT {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let dataset = coordinator::generate(config.dataset_size, config.range_max, &mut rng);
        let buckets = coordinator::partition(&dataset, comm.size(), config.range_max);
        (Some(dataset), Some(buckets))
    } else {
        (None, None)
    };

    let received = comm.scatter(ROOT, buckets)?;
    debug!("rank {rank}: received bucket of {} values", received.len());

    let mut sorted = received.clone();
    local_sort::sort(&mut sorted);
    debug!("rank {rank}: bucket sorted locally");

    let gathered = comm.gather(ROOT, sorted)?;
    let merged = gathered.map(coordinator::reassemble);
    if let Some(merged) = &merged {
        debug!("rank {rank}: reassembled {} values", merged.len());
    }

    Ok(Participation {
        dataset,
        received,
        merged,
    })
}
