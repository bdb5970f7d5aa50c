//! Coordinator role: dataset generation, partition plan, reassembly.
//!
//! The coordinator (participant 0) generates the input once, splits it into
//! one bucket per participant by value range, and later concatenates the
//! gathered sorted buckets. The partition plan assigns worker `i` the
//! half-open range `[i*R/W, (i+1)*R/W)` over `[0, R)`: ranges are contiguous,
//! non-overlapping, and cover the whole value space, so every element lands
//! in exactly one bucket and concatenation in worker-index order needs no
//! merge step.
//!
//! Range-based bucketing assumes a roughly uniform value distribution.
//! Degenerate inputs (all values identical) fill a single bucket and leave
//! the rest empty: valid, but without load balancing.

use log::debug;
use rand::Rng;

/// Generate `count` uniformly distributed values in `[0, range_max)`.
///
/// The RNG is passed in by the caller; seeded runs hand in a
/// `StdRng::seed_from_u64` instance, the demo binary uses OS entropy.
/// `range_max` must be at least 1.
pub fn generate<R: Rng + ?Sized>(count: usize, range_max: u32, rng: &mut R) -> Vec<u32> {
    (0..count).map(|_| rng.gen_range(0..range_max)).collect()
}

/// Map a value to the index of the worker whose range contains it.
///
/// Computed as `floor(value * worker_count / range_max)`, which for integer
/// values is exactly the test `i*R/W <= value < (i+1)*R/W` with real-valued
/// boundaries. Values at or above `range_max` (only possible when generation
/// and partitioning disagree on the range) are clamped into the last bucket;
/// no validation is performed and the merged result is then silently wrong.
#[inline]
pub fn bucket_index(value: u32, worker_count: usize, range_max: u32) -> usize {
    let index = (u64::from(value) * worker_count as u64 / u64::from(range_max)) as usize;
    index.min(worker_count - 1)
}

/// Split a dataset into exactly `worker_count` buckets in worker-index order.
///
/// Buckets may be empty; the scatter primitive requires one entry per
/// participant regardless. Within a bucket, elements keep dataset order.
pub fn partition(dataset: &[u32], worker_count: usize, range_max: u32) -> Vec<Vec<u32>> {
    let mut buckets = vec![Vec::new(); worker_count];
    for &value in dataset {
        buckets[bucket_index(value, worker_count, range_max)].push(value);
    }
    debug!(
        "partitioned {} values into {} buckets ({:?} per bucket)",
        dataset.len(),
        worker_count,
        buckets.iter().map(Vec::len).collect::<Vec<_>>()
    );
    buckets
}

/// Concatenate sorted buckets in worker-index order.
///
/// No comparisons: the range invariant guarantees every element of bucket `i`
/// is <= every element of bucket `j` for `i < j`. If a bucket arrives
/// internally unsorted or holds an out-of-range value the concatenation is
/// silently incorrect; the debug assertion below catches that in test and
/// debug builds without adding a release-mode validation pass.
pub fn reassemble(buckets: Vec<Vec<u32>>) -> Vec<u32> {
    let total = buckets.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);
    for bucket in buckets {
        merged.extend(bucket);
    }
    debug_assert!(
        crate::local_sort::is_sorted(&merged),
        "reassembled sequence is not sorted; bucket ranges were violated"
    );
    merged
}
