//! Worker-local sort step.
//!
//! Each participant sorts the bucket it received, in place, using Rust's
//! stable sort. With values bounded to `[0, 100)` and datasets in the
//! thousands, duplicates are guaranteed, and the contract for this step asks
//! for a stable ordering under duplicates.

/// Sort a bucket in-place, ascending.
///
/// Pure and local: no side effects beyond the bucket's own memory, no
/// intra-participant parallelism.
#[inline]
pub fn sort(bucket: &mut [u32]) {
    bucket.sort();
}

/// Check if a slice is sorted in ascending order.
#[inline]
pub fn is_sorted(data: &[u32]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}
