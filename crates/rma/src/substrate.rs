// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::array::{AtomicArray, SharedArray};

/// The one-sided remote-memory substrate the distributed hash table is
/// built on.
///
/// A real deployment would implement this trait on top of
/// RDMA/UPC++-style verbs; this crate ships exactly one implementation,
/// [`crate::local::LocalSubstrate`], which simulates a job of `rank_n()`
/// peers as OS threads inside a single process.
///
/// Every method here is collective: every rank must call it, with the
/// same arguments, at the same point in its control flow. The trait
/// cannot enforce that -- mismatched collective calls are undefined
/// behavior, per the error design's "misuse" disposition.
pub trait Substrate: Clone + Send + 'static {
    /// This rank's index in `[0, rank_n())`.
    fn rank_me(&self) -> usize;

    /// The number of peer ranks in the job.
    fn rank_n(&self) -> usize;

    /// Collectively allocate a data shard of `per_rank_len` elements on
    /// every rank, returning a handle usable to address any rank's shard.
    fn alloc_data_array<T>(&self, per_rank_len: usize) -> SharedArray<T>
    where
        T: Default + Copy + Send + Sync + 'static;

    /// Collectively allocate a reservation shard of `per_rank_len`
    /// zero-initialized atomic counters.
    fn alloc_atomic_array(&self, per_rank_len: usize) -> AtomicArray;

    /// Collective quiescence: returns only once every rank has called
    /// `barrier()`. This is the sole happens-before relationship between
    /// the insert phase's fire-and-forget puts and the lookup phase's
    /// reads.
    fn barrier(&self) -> impl std::future::Future<Output = ()> + Send;

    /// Collectively tear down the atomic domain. After this call, no
    /// further operation through this handle is valid; implementations
    /// SHOULD debug-assert this where cheap.
    fn destroy_domain(&self);
}
