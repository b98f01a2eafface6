// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! An in-process simulation of a `rank_n()`-way job, used for development,
//! testing, and as the reference implementation of the [`Substrate`]
//! trait. Every rank is meant to run as its own OS thread (spawned by the
//! caller); shared memory is modeled with plain heap allocations behind
//! `Arc`, and the one-sided discipline the core depends on
//! (reservation-before-data, barrier-gated visibility) is reproduced
//! exactly rather than papered over with a lock.

use crate::{
    array::{AtomicArray, SharedArray},
    cell::RmaCell,
    error::SubstrateError,
    substrate::Substrate,
};
use std::{
    any::Any,
    cell::Cell,
    sync::{
        atomic::{AtomicBool, AtomicI64, Ordering},
        Arc, Barrier, Mutex, OnceLock,
    },
};

type ErasedShard = Arc<dyn Any + Send + Sync>;

/// Shared state for one simulated job. Every rank's [`LocalSubstrate`]
/// holds a clone of this `Arc`.
struct Job {
    rank_n: usize,
    barrier: Barrier,
    destroyed: AtomicBool,
    /// Registry of collective allocations, indexed by the call sequence
    /// number every rank reaches in lockstep: every rank calls
    /// `alloc_data_array`/`alloc_atomic_array` the same number of times,
    /// in the same order, by the collective-call contract, so a purely
    /// local per-rank counter is enough to line up each rank's call with
    /// the matching registry slot. Each slot holds one published shard
    /// per rank.
    registry: Mutex<Vec<Vec<OnceLock<ErasedShard>>>>,
}

/// One rank's view of a simulated job: the handle threaded into
/// `DistHashMap` and owned by a single rank's thread.
pub struct LocalSubstrate {
    rank_me: usize,
    job: Arc<Job>,
    call_seq: Cell<usize>,
}

impl Clone for LocalSubstrate {
    fn clone(&self) -> Self {
        Self {
            rank_me: self.rank_me,
            job: self.job.clone(),
            call_seq: Cell::new(self.call_seq.get()),
        }
    }
}

// Safety: `call_seq` is a plain `Cell`, which is `!Sync`; that's fine
// because a `LocalSubstrate` is only ever touched from the one rank
// thread that owns it. It still needs to be `Send` so the driver can move
// one handle into each spawned thread.
unsafe impl Send for LocalSubstrate {}

/// Spawns a simulated job of `rank_n` peers and returns one handle per
/// rank. The caller (the assembly driver) is responsible for moving each
/// handle into its own thread, one thread per rank.
pub fn local_job(rank_n: usize) -> Result<Vec<LocalSubstrate>, SubstrateError> {
    if rank_n == 0 {
        return Err(SubstrateError::EmptyJob);
    }

    let job = Arc::new(Job {
        rank_n,
        barrier: Barrier::new(rank_n),
        destroyed: AtomicBool::new(false),
        registry: Mutex::new(Vec::new()),
    });

    Ok((0..rank_n)
        .map(|rank_me| LocalSubstrate {
            rank_me,
            job: job.clone(),
            call_seq: Cell::new(0),
        })
        .collect())
}

impl LocalSubstrate {
    /// Runs one collective allocation: publishes this rank's locally-built
    /// shard into the registry, waits for every other rank to do the
    /// same, then returns every rank's shard in order.
    fn alloc_generic<T, F>(&self, build: F) -> Vec<ErasedShard>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let generation = self.call_seq.get();
        self.call_seq.set(generation + 1);

        {
            let mut registry = self.job.registry.lock().unwrap();
            while registry.len() <= generation {
                let slots = (0..self.job.rank_n).map(|_| OnceLock::new()).collect();
                registry.push(slots);
            }
        }

        let shard: ErasedShard = Arc::new(build());
        {
            let registry = self.job.registry.lock().unwrap();
            registry[generation][self.rank_me]
                .set(shard)
                .unwrap_or_else(|_| {
                    panic!(
                        "rank {} allocated generation {generation} twice",
                        self.rank_me
                    )
                });
        }

        // Collective rendezvous: no rank may observe another rank's shard
        // until every rank has published its own, mirroring the
        // all-to-all address exchange a real RMA domain setup performs.
        self.job.barrier.wait();

        let registry = self.job.registry.lock().unwrap();
        registry[generation]
            .iter()
            .map(|cell| {
                cell.get()
                    .expect("every rank publishes before the barrier releases")
                    .clone()
            })
            .collect()
    }
}

impl Substrate for LocalSubstrate {
    fn rank_me(&self) -> usize {
        self.rank_me
    }

    fn rank_n(&self) -> usize {
        self.job.rank_n
    }

    fn alloc_data_array<T>(&self, per_rank_len: usize) -> SharedArray<T>
    where
        T: Default + Copy + Send + Sync + 'static,
    {
        debug_assert!(
            !self.job.destroyed.load(Ordering::Relaxed),
            "alloc_data_array called after destroy_domain"
        );
        let shards = self.alloc_generic::<Box<[RmaCell<T>]>, _>(|| {
            (0..per_rank_len)
                .map(|_| RmaCell::new(T::default()))
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        let shards = shards
            .into_iter()
            .map(|erased| {
                erased
                    .downcast::<Box<[RmaCell<T>]>>()
                    .unwrap_or_else(|_| panic!("data array element type disagreed across ranks"))
            })
            .collect();
        SharedArray::from_shards(shards, per_rank_len)
    }

    fn alloc_atomic_array(&self, per_rank_len: usize) -> AtomicArray {
        debug_assert!(
            !self.job.destroyed.load(Ordering::Relaxed),
            "alloc_atomic_array called after destroy_domain"
        );
        let shards = self.alloc_generic::<Box<[AtomicI64]>, _>(|| {
            (0..per_rank_len)
                .map(|_| AtomicI64::new(0))
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        let shards = shards
            .into_iter()
            .map(|erased| {
                erased
                    .downcast::<Box<[AtomicI64]>>()
                    .unwrap_or_else(|_| panic!("atomic array element type disagreed across ranks"))
            })
            .collect();
        AtomicArray::from_shards(shards, per_rank_len)
    }

    async fn barrier(&self) {
        debug_assert!(
            !self.job.destroyed.load(Ordering::Relaxed),
            "barrier called after destroy_domain"
        );
        self.job.barrier.wait();
    }

    fn destroy_domain(&self) {
        self.job.destroyed.store(true, Ordering::Relaxed);
        tracing::debug!(rank = self.rank_me, "atomic domain destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_job() {
        assert!(matches!(local_job(0), Err(SubstrateError::EmptyJob)));
    }

    #[test]
    fn collective_allocation_is_shared_across_ranks() {
        let ranks = local_job(3).unwrap();
        let handles: Vec<_> = ranks
            .into_iter()
            .map(|s| {
                std::thread::spawn(move || {
                    let array = s.alloc_atomic_array(4);
                    let ptr = array.ptr(s.rank_me(), 0);
                    futures::executor::block_on(array.fetch_add(ptr, 1));
                    futures::executor::block_on(array.load(ptr))
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
    }
}
