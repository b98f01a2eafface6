// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::cell::RmaCell;
use std::{
    marker::PhantomData,
    sync::atomic::{AtomicI64, Ordering},
    sync::Arc,
};

/// A logical address into a collectively-allocated shared array: which
/// rank owns the element, and its offset within that rank's local shard.
///
/// This is the Rust stand-in for a `global_ptr<T>` / one-sided RMA
/// pointer. It carries no reference to the array it addresses -- like a
/// real remote pointer, it is only meaningful when paired with the array
/// it was produced from.
pub struct RemotePtr<T> {
    pub(crate) rank: usize,
    pub(crate) local: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RemotePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for RemotePtr<T> {}

impl<T> RemotePtr<T> {
    fn new(rank: usize, local: usize) -> Self {
        Self {
            rank,
            local,
            _marker: PhantomData,
        }
    }
}

/// A data shard, collectively allocated and addressable from every rank.
///
/// Cloning a `SharedArray` is cheap (an `Arc` bump) -- every clone refers
/// to the same underlying per-rank shards, the way every rank's directory
/// entry refers to the same remote memory.
pub struct SharedArray<T> {
    shards: Arc<Vec<Arc<Box<[RmaCell<T>]>>>>,
    per_rank_len: usize,
}

impl<T> Clone for SharedArray<T> {
    fn clone(&self) -> Self {
        Self {
            shards: self.shards.clone(),
            per_rank_len: self.per_rank_len,
        }
    }
}

impl<T: Copy> SharedArray<T> {
    pub(crate) fn from_shards(shards: Vec<Arc<Box<[RmaCell<T>]>>>, per_rank_len: usize) -> Self {
        Self {
            shards: Arc::new(shards),
            per_rank_len,
        }
    }

    /// Number of elements owned by a single rank.
    pub fn per_rank_len(&self) -> usize {
        self.per_rank_len
    }

    pub fn ptr(&self, rank: usize, local: usize) -> RemotePtr<T> {
        debug_assert!(rank < self.shards.len());
        debug_assert!(local < self.per_rank_len);
        RemotePtr::new(rank, local)
    }

    /// One-sided, fire-and-forget write. There is no completion handle to
    /// await: the value is copied into place as part of this call, and the
    /// only durability guarantee is the phase-ending barrier (see
    /// `Substrate::barrier`). A real RDMA backend would issue the put here
    /// and let the handle complete in the background; in Rust, an
    /// `async fn` that is never polled never runs its body at all, so
    /// "discard the handle" has to mean "there is no handle" rather than
    /// "drop the future unawaited".
    pub fn put(&self, ptr: RemotePtr<T>, value: T) {
        self.shards[ptr.rank][ptr.local].put(value);
    }

    /// One-sided read. Async to mirror the suspension point a real RDMA
    /// get would have; this simulation resolves immediately.
    pub async fn get(&self, ptr: RemotePtr<T>) -> T {
        self.shards[ptr.rank][ptr.local].get()
    }
}

/// A reservation shard: a genuinely atomic `i64` per slot, collectively
/// allocated the same way as a `SharedArray`. Kept as a distinct type
/// (rather than `SharedArray<i64>`) because the reservation counter's
/// correctness depends on real atomicity, unlike the best-effort data
/// array.
pub struct AtomicArray {
    shards: Arc<Vec<Arc<Box<[AtomicI64]>>>>,
    per_rank_len: usize,
}

impl Clone for AtomicArray {
    fn clone(&self) -> Self {
        Self {
            shards: self.shards.clone(),
            per_rank_len: self.per_rank_len,
        }
    }
}

impl AtomicArray {
    pub(crate) fn from_shards(shards: Vec<Arc<Box<[AtomicI64]>>>, per_rank_len: usize) -> Self {
        Self {
            shards: Arc::new(shards),
            per_rank_len,
        }
    }

    pub fn per_rank_len(&self) -> usize {
        self.per_rank_len
    }

    pub fn ptr(&self, rank: usize, local: usize) -> RemotePtr<i64> {
        debug_assert!(rank < self.shards.len());
        debug_assert!(local < self.per_rank_len);
        RemotePtr::new(rank, local)
    }

    /// Remote atomic fetch-and-add with relaxed ordering, returning the
    /// pre-increment value (see the reservation protocol).
    pub async fn fetch_add(&self, ptr: RemotePtr<i64>, delta: i64) -> i64 {
        self.shards[ptr.rank][ptr.local].fetch_add(delta, Ordering::Relaxed)
    }

    /// Remote atomic load with relaxed ordering.
    pub async fn load(&self, ptr: RemotePtr<i64>) -> i64 {
        self.shards[ptr.rank][ptr.local].load(Ordering::Relaxed)
    }
}
