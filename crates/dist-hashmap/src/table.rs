// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{error::ConstructError, keyed::Keyed};
use rma::{AtomicArray, RemotePtr, SharedArray, Substrate};
use std::{
    cell::Cell,
    marker::PhantomData,
    sync::atomic::{AtomicU8, Ordering},
};

const PHASE_IDLE: u8 = 0;
const PHASE_INSERT: u8 = 1;
const PHASE_LOOKUP: u8 = 2;

/// A distributed, open-addressed hash table: capacity `N` striped
/// uniformly across every rank of `S`, with collisions resolved by a
/// remote atomic fetch-and-add on a per-slot reservation counter rather
/// than a lock.
///
/// Construction, insertion, lookup and teardown are all collective: every
/// rank must drive the same sequence of calls. A single instance is only
/// ever used from the one rank thread that constructed it.
pub struct DistHashMap<S, T: Keyed> {
    substrate: S,
    data: SharedArray<T>,
    used: AtomicArray,
    slots_per_rank: usize,
    size: usize,
    phase: AtomicU8,
    insert_count: Cell<u64>,
    probe_sum: Cell<u64>,
    probe_max: Cell<u32>,
    _marker: PhantomData<T>,
}

impl<S: Substrate, T: Keyed> DistHashMap<S, T> {
    /// Collectively constructs a table of logical capacity `size`. Every
    /// rank must call this with the same `size`.
    #[tracing::instrument(skip(substrate), fields(rank = substrate.rank_me()))]
    pub fn construct(substrate: S, size: usize) -> Result<Self, ConstructError> {
        if size == 0 {
            return Err(ConstructError::EmptyTable);
        }
        let rank_n = substrate.rank_n();
        let slots_per_rank = size / rank_n + 1;
        tracing::debug!(size, rank_n, slots_per_rank, "constructing distributed table");

        let data = substrate.alloc_data_array::<T>(slots_per_rank);
        let used = substrate.alloc_atomic_array(slots_per_rank);

        Ok(Self {
            substrate,
            data,
            used,
            slots_per_rank,
            size,
            phase: AtomicU8::new(PHASE_IDLE),
            insert_count: Cell::new(0),
            probe_sum: Cell::new(0),
            probe_max: Cell::new(0),
            _marker: PhantomData,
        })
    }

    /// Logical capacity `N`, identical on every rank.
    pub fn size(&self) -> usize {
        self.size
    }

    /// This rank's index, for telemetry and test orchestration.
    pub fn rank_me(&self) -> usize {
        self.substrate.rank_me()
    }

    /// The collective barrier separating the insert phase from the
    /// lookup phase. Every rank must call this exactly once between its
    /// last `insert` and its first `find`; it is the sole happens-before
    /// relationship making a winning rank's put visible to every reader.
    pub async fn barrier(&self) {
        self.substrate.barrier().await;
        self.phase.store(PHASE_IDLE, Ordering::Relaxed);
    }

    fn slot_addr(&self, slot: usize) -> (usize, usize) {
        (slot / self.slots_per_rank, slot % self.slots_per_rank)
    }

    fn reservation_ptr(&self, slot: usize) -> RemotePtr<i64> {
        let (owner, local) = self.slot_addr(slot);
        self.used.ptr(owner, local)
    }

    fn data_ptr(&self, slot: usize) -> RemotePtr<T> {
        let (owner, local) = self.slot_addr(slot);
        self.data.ptr(owner, local)
    }

    /// Remote atomic fetch-and-add of `+1` on a slot's reservation
    /// counter, relaxed ordering. Returns the pre-increment value: `0`
    /// means the caller is the unique winner.
    async fn request_slot(&self, slot: usize) -> i64 {
        self.used.fetch_add(self.reservation_ptr(slot), 1).await
    }

    /// Remote atomic load of a slot's reservation counter.
    async fn slot_used(&self, slot: usize) -> bool {
        self.used.load(self.reservation_ptr(slot)).await != 0
    }

    fn write_slot(&self, slot: usize, value: T) {
        self.data.put(self.data_ptr(slot), value);
    }

    async fn read_slot(&self, slot: usize) -> T {
        self.data.get(self.data_ptr(slot)).await
    }

    fn enter_phase(&self, phase: u8) {
        let previous = self.phase.swap(phase, Ordering::Relaxed);
        debug_assert!(
            previous == PHASE_IDLE || previous == phase,
            "insert and lookup phases must not interleave on a single rank"
        );
    }

    /// Inserts `record` via linear probing from `hash64(record.key())`.
    /// Returns the 1-based probe count on success, `0` if every slot in
    /// the table was already claimed.
    ///
    /// The winning write is fire-and-forget: once `request_slot` reports
    /// this caller as the unique winner, the data is written and the
    /// call returns without waiting for that write to be externally
    /// visible. Visibility is only guaranteed after the next collective
    /// barrier -- see [`Substrate::barrier`].
    #[tracing::instrument(skip(self, record), fields(rank = self.substrate.rank_me()))]
    pub async fn insert(&self, record: T) -> usize {
        self.enter_phase(PHASE_INSERT);
        let hash = T::hash64(&record.key());
        for probe in 0..self.size {
            let slot = (hash.wrapping_add(probe as u64) as usize) % self.size;
            let previous = self.request_slot(slot).await;
            if previous == 0 {
                self.write_slot(slot, record);
                let count = probe + 1;
                self.insert_count.set(self.insert_count.get() + 1);
                self.probe_sum.set(self.probe_sum.get() + count as u64);
                self.probe_max.set(self.probe_max.get().max(count as u32));
                return count;
            }
        }
        tracing::warn!("table full, insertion failed after exhausting every slot");
        0
    }

    /// Looks up `key` via the same linear probe sequence `insert` used.
    /// Returns the stored record on a match, `None` if no record with
    /// this key is present.
    #[tracing::instrument(skip(self), fields(rank = self.substrate.rank_me()))]
    pub async fn find(&self, key: T::Key) -> Option<T> {
        self.enter_phase(PHASE_LOOKUP);
        let hash = T::hash64(&key);
        for probe in 0..self.size {
            let slot = (hash.wrapping_add(probe as u64) as usize) % self.size;
            if self.slot_used(slot).await {
                let candidate = self.read_slot(slot).await;
                if candidate.key() == key {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Mean and max probe counts observed by this rank's successful
    /// `insert` calls so far, for telemetry.
    pub fn probe_stats(&self) -> (f64, u32) {
        let inserts = self.insert_count.get();
        let mean = if inserts == 0 {
            0.0
        } else {
            self.probe_sum.get() as f64 / inserts as f64
        };
        (mean, self.probe_max.get())
    }

    /// Collectively tears down the table. No further operation on this
    /// handle is valid afterwards.
    pub fn destroy(self) {
        self.substrate.destroy_domain();
        tracing::debug!(rank = self.substrate.rank_me(), "table destroyed");
    }
}
