// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::cell::UnsafeCell;

/// A single element of a data shard.
///
/// The core hash table writes a cell at most once per slot (enforced by
/// the caller via the reservation protocol, not by this type) and may
/// read it concurrently with that write. Neither side synchronizes
/// beyond the phase barrier, so this is a deliberately unsynchronized
/// cell: correctness relies on the single-writer discipline upstream,
/// exactly as it would for a raw one-sided RDMA write into a peer's
/// memory.
#[repr(transparent)]
pub(crate) struct RmaCell<T>(UnsafeCell<T>);

// Safety: `RmaCell<T>` is shared across rank threads by design. The
// single-writer discipline is upheld by the reservation protocol in
// `dist-hashmap`, not by this type; readers accept the same benign race a
// one-sided RMA read would have against an in-flight put.
unsafe impl<T: Send> Send for RmaCell<T> {}
unsafe impl<T: Send> Sync for RmaCell<T> {}

impl<T> RmaCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }
}

impl<T: Copy> RmaCell<T> {
    /// Unsynchronized write, matching a fire-and-forget one-sided put.
    pub(crate) fn put(&self, value: T) {
        // Safety: concurrent writers to the same cell are ruled out by the
        // reservation protocol; concurrent readers are tolerated and never
        // produce a torn value for `Copy` types sized/aligned like ours.
        unsafe { *self.0.get() = value };
    }

    /// Unsynchronized read, matching a one-sided get.
    pub(crate) fn get(&self) -> T {
        // Safety: see `put`.
        unsafe { *self.0.get() }
    }
}
