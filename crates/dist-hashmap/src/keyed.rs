// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

/// A record the table can store: something with a copyable, comparable
/// key and a pinned 64-bit hash function over that key.
///
/// The hash is a method on the key type (not `std::hash::Hash`) because
/// every rank must compute the *same* slot for the same key -- pinning
/// the function here keeps it independent of `RandomState`-style seeding,
/// which the standard `Hash`/`Hasher` traits deliberately do not
/// guarantee.
pub trait Keyed: Default + Copy + Send + Sync + 'static {
    type Key: Copy + Eq + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    /// A fixed, non-cryptographic 64-bit hash of `key`, identical on every
    /// rank and across runs.
    fn hash64(key: &Self::Key) -> u64;
}
