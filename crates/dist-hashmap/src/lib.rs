// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A distributed, open-addressed hash table built on one-sided RMA and
//! remote atomic fetch-and-add for collision-free slot reservation.
//!
//! Capacity is fixed at construction and never resized. Insertion and
//! lookup use identical linear probe sequences; the two must run in
//! separate, barrier-separated phases (see [`DistHashMap`]).

mod error;
mod keyed;
mod table;

pub use error::ConstructError;
pub use keyed::Keyed;
pub use table::DistHashMap;
