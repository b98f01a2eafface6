// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! One-sided remote-memory-access primitives for the distributed hash
//! table in `dist-hashmap`.
//!
//! This crate defines the [`Substrate`] trait -- the boundary between the
//! core algorithm and whatever transport actually moves bytes between
//! ranks -- and ships one implementation, [`local::LocalSubstrate`],
//! which simulates a job of cooperating ranks as OS threads inside a
//! single process.

mod array;
mod cell;
mod error;
pub mod local;
mod substrate;

pub use array::{AtomicArray, RemotePtr, SharedArray};
pub use error::SubstrateError;
pub use local::{local_job, LocalSubstrate};
pub use substrate::Substrate;
