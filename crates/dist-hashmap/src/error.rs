// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Fatal failures of collective construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstructError {
    /// `N = 0` is rejected before any allocation happens -- there is no
    /// valid probe sequence into a zero-slot table.
    #[error("cannot construct a hash table with capacity 0")]
    EmptyTable,
}
