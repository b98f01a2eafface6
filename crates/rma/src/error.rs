// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Fatal failures of the remote-memory substrate itself.
///
/// These mirror the "substrate failure" disposition in the error design: no
/// local recovery is attempted, the caller escalates.
#[derive(Debug, Error)]
pub enum SubstrateError {
    #[error("failed to launch {requested} simulated ranks: {source}")]
    Spawn {
        requested: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("rank count must be at least 1")]
    EmptyJob,
}
