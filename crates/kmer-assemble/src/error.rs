// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error(transparent)]
    KmerFile(#[from] kmer::KmerFileError),

    #[error(transparent)]
    Substrate(#[from] rma::SubstrateError),

    #[error(transparent)]
    Construct(#[from] dist_hashmap::ConstructError),

    #[error("rank {rank}: hash table is full, insertion failed for a k-mer")]
    TableFull { rank: usize },

    #[error("rank {rank}: k-mer not found while walking a contig")]
    MissingKmer { rank: usize },

    #[error("a rank thread panicked before finishing assembly")]
    RankPanicked,

    #[error("failed to write output file {path}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
