// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! K-mer data model and file reader for distributed de Bruijn graph
//! assembly.

mod error;
mod model;
mod reader;

pub use error::KmerFileError;
pub use model::{hash64, Extension, KmerPair, PackedKmer, KMER_LEN};
pub use reader::{count_kmers, kmer_width, read_kmers};
