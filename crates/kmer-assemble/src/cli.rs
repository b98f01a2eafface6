// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Reconstruct contigs and print a summary per rank.
    Run,
    /// Like `run`, but also logs pre-construction sizing information.
    Verbose,
    /// Like `run`, but writes `<prefix>_<rank>.dat` per rank instead of
    /// printing a summary.
    Test,
}

/// Distributed de Bruijn graph assembly over a job of simulated ranks.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path to the k-mer file (`<key> <backward> <forward>` per line).
    pub kmer_file: PathBuf,

    /// Number of ranks to simulate as OS threads.
    #[arg(long, default_value_t = default_rank_n())]
    pub ranks: usize,

    /// Hash table load factor: table capacity is `n_kmers / load_factor`.
    #[arg(long, default_value_t = 0.5)]
    pub load_factor: f64,

    /// Run mode.
    #[arg(long, value_enum, default_value_t = Mode::Run)]
    pub mode: Mode,

    /// Output file prefix, used only in `test` mode.
    #[arg(long, default_value = "test")]
    pub prefix: String,
}

fn default_rank_n() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
