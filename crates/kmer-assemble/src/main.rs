// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

mod cli;
mod driver;
mod error;

use clap::Parser;
use cli::Args;
use error::AssemblyError;
use kmer::{count_kmers, kmer_width, KMER_LEN};
use rma::Substrate;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}

fn main() -> Result<(), AssemblyError> {
    init_tracing();
    let args = Args::parse();

    let found_width = kmer_width(&args.kmer_file)?;
    if found_width != KMER_LEN {
        return Err(kmer::KmerFileError::WidthMismatch {
            path: args.kmer_file.display().to_string(),
            expected: KMER_LEN,
            found: found_width,
        }
        .into());
    }

    let n_kmers = count_kmers(&args.kmer_file)?;
    let table_size = ((n_kmers as f64) / args.load_factor).ceil() as usize;

    if args.mode == cli::Mode::Verbose {
        tracing::info!(
            table_size,
            n_kmers,
            ranks = args.ranks,
            "starting assembly"
        );
    }

    let ranks = rma::local_job(args.ranks)?;
    let requested = ranks.len();

    let handles = ranks
        .into_iter()
        .map(|substrate| {
            let kmer_file = args.kmer_file.clone();
            let mode = args.mode;
            let prefix = args.prefix.clone();
            std::thread::Builder::new()
                .name(format!("rank-{}", substrate.rank_me()))
                .spawn(move || driver::run_rank(substrate, kmer_file, table_size, mode, prefix))
                .map_err(|source| rma::SubstrateError::Spawn { requested, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut first_error = None;
    for handle in handles {
        let result = handle.join().unwrap_or(Err(AssemblyError::RankPanicked));
        if let Err(e) = result {
            tracing::error!(error = %e, "rank failed");
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
