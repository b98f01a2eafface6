// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{cli::Mode, error::AssemblyError};
use dist_hashmap::DistHashMap;
use kmer::{read_kmers, KmerPair};
use rma::{LocalSubstrate, Substrate};
use std::{fs::File, io::Write, path::PathBuf};

/// One rank's full assembly run: read its k-mer partition, build the
/// shared table, insert, barrier, then walk every contig starting from a
/// backward-sentinel node.
pub fn run_rank(
    substrate: LocalSubstrate,
    kmer_file: PathBuf,
    table_size: usize,
    mode: Mode,
    prefix: String,
) -> Result<(), AssemblyError> {
    let rank_me = substrate.rank_me();
    let rank_n = substrate.rank_n();

    let kmers = read_kmers(&kmer_file, rank_n, rank_me)?;
    if mode == Mode::Verbose {
        tracing::info!(
            rank = rank_me,
            table_size,
            n_kmers = kmers.len(),
            "initializing hash table"
        );
    }

    let table = DistHashMap::construct(substrate, table_size)?;

    futures::executor::block_on(insert_phase(&table, &kmers, rank_me))?;
    futures::executor::block_on(table.barrier());

    let (mean, max) = table.probe_stats();
    tracing::info!(rank = rank_me, mean_probe_count = mean, max_probe_count = max);

    let start_nodes: Vec<KmerPair> = kmers
        .iter()
        .copied()
        .filter(|k| k.backward.is_sentinel())
        .collect();

    let contigs = futures::executor::block_on(walk_contigs(&table, &start_nodes, rank_me))?;

    match mode {
        Mode::Test => write_contigs(&prefix, rank_me, &contigs)?,
        Mode::Run | Mode::Verbose => {
            let total_nodes: usize = contigs.iter().map(Vec::len).sum();
            tracing::info!(
                rank = rank_me,
                contigs = contigs.len(),
                nodes = total_nodes,
                start_nodes = start_nodes.len(),
                "reconstructed contigs"
            );
        }
    }

    table.destroy();
    Ok(())
}

async fn insert_phase(
    table: &DistHashMap<LocalSubstrate, KmerPair>,
    kmers: &[KmerPair],
    rank_me: usize,
) -> Result<(), AssemblyError> {
    for kmer in kmers {
        let count = table.insert(*kmer).await;
        if count == 0 {
            return Err(AssemblyError::TableFull { rank: rank_me });
        }
    }
    Ok(())
}

async fn walk_contigs(
    table: &DistHashMap<LocalSubstrate, KmerPair>,
    start_nodes: &[KmerPair],
    rank_me: usize,
) -> Result<Vec<Vec<KmerPair>>, AssemblyError> {
    let mut contigs = Vec::with_capacity(start_nodes.len());
    for &start in start_nodes {
        let mut contig = vec![start];
        while !contig.last().unwrap().forward.is_sentinel() {
            let next_key = contig.last().unwrap().next_key();
            let next = table
                .find(next_key)
                .await
                .ok_or(AssemblyError::MissingKmer { rank: rank_me })?;
            contig.push(next);
        }
        contigs.push(contig);
    }
    Ok(contigs)
}

fn extract_contig(contig: &[KmerPair]) -> String {
    let mut sequence = String::new();
    if let Some(first) = contig.first() {
        sequence.push_str(first.key.as_str());
    }
    for kmer in &contig[1..] {
        sequence.push(kmer.key.as_str().chars().last().unwrap());
    }
    sequence
}

fn write_contigs(
    prefix: &str,
    rank_me: usize,
    contigs: &[Vec<KmerPair>],
) -> Result<(), AssemblyError> {
    let path = format!("{prefix}_{rank_me}.dat");
    let mut file = File::create(&path).map_err(|source| AssemblyError::Output {
        path: path.clone(),
        source,
    })?;
    for contig in contigs {
        writeln!(file, "{}", extract_contig(contig)).map_err(|source| AssemblyError::Output {
            path: path.clone(),
            source,
        })?;
    }
    Ok(())
}
